//! Candidate pool construction.
//!
//! Candidates are the terms an external enrichment test flagged as
//! overrepresented, narrowed to those covering at least one element of
//! interest. Each candidate carries its coverage and its ancestor and
//! descendant relations restricted to the pool, which is everything the
//! greedy selector and the pruner need.

use crate::coverage::CoverageIndex;
use crate::error::{BissapError, Result};
use crate::graph::TermGraph;
use crate::types::{ElementId, TermId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A term flagged by the external enrichment test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrepresentedTerm {
    pub term: TermId,
    /// Multiple-testing corrected p-value, when known.
    #[serde(default)]
    pub fdr: Option<f64>,
}

impl OverrepresentedTerm {
    pub fn new(term: impl Into<TermId>) -> Self {
        Self {
            term: term.into(),
            fdr: None,
        }
    }

    pub fn with_fdr(mut self, fdr: f64) -> Self {
        self.fdr = Some(fdr);
        self
    }
}

/// Extra narrowing applied while building a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFilter {
    /// Drop terms whose known FDR exceeds this value.
    pub fdr_threshold: Option<f64>,
    /// Drop terms covering less than this fraction of the elements of interest.
    pub min_coverage: f64,
    /// Keep only terms of this namespace.
    pub namespace: Option<String>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            fdr_threshold: None,
            min_coverage: 0.0,
            namespace: None,
        }
    }
}

impl CandidateFilter {
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.fdr_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(BissapError::invalid_threshold("fdr_threshold", t));
            }
        }
        if !(0.0..=1.0).contains(&self.min_coverage) {
            return Err(BissapError::invalid_threshold(
                "min_coverage",
                self.min_coverage,
            ));
        }
        Ok(())
    }
}

/// A term eligible for selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: TermId,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub fdr: Option<f64>,
    /// Elements annotated by the term directly or through descendants.
    pub cover_elements: BTreeSet<ElementId>,
    /// Pool members that are strict ancestors of this term.
    pub ancestors: BTreeSet<TermId>,
    /// Pool members that are strict descendants of this term.
    pub descendants: BTreeSet<TermId>,
}

impl Candidate {
    pub fn new<I, E>(id: impl Into<TermId>, cover_elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ElementId>,
    {
        Self {
            id: id.into(),
            name: None,
            namespace: None,
            fdr: None,
            cover_elements: cover_elements.into_iter().map(Into::into).collect(),
            ancestors: BTreeSet::new(),
            descendants: BTreeSet::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_fdr(mut self, fdr: f64) -> Self {
        self.fdr = Some(fdr);
        self
    }

    /// Declare `descendant` as a strict descendant of this term.
    pub fn with_descendant(mut self, descendant: impl Into<TermId>) -> Self {
        self.descendants.insert(descendant.into());
        self
    }

    pub fn with_ancestor(mut self, ancestor: impl Into<TermId>) -> Self {
        self.ancestors.insert(ancestor.into());
        self
    }

    pub fn is_ancestor_of(&self, other: &TermId) -> bool {
        self.descendants.contains(other)
    }

    pub fn is_descendant_of(&self, other: &TermId) -> bool {
        self.ancestors.contains(other)
    }
}

/// The set of candidates handed to the summarizer, sorted by identifier.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    /// Build the pool from enrichment results.
    ///
    /// Unknown terms are an error. Terms covering no element of interest are
    /// dropped, as are terms rejected by `filter`.
    pub fn from_overrepresented<I>(
        graph: &TermGraph,
        coverage: &CoverageIndex,
        overrepresented: I,
        elements_of_interest: &BTreeSet<ElementId>,
        filter: &CandidateFilter,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = OverrepresentedTerm>,
    {
        filter.validate()?;
        if elements_of_interest.is_empty() {
            return Err(BissapError::empty_elements_of_interest());
        }

        let mut kept: BTreeMap<TermId, Candidate> = BTreeMap::new();
        for flagged in overrepresented {
            let Some(term) = graph.get(&flagged.term) else {
                return Err(BissapError::term_not_found(flagged.term.as_str()));
            };
            if let (Some(max), Some(fdr)) = (filter.fdr_threshold, flagged.fdr) {
                if fdr > max {
                    continue;
                }
            }
            if let Some(ns) = &filter.namespace {
                if term.namespace.as_deref() != Some(ns.as_str()) {
                    continue;
                }
            }
            let cover = coverage.cover_elements(&term.id);
            let relevant = cover.intersection(elements_of_interest).count();
            if relevant == 0 {
                continue;
            }
            let fraction = relevant as f64 / elements_of_interest.len() as f64;
            if fraction < filter.min_coverage {
                continue;
            }
            kept.insert(
                term.id.clone(),
                Candidate {
                    id: term.id.clone(),
                    name: term.name.clone(),
                    namespace: term.namespace.clone(),
                    fdr: flagged.fdr,
                    cover_elements: cover.clone(),
                    ancestors: BTreeSet::new(),
                    descendants: BTreeSet::new(),
                },
            );
        }

        let ids: BTreeSet<TermId> = kept.keys().cloned().collect();
        for candidate in kept.values_mut() {
            candidate.ancestors = graph
                .ancestors(&candidate.id)?
                .intersection(&ids)
                .cloned()
                .collect();
            candidate.descendants = graph
                .descendants(&candidate.id)?
                .intersection(&ids)
                .cloned()
                .collect();
        }

        Ok(Self {
            candidates: kept.into_values().collect(),
        })
    }

    /// Build the pool from every term annotating the study set, for runs
    /// without an external enrichment result.
    pub fn from_study(
        graph: &TermGraph,
        coverage: &CoverageIndex,
        elements_of_interest: &BTreeSet<ElementId>,
        filter: &CandidateFilter,
    ) -> Result<Self> {
        let flagged: Vec<OverrepresentedTerm> = coverage
            .annotating_terms()
            .into_iter()
            .filter(|t| !coverage.cover_elements(t).is_disjoint(elements_of_interest))
            .map(|t| OverrepresentedTerm::new(t.clone()))
            .collect();
        Self::from_overrepresented(graph, coverage, flagged, elements_of_interest, filter)
    }

    /// Wrap already-populated candidates.
    ///
    /// Relations are made symmetric and restricted to the pool; a later
    /// duplicate identifier replaces an earlier one.
    pub fn from_candidates<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut by_id: BTreeMap<TermId, Candidate> = candidates
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        let ids: BTreeSet<TermId> = by_id.keys().cloned().collect();

        let mut pairs: Vec<(TermId, TermId)> = Vec::new(); // (ancestor, descendant)
        for c in by_id.values() {
            for d in c.descendants.iter().filter(|d| ids.contains(*d)) {
                pairs.push((c.id.clone(), d.clone()));
            }
            for a in c.ancestors.iter().filter(|a| ids.contains(*a)) {
                pairs.push((a.clone(), c.id.clone()));
            }
        }
        for c in by_id.values_mut() {
            c.ancestors.clear();
            c.descendants.clear();
        }
        for (ancestor, descendant) in pairs {
            if ancestor == descendant {
                continue;
            }
            if let Some(c) = by_id.get_mut(&ancestor) {
                c.descendants.insert(descendant.clone());
            }
            if let Some(c) = by_id.get_mut(&descendant) {
                c.ancestors.insert(ancestor);
            }
        }

        Self {
            candidates: by_id.into_values().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn get(&self, id: &TermId) -> Option<&Candidate> {
        self.candidates
            .binary_search_by(|c| c.id.cmp(id))
            .ok()
            .map(|i| &self.candidates[i])
    }

    pub fn contains(&self, id: &TermId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TermId> {
        self.candidates.iter().map(|c| &c.id)
    }

    pub(crate) fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::build_coverage;
    use crate::error::InputError;
    use crate::graph::TermGraphBuilder;
    use crate::types::{Element, Term};

    fn id(s: &str) -> TermId {
        TermId::from(s)
    }

    fn eoi(xs: &[&str]) -> BTreeSet<ElementId> {
        xs.iter().map(|s| ElementId::from(*s)).collect()
    }

    fn fixture() -> (TermGraph, CoverageIndex) {
        let graph = TermGraphBuilder::new()
            .with_term(Term::new("root").with_namespace("biological_process"))
            .with_term(Term::new("a").with_namespace("biological_process"))
            .with_term(Term::new("b").with_namespace("molecular_function"))
            .with_is_a("a", "root")
            .with_is_a("b", "root")
            .with_is_a("c", "a")
            .with_is_a("lonely", "root")
            .build()
            .unwrap();
        let elements = vec![
            Element::new("e1").annotate("c"),
            Element::new("e2").annotate("a"),
            Element::new("e3").annotate("b"),
        ];
        let coverage = build_coverage(&graph, &elements).unwrap();
        (graph, coverage)
    }

    #[test]
    fn empty_coverage_terms_are_dropped() {
        let (graph, coverage) = fixture();
        let pool = CandidatePool::from_overrepresented(
            &graph,
            &coverage,
            ["a", "lonely", "c"].into_iter().map(OverrepresentedTerm::new),
            &eoi(&["e1", "e2", "e3"]),
            &CandidateFilter::default(),
        )
        .unwrap();
        let ids: Vec<&str> = pool.ids().map(|t| t.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn relations_are_restricted_to_the_pool() {
        let (graph, coverage) = fixture();
        let pool = CandidatePool::from_overrepresented(
            &graph,
            &coverage,
            ["a", "c"].into_iter().map(OverrepresentedTerm::new),
            &eoi(&["e1", "e2"]),
            &CandidateFilter::default(),
        )
        .unwrap();
        let c = pool.get(&id("c")).unwrap();
        assert_eq!(c.ancestors, [id("a")].into_iter().collect());
        assert!(pool.get(&id("a")).unwrap().is_ancestor_of(&id("c")));
    }

    #[test]
    fn filters_apply() {
        let (graph, coverage) = fixture();
        let flagged = vec![
            OverrepresentedTerm::new("root").with_fdr(0.01),
            OverrepresentedTerm::new("a").with_fdr(0.2),
            OverrepresentedTerm::new("b").with_fdr(0.01),
            OverrepresentedTerm::new("c").with_fdr(0.01),
        ];
        let filter = CandidateFilter {
            fdr_threshold: Some(0.05),
            min_coverage: 0.5,
            namespace: Some("biological_process".into()),
        };
        let pool = CandidatePool::from_overrepresented(
            &graph,
            &coverage,
            flagged,
            &eoi(&["e1", "e2", "e3"]),
            &filter,
        )
        .unwrap();
        // a: fdr too high; b: wrong namespace; c: no namespace and 1/3 coverage.
        let ids: Vec<&str> = pool.ids().map(|t| t.as_str()).collect();
        assert_eq!(ids, vec!["root"]);
    }

    #[test]
    fn from_study_uses_every_annotating_term() {
        let (graph, coverage) = fixture();
        let pool = CandidatePool::from_study(
            &graph,
            &coverage,
            &eoi(&["e1"]),
            &CandidateFilter::default(),
        )
        .unwrap();
        let ids: Vec<&str> = pool.ids().map(|t| t.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "root"]);
    }

    #[test]
    fn unknown_terms_and_bad_inputs_fail() {
        let (graph, coverage) = fixture();
        let err = CandidatePool::from_overrepresented(
            &graph,
            &coverage,
            [OverrepresentedTerm::new("GO:404")],
            &eoi(&["e1"]),
            &CandidateFilter::default(),
        )
        .unwrap_err();
        assert_eq!(err, BissapError::term_not_found("GO:404"));

        let err = CandidatePool::from_study(
            &graph,
            &coverage,
            &BTreeSet::new(),
            &CandidateFilter::default(),
        )
        .unwrap_err();
        assert_eq!(err, BissapError::Input(InputError::EmptyElementsOfInterest));

        let bad = CandidateFilter {
            min_coverage: 1.5,
            ..CandidateFilter::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn supplied_candidates_get_symmetric_relations() {
        let pool = CandidatePool::from_candidates(vec![
            Candidate::new("p", ["e1"]).with_descendant("c").with_descendant("outside"),
            Candidate::new("c", ["e1"]),
        ]);
        let c = pool.get(&id("c")).unwrap();
        assert!(c.is_descendant_of(&id("p")));
        assert!(!pool.get(&id("p")).unwrap().descendants.contains(&id("outside")));
    }
}
