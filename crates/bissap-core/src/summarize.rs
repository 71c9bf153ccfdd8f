//! Greedy summarization: the core selection loop.
//!
//! Each iteration scores every remaining candidate by
//!
//! ```text
//! score(c) = |cover(c) ∩ EOI − covered| / |EOI| × IC(c)
//! ```
//!
//! and commits *all* candidates sharing the maximum score. Within that tied
//! set an ancestor is dropped when a tied strict descendant covers exactly
//! the same elements. Committing removes the tied terms and every
//! descendant of a committed term from the pool; candidates that can no
//! longer cover anything new then decay out. The loop ends when the pool
//! is empty or every element of interest is covered, and the result is
//! handed to the [`RedundancyPruner`].
//!
//! Scores are kept in a per-iteration map and discarded afterwards.

use crate::background::InformationContent;
use crate::candidates::CandidatePool;
use crate::error::{BissapError, Result};
use crate::prune::{PrunedTerm, RedundancyPruner};
use crate::types::{ElementId, TermId};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace};

/// Relative tolerance under which two scores count as tied.
pub const SCORE_TOLERANCE: f64 = 1e-12;

fn is_tie(score: f64, max_score: f64) -> bool {
    (max_score - score).abs() <= SCORE_TOLERANCE * max_score.abs().max(1.0)
}

/// Per-iteration ranking value of a candidate: the fraction of the elements
/// of interest it would newly cover, weighted by its information content.
///
/// Fails on an empty study set, where the fraction is undefined.
pub fn score(
    new_elements: usize,
    elements_of_interest: usize,
    information_content: f64,
) -> Result<f64> {
    if elements_of_interest == 0 {
        return Err(BissapError::empty_elements_of_interest());
    }
    Ok(new_elements as f64 / elements_of_interest as f64 * information_content)
}

/// What happened during one greedy iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    /// 1-based.
    pub iteration: usize,
    pub max_score: f64,
    /// Terms committed to the summary.
    pub selected: Vec<TermId>,
    /// Tied ancestors discarded in favour of an equally covering descendant.
    pub collapsed: Vec<TermId>,
    /// Candidates removed because a selected term is their ancestor.
    pub removed_descendants: Vec<TermId>,
    /// Candidates removed because they could no longer cover anything new.
    pub decayed: Vec<TermId>,
    /// Elements of interest covered after this iteration.
    pub covered: usize,
    pub remaining_candidates: usize,
}

/// One term of the final summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTerm {
    pub id: TermId,
    pub name: Option<String>,
    pub information_content: f64,
    /// Fraction of the elements of interest the term covers.
    pub coverage: f64,
    /// `information_content × coverage`.
    pub score: f64,
    /// Elements of interest the term covers.
    pub elements: BTreeSet<ElementId>,
}

/// Outcome of a summarization run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Sorted by score (descending), then identifier.
    pub terms: Vec<SummaryTerm>,
    pub iterations: Vec<IterationRecord>,
    pub pruned: Vec<PrunedTerm>,
    pub covered: BTreeSet<ElementId>,
    pub uncovered: BTreeSet<ElementId>,
}

impl Summary {
    pub fn term_ids(&self) -> BTreeSet<TermId> {
        self.terms.iter().map(|t| t.id.clone()).collect()
    }

    pub fn contains(&self, id: &TermId) -> bool {
        self.terms.iter().any(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True when every element of interest is covered.
    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty()
    }

    pub fn mean_score(&self) -> f64 {
        if self.terms.is_empty() {
            return 0.0;
        }
        self.terms.iter().map(|t| t.score).sum::<f64>() / self.terms.len() as f64
    }
}

/// Configurable greedy summarizer over a candidate pool.
///
/// # Example
///
/// ```rust
/// use bissap_core::prelude::*;
/// use std::collections::{BTreeSet, HashMap};
///
/// let pool = CandidatePool::from_candidates(vec![
///     Candidate::new("A", ["e1", "e2"]),
///     Candidate::new("B", ["e1", "e2", "e3"]),
/// ]);
/// let eoi: BTreeSet<ElementId> = ["e1", "e2", "e3"].into_iter().map(ElementId::from).collect();
/// let ic: HashMap<TermId, f64> = [(TermId::from("A"), 2.0), (TermId::from("B"), 1.0)]
///     .into_iter()
///     .collect();
///
/// let summary = Summarizer::new(&pool, &eoi, &ic).run().unwrap();
/// assert_eq!(summary.iterations.len(), 2);
/// assert!(summary.is_complete());
/// ```
pub struct Summarizer<'a, I: InformationContent + ?Sized> {
    pool: &'a CandidatePool,
    elements_of_interest: &'a BTreeSet<ElementId>,
    ic: &'a I,
    prune: bool,
}

impl<'a, I: InformationContent + ?Sized> Summarizer<'a, I> {
    pub fn new(
        pool: &'a CandidatePool,
        elements_of_interest: &'a BTreeSet<ElementId>,
        ic: &'a I,
    ) -> Self {
        Self {
            pool,
            elements_of_interest,
            ic,
            prune: true,
        }
    }

    /// Enable or disable the redundancy pruning pass (enabled by default).
    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub fn run(&self) -> Result<Summary> {
        let eoi = self.elements_of_interest;
        if eoi.is_empty() {
            return Err(BissapError::empty_elements_of_interest());
        }

        let pool = self.pool.as_slice();
        let total = eoi.len() as f64;

        let mut ic: Vec<f64> = Vec::with_capacity(pool.len());
        for c in pool {
            let value = self.ic.information_content(&c.id);
            if !value.is_finite() || value < 0.0 {
                return Err(BissapError::invalid_information_content(c.id.as_str(), value));
            }
            ic.push(value);
        }
        let relevant: Vec<BTreeSet<ElementId>> = pool
            .iter()
            .map(|c| c.cover_elements.intersection(eoi).cloned().collect())
            .collect();
        let position: HashMap<&TermId, usize> =
            pool.iter().enumerate().map(|(i, c)| (&c.id, i)).collect();

        let mut candidates: BTreeSet<usize> =
            (0..pool.len()).filter(|&i| !relevant[i].is_empty()).collect();
        let mut selected: BTreeSet<usize> = BTreeSet::new();
        let mut covered: BTreeSet<ElementId> = BTreeSet::new();
        let mut iterations = Vec::new();

        while !candidates.is_empty() && covered.len() < eoi.len() {
            let iteration = iterations.len() + 1;

            let mut scores: BTreeMap<usize, f64> = BTreeMap::new();
            for &i in &candidates {
                let new = relevant[i].difference(&covered).count();
                let score = score(new, eoi.len(), ic[i])?;
                trace!(
                    iteration,
                    term = %pool[i].id,
                    ic = ic[i],
                    new_coverage = new as f64 / total,
                    score,
                    "scored candidate"
                );
                scores.insert(i, score);
            }

            let max_score = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
            let tied: BTreeSet<usize> = scores
                .iter()
                .filter(|(_, s)| is_tie(**s, max_score))
                .map(|(i, _)| *i)
                .collect();

            // Specificity collapse: drop a tied ancestor when a tied descendant
            // has identical cover_elements (not only identical study coverage).
            let collapsed: BTreeSet<usize> = tied
                .iter()
                .copied()
                .filter(|&a| {
                    tied.iter().any(|&d| {
                        d != a
                            && pool[a].descendants.contains(&pool[d].id)
                            && pool[a].cover_elements == pool[d].cover_elements
                    })
                })
                .collect();
            let committed: BTreeSet<usize> = tied.difference(&collapsed).copied().collect();

            for i in &tied {
                candidates.remove(i);
            }
            let removed_descendants: BTreeSet<usize> = committed
                .iter()
                .flat_map(|&k| pool[k].descendants.iter())
                .filter_map(|d| position.get(d).copied())
                .filter(|d| candidates.contains(d))
                .collect();
            for d in &removed_descendants {
                candidates.remove(d);
            }

            for &k in &committed {
                covered.extend(relevant[k].iter().cloned());
            }
            selected.extend(committed.iter().copied());

            let decayed: BTreeSet<usize> = candidates
                .iter()
                .copied()
                .filter(|&c| relevant[c].is_subset(&covered))
                .collect();
            for c in &decayed {
                candidates.remove(c);
            }

            let ids = |set: &BTreeSet<usize>| -> Vec<TermId> {
                set.iter().map(|&i| pool[i].id.clone()).collect()
            };
            let record = IterationRecord {
                iteration,
                max_score,
                selected: ids(&committed),
                collapsed: ids(&collapsed),
                removed_descendants: ids(&removed_descendants),
                decayed: ids(&decayed),
                covered: covered.len(),
                remaining_candidates: candidates.len(),
            };
            debug!(
                iteration,
                max_score,
                selected = ?record.selected,
                collapsed = ?record.collapsed,
                removed_descendants = ?record.removed_descendants,
                decayed = record.decayed.len(),
                covered = covered.len(),
                total = eoi.len(),
                "greedy iteration committed"
            );
            iterations.push(record);
        }

        let raw: BTreeSet<TermId> = selected.iter().map(|&i| pool[i].id.clone()).collect();
        let (final_ids, pruned) = if self.prune {
            let outcome = RedundancyPruner::new(self.pool, eoi, self.ic).prune(&raw);
            (outcome.kept, outcome.removed)
        } else {
            (raw, Vec::new())
        };

        let mut terms: Vec<SummaryTerm> = final_ids
            .iter()
            .filter_map(|id| position.get(id).copied())
            .map(|i| {
                let coverage = relevant[i].len() as f64 / total;
                SummaryTerm {
                    id: pool[i].id.clone(),
                    name: pool[i].name.clone(),
                    information_content: ic[i],
                    coverage,
                    score: ic[i] * coverage,
                    elements: relevant[i].clone(),
                }
            })
            .collect();
        terms.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        let final_covered: BTreeSet<ElementId> = terms
            .iter()
            .flat_map(|t| t.elements.iter().cloned())
            .collect();
        let uncovered = eoi.difference(&final_covered).cloned().collect();

        debug!(
            terms = terms.len(),
            pruned = pruned.len(),
            iterations = iterations.len(),
            "summary finished"
        );

        Ok(Summary {
            terms,
            iterations,
            pruned,
            covered: final_covered,
            uncovered,
        })
    }
}

/// Greedy selection plus pruning; returns the final term set.
pub fn summarize<I: InformationContent + ?Sized>(
    candidates: &CandidatePool,
    elements_of_interest: &BTreeSet<ElementId>,
    ic_lookup: &I,
) -> Result<BTreeSet<TermId>> {
    Ok(Summarizer::new(candidates, elements_of_interest, ic_lookup)
        .run()?
        .term_ids())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::Candidate;
    use crate::error::InputError;

    fn eoi(xs: &[&str]) -> BTreeSet<ElementId> {
        xs.iter().map(|s| ElementId::from(*s)).collect()
    }

    fn ic(pairs: &[(&str, f64)]) -> HashMap<TermId, f64> {
        pairs.iter().map(|(t, v)| (TermId::from(*t), *v)).collect()
    }

    #[test]
    fn score_weights_new_coverage_by_ic() {
        assert!((score(2, 3, 2.0).unwrap() - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(score(0, 3, 9.0).unwrap(), 0.0);
    }

    #[test]
    fn score_rejects_empty_study_set() {
        assert_eq!(
            score(1, 0, 1.0).unwrap_err(),
            BissapError::Input(InputError::EmptyElementsOfInterest)
        );
    }

    #[test]
    fn collapse_needs_identical_cover_beyond_the_study_set() {
        // P and C tie on the study set, but P also covers "x" outside it.
        let pool = CandidatePool::from_candidates(vec![
            Candidate::new("P", ["e1", "e2", "x"]).with_descendant("C"),
            Candidate::new("C", ["e1", "e2"]),
        ]);
        let study = eoi(&["e1", "e2"]);
        let lookup = ic(&[("P", 1.0), ("C", 1.0)]);
        let raw = Summarizer::new(&pool, &study, &lookup)
            .with_pruning(false)
            .run()
            .unwrap();
        assert!(raw.iterations[0].collapsed.is_empty());
        assert_eq!(raw.iterations[0].selected.len(), 2);

        let pool = CandidatePool::from_candidates(vec![
            Candidate::new("P", ["e1", "e2"]).with_descendant("C"),
            Candidate::new("C", ["e1", "e2"]),
        ]);
        let raw = Summarizer::new(&pool, &study, &lookup)
            .with_pruning(false)
            .run()
            .unwrap();
        assert_eq!(raw.iterations[0].collapsed, vec![TermId::from("P")]);
        assert_eq!(raw.term_ids(), [TermId::from("C")].into_iter().collect());
    }

    #[test]
    fn tie_tolerance_is_relative() {
        assert!(is_tie(1.0, 1.0));
        assert!(is_tie(1.0 - 1e-15, 1.0));
        assert!(!is_tie(0.9, 1.0));
        assert!(is_tie(0.0, 0.0));
    }

    #[test]
    fn empty_study_set_fails_fast() {
        let pool = CandidatePool::from_candidates(vec![Candidate::new("A", ["e1"])]);
        let err = summarize(&pool, &BTreeSet::new(), &ic(&[("A", 1.0)])).unwrap_err();
        assert_eq!(err, BissapError::Input(InputError::EmptyElementsOfInterest));
    }

    #[test]
    fn invalid_ic_is_rejected() {
        let pool = CandidatePool::from_candidates(vec![Candidate::new("A", ["e1"])]);
        let lookup = |_: &TermId| f64::NAN;
        let err = summarize(&pool, &eoi(&["e1"]), &lookup).unwrap_err();
        assert!(matches!(
            err,
            BissapError::Input(InputError::InvalidInformationContent { .. })
        ));
    }

    #[test]
    fn empty_pool_gives_empty_summary() {
        let pool = CandidatePool::default();
        let summary = Summarizer::new(&pool, &eoi(&["e1"]), &ic(&[])).run().unwrap();
        assert!(summary.is_empty());
        assert!(summary.iterations.is_empty());
        assert_eq!(summary.uncovered, eoi(&["e1"]));
        assert_eq!(summary.mean_score(), 0.0);
    }

    #[test]
    fn candidates_outside_the_study_set_never_enter() {
        let pool = CandidatePool::from_candidates(vec![
            Candidate::new("A", ["e1"]),
            Candidate::new("Z", ["other"]),
        ]);
        let study = eoi(&["e1"]);
        let lookup = ic(&[("A", 1.0), ("Z", 9.0)]);
        let summary = Summarizer::new(&pool, &study, &lookup).run().unwrap();
        assert_eq!(summary.term_ids(), [TermId::from("A")].into_iter().collect());
    }

    #[test]
    fn selected_ancestor_removes_descendants_from_pool() {
        // P scores highest; its descendant C must be pruned eagerly.
        let pool = CandidatePool::from_candidates(vec![
            Candidate::new("P", ["e1", "e2", "e3"]).with_descendant("C"),
            Candidate::new("C", ["e1"]),
        ]);
        let study = eoi(&["e1", "e2", "e3", "e4"]);
        let lookup = ic(&[("P", 3.0), ("C", 4.0)]);
        let summary = Summarizer::new(&pool, &study, &lookup).run().unwrap();
        assert_eq!(summary.iterations.len(), 1);
        assert_eq!(summary.iterations[0].removed_descendants, vec![TermId::from("C")]);
        assert_eq!(summary.uncovered, eoi(&["e4"]));
    }

    #[test]
    fn summary_terms_report_coverage_and_score() {
        let pool = CandidatePool::from_candidates(vec![
            Candidate::new("A", ["e1", "e2"]).with_name("alpha"),
            Candidate::new("B", ["e3"]),
        ]);
        let study = eoi(&["e1", "e2", "e3", "e4"]);
        let lookup = ic(&[("A", 2.0), ("B", 1.0)]);
        let summary = Summarizer::new(&pool, &study, &lookup).run().unwrap();
        let a = &summary.terms[0];
        assert_eq!(a.id, TermId::from("A"));
        assert_eq!(a.name.as_deref(), Some("alpha"));
        assert!((a.coverage - 0.5).abs() < 1e-12);
        assert!((a.score - 1.0).abs() < 1e-12);
        assert!((summary.mean_score() - (1.0 + 0.25) / 2.0).abs() < 1e-12);
        assert!(!summary.is_complete());
    }
}
