//! Coverage index: which elements each term annotates.
//!
//! A term covers an element when the element is annotated by the term
//! directly or by any of its descendants. Coverage is accumulated bottom-up
//! over the graph's topological order, so every child is complete before
//! its parents read it.

use crate::error::{BissapError, Result};
use crate::graph::TermGraph;
use crate::types::{Element, ElementId, TermId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Coverage of every annotating term plus the per-element ancestor closure.
///
/// Built once by [`build_coverage`] and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    /// Term -> covered elements. Terms covering nothing are absent.
    cover: HashMap<TermId, BTreeSet<ElementId>>,
    /// Element -> direct terms.
    direct: BTreeMap<ElementId, BTreeSet<TermId>>,
    /// Element -> direct terms and all of their ancestors.
    closure: BTreeMap<ElementId, BTreeSet<TermId>>,
    empty: BTreeSet<ElementId>,
}

/// Assign direct terms, derive each element's ancestor closure and
/// accumulate `cover_elements` for every term.
///
/// Elements listed more than once have their direct terms merged. A direct
/// term unknown to the graph is an error.
pub fn build_coverage<'a, I>(graph: &TermGraph, elements: I) -> Result<CoverageIndex>
where
    I: IntoIterator<Item = &'a Element>,
{
    let mut direct: BTreeMap<ElementId, BTreeSet<TermId>> = BTreeMap::new();
    for element in elements {
        for term in &element.direct_terms {
            if !graph.contains(term) {
                return Err(BissapError::term_not_found(term.as_str()));
            }
        }
        direct
            .entry(element.id.clone())
            .or_default()
            .extend(element.direct_terms.iter().cloned());
    }

    // Direct contributions at each term.
    let mut cover: HashMap<TermId, BTreeSet<ElementId>> = HashMap::new();
    for (element, terms) in &direct {
        for term in terms {
            cover.entry(term.clone()).or_default().insert(element.clone());
        }
    }

    // Children before parents: each parent absorbs its children's coverage.
    for term in graph.topological_order() {
        let mut inherited: BTreeSet<ElementId> = BTreeSet::new();
        for child in graph.children(term)? {
            if let Some(child_cover) = cover.get(child) {
                inherited.extend(child_cover.iter().cloned());
            }
        }
        if !inherited.is_empty() {
            cover.entry(term.clone()).or_default().extend(inherited);
        }
    }

    let mut closure = BTreeMap::new();
    for (element, terms) in &direct {
        closure.insert(element.clone(), graph.upward_closure(terms)?);
    }

    debug!(
        elements = direct.len(),
        terms = cover.len(),
        "coverage index built"
    );

    Ok(CoverageIndex {
        cover,
        direct,
        closure,
        empty: BTreeSet::new(),
    })
}

impl CoverageIndex {
    /// Elements annotated by `term` directly or through a descendant.
    pub fn cover_elements(&self, term: &TermId) -> &BTreeSet<ElementId> {
        self.cover.get(term).unwrap_or(&self.empty)
    }

    /// Direct terms and all their ancestors for `element`.
    pub fn all_ancestor_terms(&self, element: &ElementId) -> Option<&BTreeSet<TermId>> {
        self.closure.get(element)
    }

    pub fn direct_terms(&self, element: &ElementId) -> Option<&BTreeSet<TermId>> {
        self.direct.get(element)
    }

    pub fn covers(&self, term: &TermId, element: &ElementId) -> bool {
        self.cover_elements(term).contains(element)
    }

    /// An element is covered by `terms` iff its ancestor closure meets the set.
    pub fn is_covered_by(&self, element: &ElementId, terms: &BTreeSet<TermId>) -> bool {
        self.closure
            .get(element)
            .map(|closure| !closure.is_disjoint(terms))
            .unwrap_or(false)
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementId> {
        self.direct.keys()
    }

    pub fn element_count(&self) -> usize {
        self.direct.len()
    }

    /// Terms covering at least one element, sorted by identifier.
    pub fn annotating_terms(&self) -> Vec<&TermId> {
        let mut terms: Vec<&TermId> = self.cover.keys().collect();
        terms.sort();
        terms
    }

    pub fn term_count(&self) -> usize {
        self.cover.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TermGraphBuilder;

    fn id(s: &str) -> TermId {
        TermId::from(s)
    }

    fn el(s: &str) -> ElementId {
        ElementId::from(s)
    }

    fn graph() -> TermGraph {
        TermGraphBuilder::new()
            .with_is_a("a", "root")
            .with_is_a("b", "root")
            .with_is_a("c", "a")
            .with_is_a("c", "b")
            .with_is_a("d", "b")
            .build()
            .unwrap()
    }

    fn elements() -> Vec<Element> {
        vec![
            Element::new("e1").annotate("c"),
            Element::new("e2").annotate("d"),
            Element::new("e3").annotate("a"),
        ]
    }

    #[test]
    fn coverage_accumulates_through_descendants() {
        let g = graph();
        let idx = build_coverage(&g, &elements()).unwrap();
        let set = |xs: &[&str]| xs.iter().map(|s| el(s)).collect::<BTreeSet<_>>();
        assert_eq!(idx.cover_elements(&id("root")), &set(&["e1", "e2", "e3"]));
        assert_eq!(idx.cover_elements(&id("a")), &set(&["e1", "e3"]));
        assert_eq!(idx.cover_elements(&id("b")), &set(&["e1", "e2"]));
        assert_eq!(idx.cover_elements(&id("c")), &set(&["e1"]));
        assert!(idx.cover_elements(&id("unrelated")).is_empty());
    }

    #[test]
    fn coverage_widens_toward_the_root() {
        let g = graph();
        let idx = build_coverage(&g, &elements()).unwrap();
        for term in g.terms() {
            for child in &term.children {
                assert!(idx
                    .cover_elements(&term.id)
                    .is_superset(idx.cover_elements(child)));
            }
        }
    }

    #[test]
    fn cover_and_closure_agree() {
        let g = graph();
        let idx = build_coverage(&g, &elements()).unwrap();
        for element in idx.elements() {
            for term in g.terms() {
                let in_closure = idx.all_ancestor_terms(element).unwrap().contains(&term.id);
                assert_eq!(in_closure, idx.covers(&term.id, element));
            }
        }
    }

    #[test]
    fn covered_iff_closure_meets_set() {
        let g = graph();
        let idx = build_coverage(&g, &elements()).unwrap();
        let summary: BTreeSet<TermId> = [id("d")].into_iter().collect();
        assert!(idx.is_covered_by(&el("e2"), &summary));
        assert!(!idx.is_covered_by(&el("e1"), &summary));
        assert!(!idx.is_covered_by(&el("ghost"), &summary));
    }

    #[test]
    fn duplicate_elements_merge() {
        let g = graph();
        let elems = vec![Element::new("e1").annotate("c"), Element::new("e1").annotate("d")];
        let idx = build_coverage(&g, &elems).unwrap();
        assert_eq!(idx.element_count(), 1);
        assert_eq!(idx.direct_terms(&el("e1")).unwrap().len(), 2);
    }

    #[test]
    fn unknown_direct_term_fails() {
        let g = graph();
        let elems = vec![Element::new("e1").annotate("GO:missing")];
        assert_eq!(
            build_coverage(&g, &elems).unwrap_err(),
            BissapError::term_not_found("GO:missing")
        );
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let g = graph();
        let first = build_coverage(&g, &elements()).unwrap();
        let second = build_coverage(&g, &elements()).unwrap();
        for term in g.terms() {
            assert_eq!(first.cover_elements(&term.id), second.cover_elements(&term.id));
        }
        assert_eq!(first.annotating_terms(), second.annotating_terms());
    }
}
