//! Report rows for study-set inspection and summary listings.
//!
//! These are plain data; printing belongs to the caller.

use crate::candidates::CandidatePool;
use crate::coverage::CoverageIndex;
use crate::summarize::{Summary, SummaryTerm};
use crate::types::{ElementId, TermId};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Annotation overview of a single element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementReport {
    pub element: ElementId,
    pub direct_count: usize,
    /// Direct terms plus all ancestors.
    pub total_count: usize,
    pub direct_terms: Vec<TermId>,
    /// Candidate-pool terms found in the element's ancestor closure.
    pub overrepresented: Vec<TermId>,
}

/// A candidate listed in the global report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermRow {
    pub id: TermId,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub fdr: Option<f64>,
    pub covered: usize,
}

/// Overview of the whole study set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalReport {
    pub elements: usize,
    /// Distinct terms annotating the study set directly.
    pub direct_terms: usize,
    /// Distinct terms annotating the study set directly or by inheritance.
    pub total_terms: usize,
    pub overrepresented: usize,
    /// Lowest-FDR candidates; candidates without an FDR sort last.
    pub top_by_fdr: Vec<TermRow>,
}

pub fn element_reports(coverage: &CoverageIndex, pool: &CandidatePool) -> Vec<ElementReport> {
    coverage
        .elements()
        .map(|element| {
            let direct: Vec<TermId> = coverage
                .direct_terms(element)
                .map(|t| t.iter().cloned().collect())
                .unwrap_or_default();
            let closure = coverage.all_ancestor_terms(element);
            let overrepresented: Vec<TermId> = closure
                .map(|c| c.iter().filter(|t| pool.contains(t)).cloned().collect())
                .unwrap_or_default();
            ElementReport {
                element: element.clone(),
                direct_count: direct.len(),
                total_count: closure.map(|c| c.len()).unwrap_or(0),
                direct_terms: direct,
                overrepresented,
            }
        })
        .collect()
}

pub fn global_report(coverage: &CoverageIndex, pool: &CandidatePool, top: usize) -> GlobalReport {
    let direct: BTreeSet<&TermId> = coverage
        .elements()
        .filter_map(|e| coverage.direct_terms(e))
        .flatten()
        .collect();

    let mut rows: Vec<TermRow> = pool
        .iter()
        .map(|c| TermRow {
            id: c.id.clone(),
            name: c.name.clone(),
            namespace: c.namespace.clone(),
            fdr: c.fdr,
            covered: c.cover_elements.len(),
        })
        .collect();
    rows.sort_by(|a, b| match (a.fdr, b.fdr) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id)));
    rows.truncate(top);

    GlobalReport {
        elements: coverage.element_count(),
        direct_terms: direct.len(),
        total_terms: coverage.term_count(),
        overrepresented: pool.len(),
        top_by_fdr: rows,
    }
}

/// Summary terms with the widest coverage first.
pub fn top_by_coverage(summary: &Summary, top: usize) -> Vec<&SummaryTerm> {
    let mut terms: Vec<&SummaryTerm> = summary.terms.iter().collect();
    terms.sort_by(|a, b| {
        b.elements
            .len()
            .cmp(&a.elements.len())
            .then_with(|| a.id.cmp(&b.id))
    });
    terms.truncate(top);
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{CandidateFilter, OverrepresentedTerm};
    use crate::coverage::build_coverage;
    use crate::graph::TermGraphBuilder;
    use crate::summarize::Summarizer;
    use crate::types::Element;
    use std::collections::HashMap;

    fn setup() -> (CoverageIndex, CandidatePool) {
        let graph = TermGraphBuilder::new()
            .with_is_a("a", "root")
            .with_is_a("b", "root")
            .with_is_a("c", "a")
            .build()
            .unwrap();
        let elements = vec![
            Element::new("e1").annotate("c"),
            Element::new("e2").annotate("b"),
        ];
        let coverage = build_coverage(&graph, &elements).unwrap();
        let eoi: BTreeSet<ElementId> = coverage.elements().cloned().collect();
        let pool = CandidatePool::from_overrepresented(
            &graph,
            &coverage,
            vec![
                OverrepresentedTerm::new("a").with_fdr(0.01),
                OverrepresentedTerm::new("b"),
                OverrepresentedTerm::new("root").with_fdr(0.001),
            ],
            &eoi,
            &CandidateFilter::default(),
        )
        .unwrap();
        (coverage, pool)
    }

    #[test]
    fn element_report_lists_closure_and_candidates() {
        let (coverage, pool) = setup();
        let reports = element_reports(&coverage, &pool);
        assert_eq!(reports.len(), 2);
        let e1 = &reports[0];
        assert_eq!(e1.element, ElementId::from("e1"));
        assert_eq!(e1.direct_count, 1);
        assert_eq!(e1.total_count, 3);
        assert_eq!(e1.overrepresented, vec![TermId::from("a"), TermId::from("root")]);
    }

    #[test]
    fn global_report_orders_by_fdr() {
        let (coverage, pool) = setup();
        let report = global_report(&coverage, &pool, 2);
        assert_eq!(report.elements, 2);
        assert_eq!(report.direct_terms, 2);
        assert_eq!(report.total_terms, 4);
        assert_eq!(report.overrepresented, 3);
        let ids: Vec<&str> = report.top_by_fdr.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a"]);
    }

    #[test]
    fn top_by_coverage_prefers_wide_terms() {
        let (coverage, pool) = setup();
        let eoi: BTreeSet<ElementId> = coverage.elements().cloned().collect();
        let ic: HashMap<TermId, f64> = [("a", 1.0), ("b", 1.0), ("root", 0.1)]
            .into_iter()
            .map(|(t, v)| (TermId::from(t), v))
            .collect();
        let summary = Summarizer::new(&pool, &eoi, &ic).run().unwrap();
        let top = top_by_coverage(&summary, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].elements.len(), 1);
    }
}
