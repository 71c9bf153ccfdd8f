//! Redundancy pruning of a finished summary.
//!
//! For every summary term `t` with an ancestor `anc` also in the summary:
//!
//! - **keep-descendant**: if `anc` is the only summary term covering at
//!   least one element, `t` adds nothing `anc` does not already claim and
//!   is marked;
//! - **drop-ancestor**: if every element of interest is covered by some
//!   summary term other than `anc`, `anc` is marked. With partial coverage
//!   this never fires.
//!
//! All marks are evaluated against the unpruned summary and applied
//! afterwards. Marks are applied one at a time in a fixed order
//! (keep-descendant marks by identifier, then drop-ancestor marks by
//! ascending information content); a removal that would leave a
//! previously covered element uncovered is skipped.

use crate::background::InformationContent;
use crate::candidates::CandidatePool;
use crate::types::{ElementId, TermId};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Which rule removed a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneRule {
    /// A descendant whose ancestor in the summary uniquely covers an element.
    KeepDescendant,
    /// An ancestor whose coverage the rest of the summary already provides.
    DropAncestor,
}

/// A term removed by the pruner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrunedTerm {
    pub id: TermId,
    pub rule: PruneRule,
    /// The other member of the ancestor/descendant pair that triggered the mark.
    pub paired_with: TermId,
}

/// Result of a pruning pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneOutcome {
    pub kept: BTreeSet<TermId>,
    pub removed: Vec<PrunedTerm>,
}

/// Post-processes a greedy summary.
pub struct RedundancyPruner<'a, I: InformationContent + ?Sized> {
    pool: &'a CandidatePool,
    elements_of_interest: &'a BTreeSet<ElementId>,
    ic: &'a I,
}

impl<'a, I: InformationContent + ?Sized> RedundancyPruner<'a, I> {
    pub fn new(
        pool: &'a CandidatePool,
        elements_of_interest: &'a BTreeSet<ElementId>,
        ic: &'a I,
    ) -> Self {
        Self {
            pool,
            elements_of_interest,
            ic,
        }
    }

    /// Prune `summary`. Terms unknown to the pool cover nothing and have no
    /// relations, so they are never marked.
    pub fn prune(&self, summary: &BTreeSet<TermId>) -> PruneOutcome {
        let relevant: BTreeMap<&TermId, BTreeSet<&ElementId>> = summary
            .iter()
            .map(|t| {
                let cover = self
                    .pool
                    .get(t)
                    .map(|c| {
                        c.cover_elements
                            .iter()
                            .filter(|e| self.elements_of_interest.contains(*e))
                            .collect()
                    })
                    .unwrap_or_default();
                (t, cover)
            })
            .collect();

        // Element -> summary terms covering it.
        let mut holders: BTreeMap<&ElementId, BTreeSet<&TermId>> = BTreeMap::new();
        for (term, elements) in &relevant {
            for e in elements {
                holders.entry(*e).or_default().insert(*term);
            }
        }

        let mut marks: BTreeMap<TermId, PrunedTerm> = BTreeMap::new();
        for term in summary {
            let Some(candidate) = self.pool.get(term) else {
                continue;
            };
            for anc in candidate.ancestors.iter().filter(|a| summary.contains(*a)) {
                let uniquely_covers = relevant[anc].iter().any(|e| {
                    holders
                        .get(e)
                        .map(|h| h.len() == 1 && h.contains(anc))
                        .unwrap_or(false)
                });
                if uniquely_covers {
                    debug!(term = %term, ancestor = %anc, "keep-descendant mark");
                    marks.entry(term.clone()).or_insert_with(|| PrunedTerm {
                        id: term.clone(),
                        rule: PruneRule::KeepDescendant,
                        paired_with: anc.clone(),
                    });
                }

                let redundant = self.elements_of_interest.iter().all(|e| {
                    holders
                        .get(e)
                        .is_some_and(|h| h.iter().any(|t| *t != anc))
                });
                if redundant {
                    debug!(term = %term, ancestor = %anc, "drop-ancestor mark");
                    marks.entry(anc.clone()).or_insert_with(|| PrunedTerm {
                        id: anc.clone(),
                        rule: PruneRule::DropAncestor,
                        paired_with: term.clone(),
                    });
                }
            }
        }

        let mut ordered: Vec<PrunedTerm> = marks.into_values().collect();
        ordered.sort_by(|a, b| {
            a.rule.cmp(&b.rule).then_with(|| match a.rule {
                PruneRule::KeepDescendant => a.id.cmp(&b.id),
                PruneRule::DropAncestor => self
                    .ic
                    .information_content(&a.id)
                    .partial_cmp(&self.ic.information_content(&b.id))
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id)),
            })
        });

        let mut kept: BTreeSet<TermId> = summary.clone();
        let mut removed = Vec::new();
        for mark in ordered {
            let still_held = relevant[&mark.id].iter().all(|e| {
                holders
                    .get(e)
                    .map(|h| h.iter().any(|t| **t != mark.id && kept.contains(*t)))
                    .unwrap_or(false)
            });
            if still_held {
                kept.remove(&mark.id);
                removed.push(mark);
            } else {
                debug!(term = %mark.id, "pruning skipped: removal would uncover elements");
            }
        }

        PruneOutcome { kept, removed }
    }
}
