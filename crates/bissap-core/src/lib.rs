//! # BISSAP Core
//!
//! Summarizes a large, redundant set of Gene Ontology terms annotating a
//! study set of genes or proteins into a small, non-redundant, informative
//! subset that still covers those elements.
//!
//! The pipeline, leaves first:
//!
//! - [`graph`], the ontology DAG with ancestor/descendant closures
//! - [`background`], population frequencies and information content
//! - [`coverage`], which elements each term annotates
//! - [`candidates`], the pool of overrepresented, covering terms
//! - [`summarize`], the greedy, tie-aware selection loop
//! - [`prune`], post-selection redundancy pruning
//! - [`report`], inspection rows for callers that print results
//!
//! ## Quick Start
//!
//! ```rust
//! use bissap_core::prelude::*;
//! use std::collections::BTreeSet;
//!
//! let graph = TermGraph::builder()
//!     .with_is_a("GO:A", "GO:ROOT")
//!     .with_is_a("GO:B", "GO:ROOT")
//!     .build()
//!     .unwrap();
//!
//! let elements = vec![
//!     Element::new("SOX2").annotate("GO:A"),
//!     Element::new("PAX6").annotate("GO:B"),
//! ];
//! let coverage = build_coverage(&graph, &elements).unwrap();
//! let eoi: BTreeSet<ElementId> = coverage.elements().cloned().collect();
//!
//! let background =
//!     BackgroundModel::from_frequencies([("GO:A", 0.01), ("GO:B", 0.02), ("GO:ROOT", 0.5)]).unwrap();
//! let pool = CandidatePool::from_study(&graph, &coverage, &eoi, &CandidateFilter::default()).unwrap();
//!
//! let summary = summarize(&pool, &eoi, &background).unwrap();
//! assert_eq!(summary.len(), 2);
//! ```

pub mod background;
pub mod candidates;
pub mod coverage;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod prune;
pub mod report;
pub mod summarize;
pub mod types;
