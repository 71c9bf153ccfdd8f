//! BISSAP Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use bissap_core::prelude::*;
//! ```

pub use crate::types::{Element, ElementId, Term, TermId};

pub use crate::graph::{TermGraph, TermGraphBuilder};

pub use crate::background::{information_content, BackgroundModel, InformationContent};

pub use crate::coverage::{build_coverage, CoverageIndex};

pub use crate::candidates::{Candidate, CandidateFilter, CandidatePool, OverrepresentedTerm};

pub use crate::summarize::{summarize, IterationRecord, Summarizer, Summary, SummaryTerm};

pub use crate::prune::{PruneRule, PrunedTerm, RedundancyPruner};

pub use crate::error::{BissapError, Result};
