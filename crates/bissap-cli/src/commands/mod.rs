//! CLI command implementations.

pub mod init;
pub mod inspect;
pub mod summarize;

use crate::config::Config;
use crate::StudyArgs;
use bissap_core::candidates::CandidateFilter;

/// Configured candidate filter with command-line overrides applied.
pub fn candidate_filter(config: &Config, args: &StudyArgs) -> CandidateFilter {
    let mut filter = config.candidates.filter();
    if let Some(fdr) = args.fdr {
        filter.fdr_threshold = Some(fdr);
    }
    if let Some(min) = args.min_coverage {
        filter.min_coverage = min;
    }
    if args.namespace.is_some() {
        filter.namespace = args.namespace.clone();
    }
    filter
}
