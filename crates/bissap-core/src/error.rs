//! Error types for summarization.
//!
//! Every error is a precondition check raised at the point of violation.
//! A background term with no recorded frequency is not an error: it has
//! an information content of zero.

use thiserror::Error;

/// Result type for bissap operations.
pub type Result<T> = std::result::Result<T, BissapError>;

/// Errors that can occur while building inputs or summarizing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BissapError {
    /// Term graph errors.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    /// Invalid caller-supplied input.
    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

/// Term graph errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// The is-a relation is not acyclic; `term` lies on a cycle.
    #[error("is-a cycle detected through term {term}")]
    Cycle { term: String },
    /// Term not present in the graph.
    #[error("Term not found: {0}")]
    TermNotFound(String),
}

/// Invalid input errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Coverage fractions are undefined for an empty study set.
    #[error("The set of elements of interest is empty")]
    EmptyElementsOfInterest,
    /// Background probability outside (0, 1].
    #[error("Invalid background frequency for {term}: {value} (must be in (0, 1])")]
    InvalidFrequency { term: String, value: f64 },
    /// Background model derived from no population members.
    #[error("Background population is empty")]
    EmptyPopulation,
    /// Information content lookup returned a negative or non-finite value.
    #[error("Invalid information content for {term}: {value} (must be finite and >= 0)")]
    InvalidInformationContent { term: String, value: f64 },
    /// Threshold outside [0, 1].
    #[error("{field} out of range: {value} (must be 0.0-1.0)")]
    InvalidThreshold { field: String, value: f64 },
}

// Convenience constructors
impl BissapError {
    pub fn term_not_found(id: impl Into<String>) -> Self {
        BissapError::Graph(GraphError::TermNotFound(id.into()))
    }

    pub fn cycle(term: impl Into<String>) -> Self {
        BissapError::Graph(GraphError::Cycle { term: term.into() })
    }

    pub fn empty_elements_of_interest() -> Self {
        BissapError::Input(InputError::EmptyElementsOfInterest)
    }

    pub fn invalid_frequency(term: impl Into<String>, value: f64) -> Self {
        BissapError::Input(InputError::InvalidFrequency {
            term: term.into(),
            value,
        })
    }

    pub fn invalid_information_content(term: impl Into<String>, value: f64) -> Self {
        BissapError::Input(InputError::InvalidInformationContent {
            term: term.into(),
            value,
        })
    }

    pub fn invalid_threshold(field: impl Into<String>, value: f64) -> Self {
        BissapError::Input(InputError::InvalidThreshold {
            field: field.into(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let e = BissapError::invalid_frequency("GO:1", 0.0);
        assert_eq!(
            e.to_string(),
            "Input error: Invalid background frequency for GO:1: 0 (must be in (0, 1])"
        );
        let e = BissapError::cycle("GO:2");
        assert!(e.to_string().contains("GO:2"));
    }

    #[test]
    fn nested_errors_convert() {
        let e: BissapError = GraphError::TermNotFound("GO:3".into()).into();
        assert_eq!(e, BissapError::term_not_found("GO:3"));
    }
}
