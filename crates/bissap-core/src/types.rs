//! Shared types used across the summarization pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of an ontology term (e.g. `GO:0008150`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(pub String);

impl TermId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TermId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TermId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of an annotated element (a gene or protein name, e.g. `P06132` or `SOX2`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A node of the ontology DAG.
///
/// Relations are stored as identifier sets; closures are derived by
/// [`TermGraph`](crate::graph::TermGraph) traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    /// Human-readable label.
    pub name: Option<String>,
    /// Sub-ontology, e.g. `biological_process`.
    pub namespace: Option<String>,
    /// Immediate is-a parents.
    pub parents: BTreeSet<TermId>,
    /// Immediate is-a children.
    pub children: BTreeSet<TermId>,
}

impl Term {
    pub fn new(id: impl Into<TermId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            namespace: None,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An element of interest together with the terms that annotate it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub direct_terms: BTreeSet<TermId>,
}

impl Element {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            direct_terms: BTreeSet::new(),
        }
    }

    /// Attach a direct annotation.
    pub fn annotate(mut self, term: impl Into<TermId>) -> Self {
        self.direct_terms.insert(term.into());
        self
    }

    pub fn with_terms<I, T>(id: impl Into<ElementId>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TermId>,
    {
        Self {
            id: id.into(),
            direct_terms: terms.into_iter().map(Into::into).collect(),
        }
    }
}
