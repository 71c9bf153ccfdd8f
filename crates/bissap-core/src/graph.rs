//! Term graph: the ontology DAG.
//!
//! Terms live in a petgraph `DiGraph` arena with a `HashMap` index for
//! lookup by identifier. Edges point from child to parent (is-a), so a
//! topological sort yields children before parents. Ancestor and
//! descendant closures are derived by traversal on demand.

use crate::error::{BissapError, Result};
use crate::types::{Term, TermId};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Collects terms and is-a relations, then validates them into a [`TermGraph`].
///
/// Relations may name terms that were never added explicitly; such terms
/// are created bare (no name, no namespace).
///
/// # Example
///
/// ```rust
/// use bissap_core::graph::TermGraphBuilder;
/// use bissap_core::types::{Term, TermId};
///
/// let graph = TermGraphBuilder::new()
///     .with_term(Term::new("GO:0008150").with_name("biological_process"))
///     .with_is_a("GO:0009987", "GO:0008150")
///     .build()
///     .unwrap();
///
/// assert_eq!(graph.len(), 2);
/// assert!(graph.is_ancestor(&TermId::from("GO:0008150"), &TermId::from("GO:0009987")));
/// ```
#[derive(Debug, Default, Clone)]
pub struct TermGraphBuilder {
    terms: BTreeMap<TermId, Term>,
    /// (child, parent) pairs.
    edges: BTreeSet<(TermId, TermId)>,
}

impl TermGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term. Its `parents` and `children` sets are recorded as relations.
    /// Adding the same identifier twice merges labels and relations.
    pub fn add_term(&mut self, term: Term) -> &mut Self {
        for parent in &term.parents {
            self.edges.insert((term.id.clone(), parent.clone()));
        }
        for child in &term.children {
            self.edges.insert((child.clone(), term.id.clone()));
        }
        match self.terms.get_mut(&term.id) {
            Some(existing) => {
                if term.name.is_some() {
                    existing.name = term.name;
                }
                if term.namespace.is_some() {
                    existing.namespace = term.namespace;
                }
            }
            None => {
                let id = term.id.clone();
                self.terms.insert(
                    id,
                    Term {
                        parents: BTreeSet::new(),
                        children: BTreeSet::new(),
                        ..term
                    },
                );
            }
        }
        self
    }

    /// Record that `child` is-a `parent`.
    pub fn add_is_a(&mut self, child: impl Into<TermId>, parent: impl Into<TermId>) -> &mut Self {
        self.edges.insert((child.into(), parent.into()));
        self
    }

    pub fn with_term(mut self, term: Term) -> Self {
        self.add_term(term);
        self
    }

    pub fn with_is_a(mut self, child: impl Into<TermId>, parent: impl Into<TermId>) -> Self {
        self.add_is_a(child, parent);
        self
    }

    /// Validate and freeze the graph.
    ///
    /// Fails with [`GraphError::Cycle`](crate::error::GraphError::Cycle) if
    /// the is-a relation contains a cycle (self-loops included).
    pub fn build(self) -> Result<TermGraph> {
        let TermGraphBuilder { mut terms, edges } = self;

        for (child, parent) in &edges {
            if child == parent {
                return Err(BissapError::cycle(child.as_str()));
            }
            terms
                .entry(child.clone())
                .or_insert_with(|| Term::new(child.clone()));
            terms
                .entry(parent.clone())
                .or_insert_with(|| Term::new(parent.clone()));
        }
        for (child, parent) in &edges {
            if let Some(term) = terms.get_mut(child) {
                term.parents.insert(parent.clone());
            }
            if let Some(term) = terms.get_mut(parent) {
                term.children.insert(child.clone());
            }
        }

        let mut graph: DiGraph<Term, ()> = DiGraph::with_capacity(terms.len(), edges.len());
        let mut index: HashMap<TermId, NodeIndex> = HashMap::with_capacity(terms.len());
        for (id, term) in terms {
            let idx = graph.add_node(term);
            index.insert(id, idx);
        }
        for (child, parent) in &edges {
            graph.add_edge(index[child], index[parent], ());
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| BissapError::cycle(graph[cycle.node_id()].id.as_str()))?;

        Ok(TermGraph {
            graph,
            index,
            order,
        })
    }
}

/// Immutable, validated ontology DAG.
#[derive(Debug, Clone)]
pub struct TermGraph {
    graph: DiGraph<Term, ()>,
    /// Map from term identifier to petgraph's internal index.
    index: HashMap<TermId, NodeIndex>,
    /// Topological order, children before parents.
    order: Vec<NodeIndex>,
}

impl TermGraph {
    pub fn builder() -> TermGraphBuilder {
        TermGraphBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of is-a edges.
    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &TermId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &TermId) -> Option<&Term> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    /// All terms, in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.graph.node_weights()
    }

    pub fn parents(&self, id: &TermId) -> Result<&BTreeSet<TermId>> {
        Ok(&self.node(id)?.parents)
    }

    pub fn children(&self, id: &TermId) -> Result<&BTreeSet<TermId>> {
        Ok(&self.node(id)?.children)
    }

    /// Every term reachable through one or more parent edges (excluding `id`).
    pub fn ancestors(&self, id: &TermId) -> Result<BTreeSet<TermId>> {
        let start = self.node_index(id)?;
        let mut dfs = Dfs::new(&self.graph, start);
        let mut out = BTreeSet::new();
        while let Some(idx) = dfs.next(&self.graph) {
            if idx != start {
                out.insert(self.graph[idx].id.clone());
            }
        }
        Ok(out)
    }

    /// Every term reachable through one or more child edges (excluding `id`).
    pub fn descendants(&self, id: &TermId) -> Result<BTreeSet<TermId>> {
        let start = self.node_index(id)?;
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut out = BTreeSet::new();
        while let Some(idx) = dfs.next(reversed) {
            if idx != start {
                out.insert(self.graph[idx].id.clone());
            }
        }
        Ok(out)
    }

    /// Union of each given term with its ancestor closure.
    pub fn upward_closure<'a, I>(&self, ids: I) -> Result<BTreeSet<TermId>>
    where
        I: IntoIterator<Item = &'a TermId>,
    {
        let mut out = BTreeSet::new();
        for id in ids {
            if out.contains(id) {
                continue;
            }
            out.extend(self.ancestors(id)?);
            out.insert(id.clone());
        }
        Ok(out)
    }

    /// True if `ancestor` is reachable from `descendant` via parent edges.
    /// Unknown terms are never related.
    pub fn is_ancestor(&self, ancestor: &TermId, descendant: &TermId) -> bool {
        let (Some(&from), Some(&to)) = (self.index.get(descendant), self.index.get(ancestor)) else {
            return false;
        };
        if from == to {
            return false;
        }
        petgraph::algo::has_path_connecting(&self.graph, from, to, None)
    }

    /// Term identifiers, children always before their parents.
    pub fn topological_order(&self) -> impl Iterator<Item = &TermId> {
        self.order.iter().map(|idx| &self.graph[*idx].id)
    }

    /// Terms without parents.
    pub fn roots(&self) -> Vec<&TermId> {
        self.graph
            .node_indices()
            .filter(|idx| {
                self.graph
                    .neighbors_directed(*idx, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.graph[idx].id)
            .collect()
    }

    /// Terms without children.
    pub fn leaves(&self) -> Vec<&TermId> {
        self.graph
            .node_indices()
            .filter(|idx| {
                self.graph
                    .neighbors_directed(*idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.graph[idx].id)
            .collect()
    }

    fn node_index(&self, id: &TermId) -> Result<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| BissapError::term_not_found(id.as_str()))
    }

    fn node(&self, id: &TermId) -> Result<&Term> {
        Ok(&self.graph[self.node_index(id)?])
    }
}
