//! Loading of the on-disk inputs: ontology, annotations, background,
//! enrichment results and the study list.
//!
//! Unknown term identifiers in annotations or enrichment results are logged
//! and dropped rather than failing the whole run.

use anyhow::{Context, Result};
use bissap_core::background::BackgroundModel;
use bissap_core::candidates::{CandidateFilter, CandidatePool, OverrepresentedTerm};
use bissap_core::coverage::{build_coverage, CoverageIndex};
use bissap_core::graph::TermGraph;
use bissap_core::types::{Element, ElementId, Term, TermId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Member -> directly annotated terms.
pub type Annotations = BTreeMap<ElementId, BTreeSet<TermId>>;

/// One ontology term as stored in the graph file.
#[derive(Debug, Deserialize)]
struct TermRecord {
    id: TermId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    is_a: Vec<TermId>,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what}: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {what}: {}", path.display()))
}

pub fn load_graph(path: &Path) -> Result<TermGraph> {
    let records: Vec<TermRecord> = read_json(path, "ontology")?;
    let mut builder = TermGraph::builder();
    for record in records {
        let mut term = Term::new(record.id.clone());
        term.name = record.name;
        term.namespace = record.namespace;
        builder.add_term(term);
        for parent in record.is_a {
            builder.add_is_a(record.id.clone(), parent);
        }
    }
    let graph = builder
        .build()
        .with_context(|| format!("Invalid ontology: {}", path.display()))?;
    info!(
        terms = graph.len(),
        relations = graph.relation_count(),
        "ontology loaded"
    );
    Ok(graph)
}

/// Load annotations, dropping terms the ontology does not know.
pub fn load_annotations(path: &Path, graph: &TermGraph) -> Result<Annotations> {
    let raw: Annotations = read_json(path, "annotations")?;
    let mut dropped = 0usize;
    let annotations: Annotations = raw
        .into_iter()
        .map(|(member, terms)| {
            let known: BTreeSet<TermId> = terms
                .into_iter()
                .filter(|t| {
                    let ok = graph.contains(t);
                    if !ok {
                        warn!(member = %member, term = %t, "annotation to unknown term ignored");
                        dropped += 1;
                    }
                    ok
                })
                .collect();
            (member, known)
        })
        .collect();
    info!(members = annotations.len(), dropped, "annotations loaded");
    Ok(annotations)
}

pub fn load_background(path: &Path) -> Result<BackgroundModel> {
    let raw: BTreeMap<TermId, f64> = read_json(path, "background")?;
    BackgroundModel::from_frequencies(raw)
        .with_context(|| format!("Invalid background: {}", path.display()))
}

/// Background from the file when given, otherwise counted from the
/// annotation population with inheritance.
pub fn background_or_population(
    path: Option<&Path>,
    graph: &TermGraph,
    population: &Annotations,
) -> Result<BackgroundModel> {
    match path {
        Some(path) => load_background(path),
        None => {
            debug!(members = population.len(), "deriving background from annotations");
            BackgroundModel::from_population_propagated(graph, population)
                .context("Failed to derive background from annotations")
        }
    }
}

/// Load enrichment results, dropping terms the ontology does not know.
pub fn load_candidates(path: &Path, graph: &TermGraph) -> Result<Vec<OverrepresentedTerm>> {
    let raw: Vec<OverrepresentedTerm> = read_json(path, "candidates")?;
    Ok(raw
        .into_iter()
        .filter(|c| {
            let ok = graph.contains(&c.term);
            if !ok {
                warn!(term = %c.term, "overrepresented term missing from ontology ignored");
            }
            ok
        })
        .collect())
}

/// One element per line; only the first tab-separated column counts.
/// Blank lines and `#` comments are skipped.
pub fn load_study(path: &Path) -> Result<BTreeSet<ElementId>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read study set: {}", path.display()))?;
    Ok(parse_study(&content))
}

fn parse_study(content: &str) -> BTreeSet<ElementId> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split('\t').next())
        .map(|id| ElementId::from(id.trim()))
        .collect()
}

/// Everything a command needs about one study set.
pub struct Study {
    pub graph: TermGraph,
    pub population: Annotations,
    pub elements_of_interest: BTreeSet<ElementId>,
    pub coverage: CoverageIndex,
}

impl Study {
    pub fn load(study: &Path, graph: &Path, annotations: &Path) -> Result<Self> {
        let graph = load_graph(graph)?;
        let population = load_annotations(annotations, &graph)?;
        let elements_of_interest = load_study(study)?;
        anyhow::ensure!(
            !elements_of_interest.is_empty(),
            "Study set is empty: {}",
            study.display()
        );

        let elements: Vec<Element> = elements_of_interest
            .iter()
            .filter_map(|id| match population.get(id) {
                Some(terms) => Some(Element::with_terms(id.clone(), terms.iter().cloned())),
                None => {
                    warn!(element = %id, "study element has no annotations");
                    None
                }
            })
            .collect();
        let coverage = build_coverage(&graph, &elements)?;

        Ok(Self {
            graph,
            population,
            elements_of_interest,
            coverage,
        })
    }

    /// Candidate pool from enrichment results, or from every term
    /// annotating the study set when none are given.
    pub fn pool(&self, candidates: Option<&Path>, filter: &CandidateFilter) -> Result<CandidatePool> {
        let pool = match candidates {
            Some(path) => {
                let flagged = load_candidates(path, &self.graph)?;
                CandidatePool::from_overrepresented(
                    &self.graph,
                    &self.coverage,
                    flagged,
                    &self.elements_of_interest,
                    filter,
                )?
            }
            None => CandidatePool::from_study(
                &self.graph,
                &self.coverage,
                &self.elements_of_interest,
                filter,
            )?,
        };
        info!(candidates = pool.len(), "candidate pool built");
        Ok(pool)
    }
}
