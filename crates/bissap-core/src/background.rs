//! Background frequency model and information content.
//!
//! The model maps a term to the fraction of a reference population it
//! annotates. Information content is `-log2(p)`. A term absent from the
//! model has an information content of `0.0`; that is the one documented
//! default of the crate, not an error path.

use crate::error::{BissapError, Result};
use crate::graph::TermGraph;
use crate::types::TermId;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Anything that can report the information content of a term.
///
/// Implemented for [`BackgroundModel`], plain maps of precomputed values,
/// and closures, so [`summarize`](crate::summarize::summarize) can be fed
/// from whatever the caller already has.
pub trait InformationContent {
    fn information_content(&self, term: &TermId) -> f64;
}

/// Population frequencies for ontology terms.
#[derive(Debug, Clone, Default)]
pub struct BackgroundModel {
    frequencies: HashMap<TermId, f64>,
    /// Number of population members, when the model was derived from counts.
    population_size: Option<usize>,
}

impl BackgroundModel {
    /// Build a model from precomputed probabilities.
    ///
    /// Every probability must be finite and lie in `(0, 1]`.
    pub fn from_frequencies<I, T>(frequencies: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, f64)>,
        T: Into<TermId>,
    {
        let mut out = HashMap::new();
        for (term, p) in frequencies {
            let term = term.into();
            if !p.is_finite() || p <= 0.0 || p > 1.0 {
                return Err(BissapError::invalid_frequency(term.as_str(), p));
            }
            out.insert(term, p);
        }
        Ok(Self {
            frequencies: out,
            population_size: None,
        })
    }

    /// Derive frequencies from a population annotation matrix: for every
    /// term, the number of members annotated by it divided by the number
    /// of members. Only the listed terms count; see
    /// [`from_population_propagated`](Self::from_population_propagated)
    /// for inheritance through the graph.
    pub fn from_population<'a, I, M>(population: I) -> Result<Self>
    where
        I: IntoIterator<Item = (M, &'a BTreeSet<TermId>)>,
    {
        Self::count(population.into_iter().map(|(_, terms)| terms.clone()))
    }

    /// Like [`from_population`](Self::from_population), but each member is
    /// counted for every ancestor of its terms as well.
    pub fn from_population_propagated<'a, I, M>(graph: &TermGraph, population: I) -> Result<Self>
    where
        I: IntoIterator<Item = (M, &'a BTreeSet<TermId>)>,
    {
        let mut closed = Vec::new();
        for (_, terms) in population {
            closed.push(graph.upward_closure(terms)?);
        }
        Self::count(closed)
    }

    fn count<I>(members: I) -> Result<Self>
    where
        I: IntoIterator<Item = BTreeSet<TermId>>,
    {
        let mut counts: BTreeMap<TermId, usize> = BTreeMap::new();
        let mut population = 0usize;
        for terms in members {
            population += 1;
            for term in terms {
                *counts.entry(term).or_insert(0) += 1;
            }
        }
        if population == 0 {
            return Err(BissapError::Input(crate::error::InputError::EmptyPopulation));
        }
        let n = population as f64;
        Ok(Self {
            frequencies: counts
                .into_iter()
                .map(|(term, count)| (term, count as f64 / n))
                .collect(),
            population_size: Some(population),
        })
    }

    /// Stored population fraction, if the term is known.
    pub fn frequency(&self, term: &TermId) -> Option<f64> {
        self.frequencies.get(term).copied()
    }

    pub fn population_size(&self) -> Option<usize> {
        self.population_size
    }

    pub fn contains(&self, term: &TermId) -> bool {
        self.frequencies.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// `-log2(p)` for a term known to the model, `0.0` otherwise.
pub fn information_content(term: &TermId, model: &BackgroundModel) -> f64 {
    match model.frequency(term) {
        // p == 1.0 yields -0.0; normalise so the result is never negative zero.
        Some(p) => (-p.log2()).max(0.0),
        None => 0.0,
    }
}

impl InformationContent for BackgroundModel {
    fn information_content(&self, term: &TermId) -> f64 {
        information_content(term, self)
    }
}

impl InformationContent for HashMap<TermId, f64> {
    fn information_content(&self, term: &TermId) -> f64 {
        self.get(term).copied().unwrap_or(0.0)
    }
}

impl InformationContent for BTreeMap<TermId, f64> {
    fn information_content(&self, term: &TermId) -> f64 {
        self.get(term).copied().unwrap_or(0.0)
    }
}

impl<F> InformationContent for F
where
    F: Fn(&TermId) -> f64,
{
    fn information_content(&self, term: &TermId) -> f64 {
        self(term)
    }
}
