//! Read-only views of population-structured genealogies (tree sequences).
//!
//! The [`Genealogy`] trait is the query surface that `tsfasta` needs from an ancestry
//! backend: populations, individuals and their haplotype nodes, sample nodes, decoded
//! variants, and a topology reduction (`simplify`) to a chosen set of sample nodes.
//!
//! [`Tables`] is an in-memory backend where genotypes are stored directly, which is
//! handy for small hand-written inputs and for tests.
//!
//! ```rust
//! use tsfasta_genealogy::{examples, Genealogy};
//! let tables = examples::two_populations();
//! assert_eq!(tables.populations()?.len(), 3);
//! assert_eq!(tables.individuals()?.len(), 10);
//! assert_eq!(tables.samples()?.len(), 20);
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```

use color_eyre::eyre::{Report, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

pub mod examples;
mod tables;

#[doc(inline)]
pub use tables::{Node, Site, Tables};

/// Row index of a haplotype node.
pub type NodeId = usize;
/// Row index of an individual.
pub type IndividualId = usize;
/// Row index of a population.
pub type PopulationId = usize;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Read-only query surface of an ancestry dataset.
pub trait Genealogy {
    /// Total length of the genome, in (possibly fractional) base pairs.
    fn sequence_length(&self) -> f64;

    /// Returns all populations, in id order.
    fn populations(&self) -> Result<Vec<Population>, Report>;

    /// Returns all individuals with their haplotype nodes, in id order.
    fn individuals(&self) -> Result<Vec<Individual>, Report>;

    /// Returns the population of a node, or [`None`] if the node has no population.
    ///
    /// Errors if the node is not in the genealogy.
    fn node_population(&self, node: NodeId) -> Result<Option<PopulationId>, Report>;

    /// Returns the sample nodes, in sample index order.
    fn samples(&self) -> Result<Vec<NodeId>, Report>;

    /// Returns one decoded [`Variant`] per site, with genotypes aligned to [`Genealogy::samples`].
    fn variants(&self) -> Result<Vec<Variant>, Report>;

    /// Returns a new genealogy reduced to the ancestry of `samples`.
    ///
    /// The nodes in `samples` become nodes `0..n` of the result, in the given order.
    /// Individuals and populations that are no longer referenced are removed, and sites
    /// without any derived allele in the remaining samples are dropped.
    fn simplify(&self, samples: &[NodeId]) -> Result<Self, Report>
    where
        Self: Sized;
}

// ----------------------------------------------------------------------------
// Population
// ----------------------------------------------------------------------------

/// A population (deme) of the genealogy.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Population {
    pub id: PopulationId,
    /// Display name from the population metadata, if there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Population {
    /// Returns the metadata name, falling back to `pop<id>`.
    ///
    /// ```rust
    /// use tsfasta_genealogy::Population;
    /// assert_eq!(Population { id: 4, name: None }.display_name(), "pop4");
    /// assert_eq!(Population { id: 4, name: Some("NAT".into()) }.display_name(), "NAT");
    /// ```
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("pop{}", self.id))
    }
}

impl Display for Population {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ----------------------------------------------------------------------------
// Individual
// ----------------------------------------------------------------------------

/// An individual (organism) and the haplotype nodes (genome copies) it owns.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Individual {
    pub id: IndividualId,
    pub nodes: Vec<NodeId>,
}

// ----------------------------------------------------------------------------
// Variant
// ----------------------------------------------------------------------------

/// Decoded genotypes at a single site.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Variant {
    /// Site position along the genome.
    pub position: f64,
    /// Allele states, the ancestral (reference) state first.
    pub alleles: Vec<String>,
    /// Allele index of each sample, aligned with [`Genealogy::samples`].
    pub genotypes: Vec<usize>,
}

impl Variant {
    /// Returns the allele index carried by the sample at `sample_index`.
    pub fn genotype(&self, sample_index: usize) -> Option<usize> {
        self.genotypes.get(sample_index).copied()
    }

    /// Returns the set of allele indices observed across all samples.
    ///
    /// ```rust
    /// use tsfasta_genealogy::Variant;
    /// let variant = Variant { position: 1.0, alleles: vec!["A".into(), "T".into()], genotypes: vec![1, 1, 0] };
    /// assert_eq!(variant.distinct_alleles().into_iter().collect::<Vec<_>>(), [0, 1]);
    /// ```
    pub fn distinct_alleles(&self) -> BTreeSet<usize> {
        self.genotypes.iter().copied().collect()
    }
}
