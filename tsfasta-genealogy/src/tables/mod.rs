#[cfg(test)]
mod tests;

use crate::{Genealogy, Individual, IndividualId, NodeId, Population, PopulationId, Variant};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::path::Path;

// ----------------------------------------------------------------------------
// Node
// ----------------------------------------------------------------------------

/// A haplotype node row.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Node {
    #[serde(default)]
    pub population: Option<PopulationId>,
    /// True if this node is a sample, and therefore has genotypes.
    #[serde(default = "Node::default_sample")]
    pub sample: bool,
}

impl Node {
    fn default_sample() -> bool {
        true
    }
}

// ----------------------------------------------------------------------------
// Site
// ----------------------------------------------------------------------------

/// A site row with its genotypes stored directly.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Site {
    pub position: f64,
    /// Allele states, ancestral first.
    pub alleles: Vec<String>,
    /// Allele index of sample nodes carrying a derived allele.
    /// Sample nodes that are not listed carry the ancestral allele (0).
    #[serde(default)]
    pub genotypes: BTreeMap<NodeId, usize>,
}

impl Site {
    /// Returns the allele index of a node at this site.
    pub fn genotype(&self, node: NodeId) -> usize {
        self.genotypes.get(&node).copied().unwrap_or(0)
    }
}

// ----------------------------------------------------------------------------
// Tables
// ----------------------------------------------------------------------------

/// An in-memory genealogy, as a collection of tables.
///
/// Row ids are row indices: `populations[i].id` and `individuals[i].id` must equal `i`,
/// and node ids are positions in `nodes`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Tables {
    pub sequence_length: f64,
    #[serde(default)]
    pub populations: Vec<Population>,
    #[serde(default)]
    pub individuals: Vec<Individual>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub sites: Vec<Site>,
}

impl Tables {
    /// Returns new empty [`Tables`] with a genome of `sequence_length`.
    pub fn new(sequence_length: f64) -> Self {
        Tables { sequence_length, ..Default::default() }
    }

    /// Adds a population and returns its id.
    pub fn add_population(&mut self, name: Option<&str>) -> PopulationId {
        let id = self.populations.len();
        self.populations.push(Population { id, name: name.map(String::from) });
        id
    }

    /// Adds an individual with `ploidy` new sample nodes in `population`, and returns its id.
    pub fn add_individual(&mut self, population: Option<PopulationId>, ploidy: usize) -> IndividualId {
        let id = self.individuals.len();
        let nodes = (0..ploidy)
            .map(|_| {
                self.nodes.push(Node { population, sample: true });
                self.nodes.len() - 1
            })
            .collect_vec();
        self.individuals.push(Individual { id, nodes });
        id
    }

    /// Adds a site with the derived `genotypes` of sample nodes.
    pub fn add_site(&mut self, position: f64, alleles: &[&str], genotypes: &[(NodeId, usize)]) {
        let site = Site {
            position,
            alleles: alleles.iter().map(|a| a.to_string()).collect(),
            genotypes: genotypes.iter().copied().collect(),
        };
        self.sites.push(site);
    }

    /// Checks that all row references are in range and consistent.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use tsfasta_genealogy::{examples, Tables};
    /// examples::two_populations().validate()?;
    ///
    /// let mut tables = Tables::new(10.0);
    /// tables.add_individual(Some(3), 2);
    /// assert!(tables.validate().is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn validate(&self) -> Result<(), Report> {
        if !(self.sequence_length > 0.0) {
            return Err(eyre!("Invalid sequence length: {}", self.sequence_length)
                .suggestion("The sequence length must be greater than 0."));
        }

        if let Some((i, p)) = self.populations.iter().enumerate().find(|(i, p)| p.id != *i) {
            return Err(eyre!("Population at row {i} has mismatched id {}.", p.id));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(population) = node.population {
                if population >= self.populations.len() {
                    return Err(eyre!("Node {i} refers to missing population {population}.")
                        .suggestion(format!("There are {} populations.", self.populations.len())));
                }
            }
        }

        let mut owners: BTreeMap<NodeId, IndividualId> = BTreeMap::new();
        for (i, individual) in self.individuals.iter().enumerate() {
            if individual.id != i {
                return Err(eyre!("Individual at row {i} has mismatched id {}.", individual.id));
            }
            for node in &individual.nodes {
                if *node >= self.nodes.len() {
                    return Err(eyre!("Individual {i} refers to missing node {node}."));
                }
                if let Some(other) = owners.insert(*node, i) {
                    return Err(eyre!("Node {node} belongs to both individual {other} and {i}."));
                }
            }
        }

        for site in &self.sites {
            if site.alleles.is_empty() {
                return Err(eyre!("Site at position {} has no alleles.", site.position)
                    .suggestion("The first allele is the ancestral state."));
            }
            if site.position < 0.0 || site.position >= self.sequence_length {
                return Err(eyre!(
                    "Site position {} is outside the genome [0, {}).",
                    site.position,
                    self.sequence_length
                ));
            }
            for (node, allele) in &site.genotypes {
                if !self.nodes.get(*node).map(|n| n.sample).unwrap_or(false) {
                    return Err(eyre!(
                        "Site at position {} has a genotype for node {node}, which is not a sample.",
                        site.position
                    ));
                }
                if *allele >= site.alleles.len() {
                    return Err(eyre!(
                        "Site at position {} has allele index {allele} for node {node}, but only {} alleles.",
                        site.position,
                        site.alleles.len()
                    ));
                }
            }
        }

        Ok(())
    }

    /// Reads [`Tables`] from a JSON file and validates them.
    pub fn read<P>(path: &P) -> Result<Tables, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read genealogy tables: {path:?}."))?;
        let tables: Tables = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize genealogy tables: {path:?}"))?;
        tables.validate().wrap_err_with(|| format!("Invalid genealogy tables: {path:?}"))?;
        Ok(tables)
    }

    /// Writes [`Tables`] to a JSON file.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let output = serde_json::to_string_pretty(self)
            .wrap_err("Failed to serialize genealogy tables.")?;
        std::fs::write(path, output)
            .wrap_err_with(|| format!("Failed to write genealogy tables: {path:?}"))?;
        Ok(())
    }
}

impl Genealogy for Tables {
    fn sequence_length(&self) -> f64 {
        self.sequence_length
    }

    fn populations(&self) -> Result<Vec<Population>, Report> {
        Ok(self.populations.clone())
    }

    fn individuals(&self) -> Result<Vec<Individual>, Report> {
        Ok(self.individuals.clone())
    }

    fn node_population(&self, node: NodeId) -> Result<Option<PopulationId>, Report> {
        self.nodes
            .get(node)
            .map(|n| n.population)
            .ok_or_else(|| eyre!("Node {node} is not in the genealogy ({} nodes).", self.nodes.len()))
    }

    fn samples(&self) -> Result<Vec<NodeId>, Report> {
        let samples = self.nodes.iter().positions(|n| n.sample).collect_vec();
        Ok(samples)
    }

    fn variants(&self) -> Result<Vec<Variant>, Report> {
        let samples = self.samples()?;
        let variants = self
            .sites
            .iter()
            .map(|site| Variant {
                position: site.position,
                alleles: site.alleles.clone(),
                genotypes: samples.iter().map(|node| site.genotype(*node)).collect(),
            })
            .collect_vec();
        Ok(variants)
    }

    /// Reduces the tables to `samples`.
    ///
    /// There are no edges in [`Tables`], so the reduction keeps exactly the sample
    /// nodes and re-indexes everything that refers to them.
    fn simplify(&self, samples: &[NodeId]) -> Result<Self, Report> {
        self.validate()?;

        // old node id -> new node id
        let mut node_map: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        for (new, old) in samples.iter().enumerate() {
            if *old >= self.nodes.len() {
                return Err(eyre!("Cannot simplify to node {old}, which is not in the genealogy."));
            }
            if node_map.insert(*old, new).is_some() {
                return Err(eyre!("Cannot simplify to duplicate sample node {old}."));
            }
        }

        // populations referenced by retained nodes, in original order
        let population_map: BTreeMap<PopulationId, PopulationId> = samples
            .iter()
            .filter_map(|old| self.nodes[*old].population)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(new, old)| (old, new))
            .collect();

        let mut simplified = Tables::new(self.sequence_length);
        simplified.populations = population_map
            .iter()
            .map(|(old, new)| Population { id: *new, name: self.populations[*old].name.clone() })
            .collect();
        simplified.nodes = samples
            .iter()
            .map(|old| Node {
                population: self.nodes[*old].population.map(|p| population_map[&p]),
                sample: true,
            })
            .collect();

        // individuals with at least one retained node, in original order
        simplified.individuals = self
            .individuals
            .iter()
            .filter_map(|individual| {
                let nodes = individual
                    .nodes
                    .iter()
                    .filter_map(|old| node_map.get(old).copied())
                    .sorted()
                    .collect_vec();
                (!nodes.is_empty()).then_some(nodes)
            })
            .enumerate()
            .map(|(id, nodes)| Individual { id, nodes })
            .collect();

        // sites that still carry a derived allele, with alleles re-indexed
        simplified.sites = self
            .sites
            .iter()
            .filter_map(|site| {
                let genotypes = site
                    .genotypes
                    .iter()
                    .filter(|(_, allele)| **allele != 0)
                    .filter_map(|(old, allele)| node_map.get(old).map(|new| (*new, *allele)))
                    .collect::<BTreeMap<_, _>>();
                if genotypes.is_empty() {
                    return None;
                }
                let kept = std::iter::once(0).chain(genotypes.values().copied()).collect::<BTreeSet<_>>();
                let allele_map: BTreeMap<usize, usize> =
                    kept.iter().enumerate().map(|(new, old)| (*old, new)).collect();
                Some(Site {
                    position: site.position,
                    alleles: kept.iter().map(|i| site.alleles[*i].clone()).collect(),
                    genotypes: genotypes.into_iter().map(|(n, a)| (n, allele_map[&a])).collect(),
                })
            })
            .collect();

        Ok(simplified)
    }
}
