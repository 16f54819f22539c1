//! A [`Genealogy`] backed by a tskit tree sequence.

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use tsfasta_genealogy::{Genealogy, Individual, NodeId, Population, PopulationId, Variant};

/// Convert a tskit id to a row index, [`None`] for `NULL`.
fn index<I>(id: I) -> Option<usize>
where
    I: Into<i32>,
{
    usize::try_from(id.into()).ok()
}

/// Decode a tskit state column (ancestral or derived state) as text.
fn state(bytes: Option<Vec<u8>>) -> String {
    bytes.map(|b| String::from_utf8_lossy(&b).to_string()).unwrap_or_default()
}

/// Population name from JSON metadata, as written by msprime and SLiM.
fn population_name(metadata: Option<Vec<u8>>) -> Option<String> {
    let metadata = metadata?;
    let value: serde_json::Value = serde_json::from_slice(&metadata).ok()?;
    value.get("name")?.as_str().map(String::from)
}

/// A tree sequence with its node columns cached as row indices.
pub struct TskitGenealogy {
    ts: tskit::TreeSequence,
    sequence_length: f64,
    /// Population of each node.
    node_populations: Vec<Option<PopulationId>>,
    /// Nodes of each individual, in node id order.
    individual_nodes: Vec<Vec<NodeId>>,
}

impl TskitGenealogy {
    pub fn new(ts: tskit::TreeSequence) -> Result<Self, Report> {
        let sequence_length = f64::from(
            ts.dump_tables().wrap_err("Failed to copy tree sequence tables.")?.sequence_length(),
        );

        let node_populations = ts.nodes().iter().map(|row| index(row.population)).collect_vec();

        let mut individual_nodes = vec![Vec::new(); ts.individuals().iter().count()];
        for row in ts.nodes().iter() {
            let Some(individual) = index(row.individual) else { continue };
            let node = index(row.id).ok_or_else(|| eyre!("Node has a NULL id."))?;
            individual_nodes
                .get_mut(individual)
                .ok_or_else(|| eyre!("Node {node} refers to unknown individual {individual}."))?
                .push(node);
        }

        Ok(TskitGenealogy { ts, sequence_length, node_populations, individual_nodes })
    }

    /// Load a tree sequence file (`.trees`).
    pub fn load<P>(path: &P) -> Result<Self, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let filename = path
            .as_ref()
            .to_str()
            .ok_or_else(|| eyre!("Tree sequence path is not valid UTF-8: {path:?}"))?;
        let ts = tskit::TreeSequence::load(filename)
            .wrap_err_with(|| format!("Failed to load tree sequence: {path:?}"))
            .suggestion("Is this a tskit tree sequence written by msprime, SLiM, or tskit?")?;
        let genealogy = TskitGenealogy::new(ts)?;
        debug!(
            "Loaded tree sequence with {} nodes, {} individuals, {} sites.",
            genealogy.node_populations.len(),
            genealogy.individual_nodes.len(),
            genealogy.ts.sites().iter().count()
        );
        Ok(genealogy)
    }
}

impl Genealogy for TskitGenealogy {
    fn sequence_length(&self) -> f64 {
        self.sequence_length
    }

    fn populations(&self) -> Result<Vec<Population>, Report> {
        self.ts
            .populations()
            .iter()
            .map(|row| {
                let id = index(row.id).ok_or_else(|| eyre!("Population has a NULL id."))?;
                Ok(Population { id, name: population_name(row.metadata) })
            })
            .collect()
    }

    fn individuals(&self) -> Result<Vec<Individual>, Report> {
        let individuals = self
            .individual_nodes
            .iter()
            .enumerate()
            .map(|(id, nodes)| Individual { id, nodes: nodes.clone() })
            .collect();
        Ok(individuals)
    }

    fn node_population(&self, node: NodeId) -> Result<Option<PopulationId>, Report> {
        self.node_populations
            .get(node)
            .copied()
            .ok_or_else(|| eyre!("Node {node} is not in the tree sequence."))
    }

    fn samples(&self) -> Result<Vec<NodeId>, Report> {
        self.ts
            .sample_nodes()
            .iter()
            .map(|node| index(*node).ok_or_else(|| eyre!("Sample node has a NULL id.")))
            .collect()
    }

    /// Decode genotypes by sweeping the edges along the genome, site by site.
    ///
    /// Mutations are applied in table order, so a mutation below another overwrites it.
    fn variants(&self) -> Result<Vec<Variant>, Report> {
        let sample_index: HashMap<NodeId, usize> =
            self.samples()?.into_iter().enumerate().map(|(i, node)| (node, i)).collect();

        // (left, right, parent, child)
        let edges = self
            .ts
            .edges()
            .iter()
            .map(|row| {
                let parent = index(row.parent).ok_or_else(|| eyre!("Edge has a NULL parent."))?;
                let child = index(row.child).ok_or_else(|| eyre!("Edge has a NULL child."))?;
                Ok((f64::from(row.left), f64::from(row.right), parent, child))
            })
            .collect::<Result<Vec<_>, Report>>()?;
        let insertion = edges.iter().sorted_by(|a, b| a.0.total_cmp(&b.0)).collect_vec();
        let removal = edges.iter().sorted_by(|a, b| a.1.total_cmp(&b.1)).collect_vec();

        let mut mutations: HashMap<usize, Vec<(NodeId, String)>> = HashMap::new();
        for row in self.ts.mutations().iter() {
            let site = index(row.site).ok_or_else(|| eyre!("Mutation has a NULL site."))?;
            let node = index(row.node).ok_or_else(|| eyre!("Mutation has a NULL node."))?;
            mutations.entry(site).or_default().push((node, state(row.derived_state)));
        }

        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let (mut inserted, mut removed) = (0, 0);
        let mut variants = Vec::new();

        for row in self.ts.sites().iter() {
            let position = f64::from(row.position);

            while removed < removal.len() && removal[removed].1 <= position {
                let (_, _, parent, child) = removal[removed];
                if let Some(siblings) = children.get_mut(parent) {
                    if let Some(i) = siblings.iter().position(|c| c == child) {
                        siblings.swap_remove(i);
                    }
                }
                removed += 1;
            }
            while inserted < insertion.len() && insertion[inserted].0 <= position {
                let (_, right, parent, child) = insertion[inserted];
                if *right > position {
                    children.entry(*parent).or_default().push(*child);
                }
                inserted += 1;
            }

            let mut alleles = vec![state(row.ancestral_state)];
            let mut genotypes = vec![0; sample_index.len()];
            let site = index(row.id).ok_or_else(|| eyre!("Site has a NULL id."))?;

            for (node, derived) in mutations.get(&site).into_iter().flatten() {
                let allele = match alleles.iter().position(|a| a == derived) {
                    Some(allele) => allele,
                    None => {
                        alleles.push(derived.clone());
                        alleles.len() - 1
                    }
                };
                let mut stack = vec![*node];
                while let Some(u) = stack.pop() {
                    if let Some(i) = sample_index.get(&u) {
                        genotypes[*i] = allele;
                    }
                    if let Some(below) = children.get(&u) {
                        stack.extend(below.iter().copied());
                    }
                }
            }

            variants.push(Variant { position, alleles, genotypes });
        }

        Ok(variants)
    }

    fn simplify(&self, samples: &[NodeId]) -> Result<Self, Report> {
        let samples = samples
            .iter()
            .map(|node| i32::try_from(*node).map(tskit::NodeId::from))
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("Sample node id is out of range for tskit.")?;

        let options = tskit::SimplificationOptions::FILTER_SITES
            | tskit::SimplificationOptions::FILTER_POPULATIONS
            | tskit::SimplificationOptions::FILTER_INDIVIDUALS;
        let (ts, _) = self
            .ts
            .simplify(&samples, options, false)
            .wrap_err_with(|| format!("Failed to simplify tree sequence to {} samples.", samples.len()))?;

        TskitGenealogy::new(ts)
    }
}
