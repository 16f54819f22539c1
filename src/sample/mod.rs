//! Sample individuals from each population of a genealogy.


use crate::utils::table::Table;
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use indoc::formatdoc;
use itertools::Itertools;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tsfasta_genealogy::{Genealogy, Individual, IndividualId, PopulationId};

/// Individuals grouped by population, in population id order.
pub type PopulationMap = BTreeMap<PopulationId, Vec<Individual>>;

/// Group individuals by the population of their first node.
///
/// Every population of the genealogy is a key, including populations without
/// individuals. Individuals keep their id order within a population.
///
/// ## Examples
///
/// ```rust
/// use tsfasta::sample::group_by_population;
/// use tsfasta_genealogy::examples;
///
/// let groups = group_by_population(&examples::two_populations())?;
/// let sizes = groups.values().map(|inds| inds.len()).collect::<Vec<_>>();
/// assert_eq!(sizes, [5, 5, 0]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn group_by_population<G>(genealogy: &G) -> Result<PopulationMap, Report>
where
    G: Genealogy,
{
    let mut groups: PopulationMap =
        genealogy.populations()?.into_iter().map(|p| (p.id, Vec::new())).collect();

    for individual in genealogy.individuals()? {
        let first_node = individual.nodes.first().ok_or_else(|| {
            eyre!("Individual {} has no haplotype nodes.", individual.id)
                .suggestion("Every individual needs at least one node to be assigned a population.")
        })?;
        let population = genealogy.node_population(*first_node)?.ok_or_else(|| {
            eyre!("Node {first_node} of individual {} has no population.", individual.id)
                .suggestion("Was the genealogy simulated with population labels?")
        })?;
        groups.entry(population).or_default().push(individual);
    }

    Ok(groups)
}

// ----------------------------------------------------------------------------
// Selection
// ----------------------------------------------------------------------------

/// The sampling outcome of a single population.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PopulationSample {
    pub id: PopulationId,
    /// Metadata name of the population, or `pop<id>`.
    pub name: String,
    /// Number of individuals in the population.
    pub count: usize,
    /// Sampled individuals, in the order they were drawn.
    pub sampled: Vec<IndividualId>,
}

/// Individuals sampled from each non-empty population.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Selection {
    /// Sampled individual ids, keyed by population id.
    pub individuals: BTreeMap<PopulationId, Vec<IndividualId>>,
    /// Per-population summary, in population id order.
    pub populations: Vec<PopulationSample>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Total number of sampled individuals.
    pub fn len(&self) -> usize {
        self.individuals.values().map(|ids| ids.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All sampled individual ids, in population id order, then drawn order.
    pub fn individual_ids(&self) -> impl Iterator<Item = IndividualId> + '_ {
        self.individuals.values().flatten().copied()
    }

    /// Human-readable summary, two lines per population.
    pub fn pretty_print(&self) -> String {
        self.populations
            .iter()
            .map(|p| {
                formatdoc!(
                    "Population {} ({}): {} individuals
                    Sampled individuals from population {}: {:?}",
                    p.id,
                    p.name,
                    p.count,
                    p.id,
                    p.sampled,
                )
            })
            .join("\n")
    }

    /// Summary as a [`Table`] of population, name, individuals, sampled.
    pub fn to_table(&self) -> Table<String> {
        let mut table = Table::new();
        table.headers = ["population", "name", "individuals", "sampled"]
            .into_iter()
            .map(String::from)
            .collect();
        table.rows = self
            .populations
            .iter()
            .map(|p| vec![p.id.to_string(), p.name.clone(), p.count.to_string(), p.sampled.iter().join(";")])
            .collect();
        table
    }
}

// ----------------------------------------------------------------------------
// Sample
// ----------------------------------------------------------------------------

/// Sample up to `sample_size` individuals, without replacement, from every population.
///
/// Populations without individuals are left out of the [`Selection`].
///
/// ## Examples
///
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use tsfasta::sample;
/// use tsfasta_genealogy::examples;
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let selection = sample::sample(&examples::two_populations(), 3, &mut rng)?;
/// assert_eq!(selection.individuals.keys().collect::<Vec<_>>(), [&0, &1]);
/// assert!(selection.individuals.values().all(|ids| ids.len() == 3));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn sample<G, R>(genealogy: &G, sample_size: usize, rng: &mut R) -> Result<Selection, Report>
where
    G: Genealogy,
    R: Rng + ?Sized,
{
    let names: BTreeMap<PopulationId, String> =
        genealogy.populations()?.into_iter().map(|p| (p.id, p.display_name())).collect();

    let mut selection = Selection::new();

    for (population, individuals) in group_by_population(genealogy)? {
        let count = individuals.len();
        if count == 0 {
            debug!("Skipping population {population}, it has no individuals.");
            continue;
        }
        let name = names.get(&population).cloned().unwrap_or_else(|| format!("pop{population}"));
        debug!("Population {population} ({name}): {count} individuals");

        let n = sample_size.min(count);
        let sampled = individuals.choose_multiple(rng, n).map(|i| i.id).collect_vec();
        debug!("Sampled individuals from population {population}: {sampled:?}");

        if !sampled.is_empty() {
            selection.individuals.insert(population, sampled.clone());
        }
        selection.populations.push(PopulationSample { id: population, name, count, sampled });
    }

    Ok(selection)
}
