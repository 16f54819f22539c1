//! Reduce a genealogy to the haplotype nodes of sampled individuals.

#[cfg(test)]
mod tests;

use crate::sample::Selection;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use log::{debug, warn};
use std::collections::BTreeMap;
use tsfasta_genealogy::{Genealogy, IndividualId, NodeId};

/// Returns the haplotype nodes of every selected individual.
///
/// Nodes are listed in population id order, then in the order the individuals
/// were drawn, then in each individual's own node order.
pub fn selected_nodes<G>(genealogy: &G, selection: &Selection) -> Result<Vec<NodeId>, Report>
where
    G: Genealogy,
{
    let individuals: BTreeMap<IndividualId, Vec<NodeId>> =
        genealogy.individuals()?.into_iter().map(|i| (i.id, i.nodes)).collect();

    let mut nodes = Vec::new();
    for id in selection.individual_ids() {
        let individual_nodes = individuals
            .get(&id)
            .ok_or_else(|| eyre!("Sampled individual {id} is not in the genealogy."))?;
        nodes.extend(individual_nodes.iter().copied());
    }

    Ok(nodes)
}

/// Simplify a genealogy down to the nodes of the selected individuals.
///
/// ## Examples
///
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use tsfasta::{sample, subset};
/// use tsfasta_genealogy::{examples, Genealogy};
///
/// let genealogy = examples::two_populations();
/// let mut rng = StdRng::seed_from_u64(3);
/// let selection = sample::sample(&genealogy, 3, &mut rng)?;
/// let reduced = subset::subset(&genealogy, &selection)?;
/// assert_eq!(reduced.individuals()?.len(), 6);
/// assert_eq!(reduced.samples()?.len(), 12);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn subset<G>(genealogy: &G, selection: &Selection) -> Result<G, Report>
where
    G: Genealogy,
{
    if selection.is_empty() {
        warn!("No individuals were sampled, the subset genealogy will be empty.");
    }

    let nodes = selected_nodes(genealogy, selection)?;
    debug!("Simplifying genealogy to {} nodes of {} individuals.", nodes.len(), selection.len());

    genealogy
        .simplify(&nodes)
        .wrap_err_with(|| format!("Failed to simplify genealogy to {} sampled nodes.", nodes.len()))
}
