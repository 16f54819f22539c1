use crate::sample::{self, Selection};
use crate::subset::{selected_nodes, subset};

use color_eyre::eyre::{Report, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet};
use tsfasta_genealogy::{examples, Genealogy};

fn selection(individuals: &[(usize, &[usize])]) -> Selection {
    Selection {
        individuals: individuals.iter().map(|(p, ids)| (*p, ids.to_vec())).collect::<BTreeMap<_, _>>(),
        populations: Vec::new(),
    }
}

#[test]
fn nodes_of_selected_individuals() -> Result<(), Report> {
    let genealogy = examples::two_populations();
    let nodes = selected_nodes(&genealogy, &selection(&[(0, &[2, 0]), (1, &[7])]))?;
    assert_eq!(nodes, [4, 5, 0, 1, 14, 15]);
    Ok(())
}

#[test]
fn unknown_individual() {
    let genealogy = examples::two_populations();
    assert!(selected_nodes(&genealogy, &selection(&[(0, &[10])])).is_err());
}

#[test]
fn subset_keeps_individuals() -> Result<(), Report> {
    let genealogy = examples::two_populations();
    let reduced = subset(&genealogy, &selection(&[(0, &[1]), (1, &[6, 9])]))?;

    assert_eq!(reduced.samples()?.len(), 6);
    assert_eq!(reduced.individuals()?.len(), 3);
    assert!(reduced.individuals()?.iter().all(|i| i.nodes.len() == 2));
    // populations 0 and 1 are referenced, ghost is dropped
    assert_eq!(reduced.populations()?.len(), 2);
    assert_eq!(reduced.sequence_length(), genealogy.sequence_length());
    Ok(())
}

#[test]
fn subset_nodes_match_selection() -> Result<(), Report> {
    let genealogy = examples::two_populations();
    let selected = selection(&[(0, &[3, 1]), (1, &[8])]);
    let nodes = selected_nodes(&genealogy, &selected)?;
    let reduced = subset(&genealogy, &selected)?;

    // reduced node i is selected node i
    assert_eq!(reduced.samples()?, (0..nodes.len()).collect::<Vec<_>>());
    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(reduced.node_population(i)?, genealogy.node_population(*node)?);
    }
    assert!(reduced.node_population(nodes.len()).is_err());

    // individuals own exactly the nodes of the selected individuals
    let owned = reduced.individuals()?.into_iter().flat_map(|i| i.nodes).collect::<BTreeSet<_>>();
    assert_eq!(owned, (0..nodes.len()).collect::<BTreeSet<_>>());
    Ok(())
}

#[test]
fn subset_drops_unused_sites() -> Result<(), Report> {
    let genealogy = examples::two_populations();
    // individual 2 owns nodes 4 and 5, only site 2.0 and the fixed site 5.5 carry derived alleles
    let reduced = subset(&genealogy, &selection(&[(0, &[2])]))?;
    let positions = reduced.variants()?.iter().map(|v| v.position).collect::<Vec<_>>();
    assert_eq!(positions, [2.0, 5.5]);
    Ok(())
}

#[test]
fn subset_empty_selection() -> Result<(), Report> {
    let reduced = subset(&examples::two_populations(), &Selection::new())?;
    assert!(reduced.samples()?.is_empty());
    assert!(reduced.individuals()?.is_empty());
    assert!(reduced.variants()?.is_empty());
    Ok(())
}

#[test]
fn subset_sampled_genealogy() -> Result<(), Report> {
    let genealogy = examples::uneven_populations();
    let mut rng = StdRng::seed_from_u64(8);
    let selection = sample::sample(&genealogy, 2, &mut rng)?;
    let reduced = subset(&genealogy, &selection)?;
    // two diploids from north, two haploids from population 2
    assert_eq!(reduced.individuals()?.len(), 4);
    assert_eq!(reduced.samples()?.len(), 6);
    Ok(())
}
