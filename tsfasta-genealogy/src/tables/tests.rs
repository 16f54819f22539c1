use crate::{examples, Genealogy, Individual, Population, Tables};
use color_eyre::eyre::{Report, Result};

#[test]
fn variants_align_with_samples() -> Result<(), Report> {
    let tables = examples::two_populations();
    let samples = tables.samples()?;
    assert_eq!(samples, (0..20).collect::<Vec<_>>());

    let variants = tables.variants()?;
    let positions = variants.iter().map(|v| v.position).collect::<Vec<_>>();
    assert_eq!(positions, [2.0, 5.5, 9.0, 14.0, 17.9]);

    // unlisted nodes carry the ancestral allele
    assert_eq!(variants[0].genotype(0), Some(1));
    assert_eq!(variants[0].genotype(1), Some(0));
    assert_eq!(variants[2].genotype(6), Some(2));
    assert_eq!(variants[2].genotype(20), None);
    assert_eq!(variants[1].distinct_alleles().len(), 1);
    Ok(())
}

#[test]
fn node_population() -> Result<(), Report> {
    let tables = examples::two_populations();
    assert_eq!(tables.node_population(0)?, Some(0));
    assert_eq!(tables.node_population(19)?, Some(1));
    assert!(tables.node_population(20).is_err());
    Ok(())
}

#[test]
fn simplify_keeps_sample_nodes() -> Result<(), Report> {
    let tables = examples::two_populations();
    // nodes of individual 7, then individual 2
    let simplified = tables.simplify(&[14, 15, 4, 5])?;

    assert_eq!(simplified.samples()?, [0, 1, 2, 3]);
    assert_eq!(simplified.node_population(0)?, Some(1));
    assert_eq!(simplified.node_population(2)?, Some(0));

    // the empty population is filtered out
    let expected = vec![Population { id: 0, name: None }, Population { id: 1, name: None }];
    assert_eq!(simplified.populations()?, expected);

    // individuals keep their original relative order
    let expected = vec![
        Individual { id: 0, nodes: vec![2, 3] },
        Individual { id: 1, nodes: vec![0, 1] },
    ];
    assert_eq!(simplified.individuals()?, expected);

    // sites without a remaining derived allele are dropped
    let positions = simplified.variants()?.iter().map(|v| v.position).collect::<Vec<_>>();
    assert_eq!(positions, [2.0, 5.5, 14.0]);
    simplified.validate()?;
    Ok(())
}

#[test]
fn simplify_reindexes_alleles() -> Result<(), Report> {
    let tables = examples::two_populations();
    let simplified = tables.simplify(&[6, 7])?;

    let variant = simplified
        .variants()?
        .into_iter()
        .find(|v| v.position == 9.0)
        .expect("site 9.0 should be kept");
    assert_eq!(variant.alleles, ["G", "C"]);
    assert_eq!(variant.genotypes, [1, 0]);
    Ok(())
}

#[test]
fn simplify_to_nothing() -> Result<(), Report> {
    let simplified = examples::two_populations().simplify(&[])?;
    assert!(simplified.individuals()?.is_empty());
    assert!(simplified.populations()?.is_empty());
    assert!(simplified.variants()?.is_empty());
    assert_eq!(simplified.sequence_length(), 20.0);
    Ok(())
}

#[test]
fn simplify_rejects_bad_samples() {
    let tables = examples::two_populations();
    assert!(tables.simplify(&[3, 3]).is_err());
    assert!(tables.simplify(&[99]).is_err());
}

#[test]
fn validate_rejects_allele_out_of_range() {
    let mut tables = examples::two_populations();
    tables.add_site(1.0, &["A", "T"], &[(0, 2)]);
    assert!(tables.validate().is_err());

    let mut tables = examples::two_populations();
    tables.add_site(25.0, &["A", "T"], &[(0, 1)]);
    assert!(tables.validate().is_err());
}

#[test]
fn read_write() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("uneven.json");

    let expected = examples::uneven_populations();
    expected.write(&path)?;
    let observed = Tables::read(&path)?;
    assert_eq!(expected, observed);
    Ok(())
}

#[test]
fn read_invalid() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("invalid.json");
    std::fs::write(&path, r#"{"sequence_length": 10.0, "nodes": [{"population": 1}]}"#)?;
    assert!(Tables::read(&path).is_err());
    Ok(())
}
