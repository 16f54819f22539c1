use crate::run::{pipeline, run, write_selection, RunArgs};

use color_eyre::eyre::{Report, Result};
use noodles::fasta;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tsfasta_genealogy::{examples, Tables};

/// Read (name, sequence) pairs from a FASTA file.
fn read_fasta(path: &Path) -> Result<Vec<(String, String)>, Report> {
    let mut reader = File::open(path).map(BufReader::new).map(fasta::Reader::new)?;
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let sequence = String::from_utf8(record.sequence().as_ref().to_vec())?;
        records.push((record.name().to_string(), sequence));
    }
    Ok(records)
}

fn run_to_fasta(tables: &Tables, args: RunArgs) -> Result<Vec<(String, String)>, Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("genealogy.json");
    let output = dir.path().join("sequences.fasta");
    tables.write(&input)?;

    let args = RunArgs { input, output: Some(output.clone()), ..args };
    run(&args)?;
    read_fasta(&output)
}

#[test]
fn run_default_names() -> Result<(), Report> {
    let args = RunArgs { seed: Some(1), ..Default::default() };
    let records = run_to_fasta(&examples::two_populations(), args)?;

    assert_eq!(records.len(), 6);
    let prefixes = records.iter().map(|(name, _)| name.split("_ind").next().unwrap_or_default()).collect::<BTreeSet<_>>();
    assert_eq!(prefixes, BTreeSet::from(["NAT", "BS"]));
    assert!(records.iter().all(|(_, sequence)| sequence.len() == 20));
    Ok(())
}

#[test]
fn run_name_fallback() -> Result<(), Report> {
    let args = RunArgs {
        seed: Some(2),
        population_names: vec!["NAT".to_string()],
        ..Default::default()
    };
    let records = run_to_fasta(&examples::uneven_populations(), args)?;

    // 3 of 4 from north, both haploids from population 2
    assert_eq!(records.len(), 5);
    assert_eq!(records.iter().filter(|(name, _)| name.starts_with("NAT_ind")).count(), 3);
    let fallback = records.iter().filter(|(name, _)| name.starts_with("pop")).map(|(name, _)| name.as_str()).collect::<BTreeSet<_>>();
    // simplification drops the empty population, so the haploids end up in population 1
    assert_eq!(fallback, BTreeSet::from(["pop1_ind3", "pop1_ind4"]));
    assert!(records.iter().all(|(_, sequence)| sequence.len() == 12));
    Ok(())
}

#[test]
fn run_reproducible() -> Result<(), Report> {
    let tables = examples::two_populations();
    let args = RunArgs { seed: Some(99), ..Default::default() };
    let first = run_to_fasta(&tables, args.clone())?;
    let second = run_to_fasta(&tables, args)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn run_sample_size_zero() -> Result<(), Report> {
    let args = RunArgs { seed: Some(0), sample_size: 0, ..Default::default() };
    let records = run_to_fasta(&examples::two_populations(), args)?;
    assert!(records.is_empty());
    Ok(())
}

#[test]
fn selection_summary_sample_size_zero() -> Result<(), Report> {
    let args = RunArgs { sample_size: 0, ..Default::default() };
    let mut rng = StdRng::seed_from_u64(1);
    let (selection, records) = pipeline(&examples::two_populations(), &args, &mut rng)?;
    assert!(selection.is_empty());
    assert!(records.is_empty());

    let mut output = Vec::new();
    write_selection(&selection, &mut output)?;
    let output = String::from_utf8(output)?;
    let lines = output.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        [
            "Population 0 (pop0): 5 individuals",
            "Sampled individuals from population 0: []",
            "Population 1 (pop1): 5 individuals",
            "Sampled individuals from population 1: []",
        ]
    );
    Ok(())
}

#[test]
fn selection_summary_no_populations() -> Result<(), Report> {
    let mut output = Vec::new();
    write_selection(&Default::default(), &mut output)?;
    assert!(output.is_empty());
    Ok(())
}

#[test]
fn run_missing_input() {
    let args = RunArgs { input: "does/not/exist.trees".into(), seed: Some(0), ..Default::default() };
    assert!(run(&args).is_err());
}

#[test]
fn run_writes_summary_and_args() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("genealogy.json");
    examples::two_populations().write(&input)?;

    let summary = dir.path().join("summary.tsv");
    let args_out = dir.path().join("args.json");
    let args = RunArgs {
        input,
        output: Some(dir.path().join("sequences.fasta")),
        summary: Some(summary.clone()),
        args_out: Some(args_out.clone()),
        ..Default::default()
    };
    run(&args)?;

    let table = std::fs::read_to_string(&summary)?;
    let lines = table.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "population\tname\tindividuals\tsampled");
    assert_eq!(lines.len(), 3);

    // the seed drawn for an unseeded run is recorded
    let recorded = RunArgs::read(&args_out)?;
    assert!(recorded.seed.is_some());
    assert_eq!(recorded.sample_size, 3);
    Ok(())
}

#[test]
fn pipeline_positions_agree() -> Result<(), Report> {
    let genealogy = examples::two_populations();
    let args = RunArgs { sample_size: 5, ..Default::default() };
    let mut rng = StdRng::seed_from_u64(12);
    let (selection, records) = pipeline(&genealogy, &args, &mut rng)?;
    assert_eq!(selection.len(), 10);

    for position in 0..20 {
        let bases = records.iter().map(|r| r.sequence[position]).collect::<BTreeSet<_>>();
        match position {
            // polymorphic among all ten individuals
            2 | 9 | 14 | 17 => assert!(bases.len() <= 2),
            _ => assert_eq!(bases.len(), 1, "position {position}"),
        }
    }
    Ok(())
}
