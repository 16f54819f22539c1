//! Run the sample, subset, and render pipeline on a genealogy file.

#[cfg(test)]
mod tests;

use crate::sample::Selection;
use crate::sequence::Record;
use crate::{dataset, sample, sequence, subset, utils};
#[cfg(feature = "cli")]
use clap::Args as ClapArgs;
use color_eyre::eyre::{Report, Result, WrapErr};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tsfasta_genealogy::Genealogy;

/// Population display names used when none are given.
pub const POPULATION_NAMES: &[&str] = &["NAT", "BS", "IB", "MA", "NBB"];

/// Sample individuals from a genealogy and render their FASTA sequences.
///
/// The sampling summary is printed to standard output, followed by the FASTA records
/// unless [`RunArgs::output`] is set.
pub fn run(args: &RunArgs) -> Result<(), Report> {
    // an unseeded run still records the seed it drew, so it can be reproduced
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Using random seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    if let Some(path) = &args.args_out {
        let resolved = RunArgs { seed: Some(seed), ..args.clone() };
        resolved.write(path)?;
    }

    info!("Loading genealogy: {:?}", args.input);
    let genealogy = dataset::load(&args.input)?;

    let (selection, records) = pipeline(&genealogy, args, &mut rng)?;

    write_selection(&selection, &mut std::io::stdout().lock())?;
    debug!("Sampling summary:\n{}", selection.to_table().to_markdown());
    if let Some(path) = &args.summary {
        info!("Writing sampling summary: {path:?}");
        selection.to_table().write(path)?;
    }

    match &args.output {
        Some(path) => {
            info!("Writing {} sequences: {path:?}", records.len());
            utils::create_parent_dir(path)?;
            let file = File::create(path)
                .wrap_err_with(|| format!("Failed to create output file: {path:?}"))?;
            let mut writer = BufWriter::new(file);
            sequence::write_fasta(&records, &mut writer)?;
            writer.flush().wrap_err_with(|| format!("Failed to write output file: {path:?}"))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            sequence::write_fasta(&records, &mut writer)?;
        }
    }

    Ok(())
}

/// Write the sampling summary lines of every population that has individuals.
///
/// Populations sampled down to zero individuals are still reported.
pub fn write_selection<W>(selection: &Selection, writer: &mut W) -> Result<(), Report>
where
    W: Write,
{
    if selection.populations.is_empty() {
        return Ok(());
    }
    writeln!(writer, "{}", selection.pretty_print()).wrap_err("Failed to write sampling summary.")?;
    Ok(())
}

/// Sample, subset, and render an in-memory genealogy.
///
/// ## Examples
///
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use tsfasta::{pipeline, RunArgs};
/// use tsfasta_genealogy::examples;
///
/// let genealogy = examples::two_populations();
/// let args = RunArgs { population_names: Vec::new(), ..Default::default() };
/// let mut rng = StdRng::seed_from_u64(7);
/// let (selection, records) = pipeline(&genealogy, &args, &mut rng)?;
/// assert_eq!(selection.len(), 6);
/// assert_eq!(records.len(), 6);
/// assert!(records.iter().all(|r| r.id.starts_with("pop0_ind") || r.id.starts_with("pop1_ind")));
/// assert!(records.iter().all(|r| r.sequence.len() == 20));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn pipeline<G, R>(
    genealogy: &G,
    args: &RunArgs,
    rng: &mut R,
) -> Result<(Selection, Vec<Record>), Report>
where
    G: Genealogy,
    R: Rng + ?Sized,
{
    let selection = sample::sample(genealogy, args.sample_size, rng)?;
    let reduced = subset::subset(genealogy, &selection)?;
    let names = (!args.population_names.is_empty()).then_some(args.population_names.as_slice());
    let records = sequence::render(&reduced, names, rng)?;
    Ok((selection, records))
}

// ---------------------------------------------------------------------------
// RunArgs
// ---------------------------------------------------------------------------

/// Sample individuals from a genealogy and render synthetic FASTA sequences.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(ClapArgs))]
pub struct RunArgs {
    /// Input genealogy, a tskit tree sequence (.trees) or genealogy tables (.json).
    #[cfg_attr(feature = "cli", arg(short = 'i', long, default_value_os_t = RunArgs::default().input))]
    pub input: PathBuf,

    /// Maximum number of individuals to sample per population.
    #[cfg_attr(feature = "cli", arg(short = 'n', long, default_value_t = RunArgs::default().sample_size))]
    pub sample_size: usize,

    /// Population display names, assigned in order to populations with individuals.
    ///
    /// Populations beyond the end of this list are named pop<id>.
    #[cfg_attr(feature = "cli", arg(short = 'p', long, value_delimiter = ',', default_values_t = RunArgs::default().population_names))]
    pub population_names: Vec<String>,

    /// Random seed, for reproducible sampling and bases.
    #[cfg_attr(feature = "cli", arg(short = 's', long))]
    #[serde(default)]
    pub seed: Option<u64>,

    /// Output FASTA file. Sequences are written to stdout if not provided.
    #[cfg_attr(feature = "cli", arg(short = 'o', long))]
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Output table (.tsv, .csv) summarizing the sampled individuals of each population.
    #[cfg_attr(feature = "cli", arg(long))]
    #[serde(default)]
    pub summary: Option<PathBuf>,

    /// Output JSON file of the run arguments, including the random seed that was used.
    #[cfg_attr(feature = "cli", arg(long))]
    #[serde(skip)]
    pub args_out: Option<PathBuf>,
}

impl Default for RunArgs {
    fn default() -> Self {
        RunArgs {
            input: PathBuf::from("output.trees"),
            sample_size: 3,
            population_names: POPULATION_NAMES.iter().map(|n| n.to_string()).collect(),
            seed: None,
            output: None,
            summary: None,
            args_out: None,
        }
    }
}

impl RunArgs {
    /// Reads [`RunArgs`] from a JSON file.
    pub fn read<P>(path: &P) -> Result<RunArgs, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read run arguments: {path:?}."))?;
        let run_args = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize run arguments: {input}"))?;
        Ok(run_args)
    }

    /// Write [`RunArgs`] to a JSON file.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use tsfasta::RunArgs;
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("run_args.json");
    /// let args = RunArgs { seed: Some(42), ..Default::default() };
    /// args.write(&path)?;
    /// assert_eq!(RunArgs::read(&path)?, args);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        utils::create_parent_dir(path)?;
        let output = serde_json::to_string_pretty(self)
            .wrap_err(format!("Failed to serialize run arguments: {self:?}"))?;
        std::fs::write(path, output)
            .wrap_err(format!("Failed to write run arguments: {path:?}"))?;
        Ok(())
    }
}
