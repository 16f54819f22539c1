//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::RunArgs;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function. This is achieved with the `parse` function, which parses the command line arguments from [`std::env::args`](https://doc.rust-lang.org/std/env/fn.args.html).
/// ```no_run
/// use clap::Parser;
/// let args = tsfasta::Cli::parse();
/// ```
/// The command-line arguments from `std::env::args` are simply a vector of space separated strings. Here is a manual example of setting the command-line input:
/// ```rust
/// use clap::Parser;
/// let input = ["tsfasta", "--input", "sim.trees", "--sample-size", "2", "--population-names", "NAT,BS"];
/// let args = tsfasta::Cli::parse_from(input);
/// assert_eq!(args.run.sample_size, 2);
/// assert_eq!(args.run.population_names, ["NAT", "BS"]);
/// assert_eq!(args.run.seed, None);
/// ```
/// Without any arguments, the defaults reproduce the classic setup: three individuals per population from `output.trees`.
/// ```rust
/// use clap::Parser;
/// let args = tsfasta::Cli::parse_from(["tsfasta"]);
/// assert_eq!(args.run.input, std::path::PathBuf::from("output.trees"));
/// assert_eq!(args.run.sample_size, 3);
/// assert_eq!(args.run.population_names, ["NAT", "BS", "IB", "MA", "NBB"]);
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "tsfasta", author, version)]
#[clap(about = "tsfasta samples individuals from a tree sequence and renders synthetic FASTA sequences.")]
pub struct Cli {
    #[clap(flatten)]
    pub run: RunArgs,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ValueEnum)]
pub enum Verbosity {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Convert to lowercase for RUST_LOG env var compatibility
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}
