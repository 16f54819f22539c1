//! `tsfasta` samples individuals from a population-structured genealogy and renders
//! **synthetic FASTA** sequences that respect the sampled genotypes.
//!
//! ## How does it work?
//!
//! 1. **Sample** up to `n` individuals, without replacement, from every population
//!    of a tree sequence (see [`sample`]).
//! 1. **Subset** the genealogy to the haplotype nodes of the sampled individuals
//!    (see [`subset`]).
//! 1. **Render** one sequence per individual (see [`sequence`]). Every integer position
//!    of the genome gets random bases: one shared base where the samples don't vary, and
//!    distinct reference and alternate bases where they do. Each individual is represented
//!    by one of its haplotypes, chosen at random.
//!
//! All randomness comes from a single seedable generator, so a run with `--seed` is
//! reproducible.
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use tsfasta::{pipeline, RunArgs};
//! use tsfasta_genealogy::examples;
//!
//! let args = RunArgs { sample_size: 2, ..Default::default() };
//! let mut rng = StdRng::seed_from_u64(0);
//! let (_selection, records) = pipeline(&examples::two_populations(), &args, &mut rng)?;
//! assert_eq!(records.len(), 4);
//! assert!(records[0].id.starts_with("NAT_ind"));
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod dataset;
pub mod run;
pub mod sample;
pub mod sequence;
pub mod subset;
pub mod utils;

#[doc(inline)]
#[cfg(feature = "cli")]
pub use crate::cli::{Cli, Verbosity};
#[doc(inline)]
pub use crate::dataset::Dataset;
#[doc(inline)]
pub use crate::run::{pipeline, run, RunArgs};
