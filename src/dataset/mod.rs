//! Load a genealogy from disk.
//!
//! The backend is chosen from the file extension:
//!
//! - `.trees`: a [tskit](https://tskit.dev/) tree sequence (requires the `tskit` feature).
//! - `.json`: in-memory genealogy [`Tables`].

#[cfg(feature = "tskit")]
pub mod trees;

use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use log::debug;
use std::fmt::Debug;
use std::path::Path;
use tsfasta_genealogy::{
    Genealogy, Individual, NodeId, Population, PopulationId, Tables, Variant,
};

/// A genealogy loaded from disk, from any of the supported backends.
pub enum Dataset {
    Tables(Tables),
    #[cfg(feature = "tskit")]
    Tskit(trees::TskitGenealogy),
}

impl From<Tables> for Dataset {
    fn from(tables: Tables) -> Self {
        Dataset::Tables(tables)
    }
}

impl Genealogy for Dataset {
    fn sequence_length(&self) -> f64 {
        match self {
            Dataset::Tables(tables) => tables.sequence_length(),
            #[cfg(feature = "tskit")]
            Dataset::Tskit(ts) => ts.sequence_length(),
        }
    }

    fn populations(&self) -> Result<Vec<Population>, Report> {
        match self {
            Dataset::Tables(tables) => tables.populations(),
            #[cfg(feature = "tskit")]
            Dataset::Tskit(ts) => ts.populations(),
        }
    }

    fn individuals(&self) -> Result<Vec<Individual>, Report> {
        match self {
            Dataset::Tables(tables) => tables.individuals(),
            #[cfg(feature = "tskit")]
            Dataset::Tskit(ts) => ts.individuals(),
        }
    }

    fn node_population(&self, node: NodeId) -> Result<Option<PopulationId>, Report> {
        match self {
            Dataset::Tables(tables) => tables.node_population(node),
            #[cfg(feature = "tskit")]
            Dataset::Tskit(ts) => ts.node_population(node),
        }
    }

    fn samples(&self) -> Result<Vec<NodeId>, Report> {
        match self {
            Dataset::Tables(tables) => tables.samples(),
            #[cfg(feature = "tskit")]
            Dataset::Tskit(ts) => ts.samples(),
        }
    }

    fn variants(&self) -> Result<Vec<Variant>, Report> {
        match self {
            Dataset::Tables(tables) => tables.variants(),
            #[cfg(feature = "tskit")]
            Dataset::Tskit(ts) => ts.variants(),
        }
    }

    fn simplify(&self, samples: &[NodeId]) -> Result<Self, Report> {
        match self {
            Dataset::Tables(tables) => Ok(Dataset::Tables(tables.simplify(samples)?)),
            #[cfg(feature = "tskit")]
            Dataset::Tskit(ts) => Ok(Dataset::Tskit(ts.simplify(samples)?)),
        }
    }
}

/// Load a genealogy, choosing the backend from the file extension.
///
/// ## Examples
///
/// ```rust
/// use tsfasta::dataset;
/// use tsfasta_genealogy::{examples, Genealogy};
///
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("genealogy.json");
/// examples::two_populations().write(&path)?;
///
/// let genealogy = dataset::load(&path)?;
/// assert_eq!(genealogy.individuals()?.len(), 10);
///
/// assert!(dataset::load(&dir.path().join("missing.trees")).is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn load<P>(path: &P) -> Result<Dataset, Report>
where
    P: AsRef<Path> + Debug,
{
    if !path.as_ref().exists() {
        return Err(eyre!("Genealogy file not found: {path:?}")
            .suggestion("Please check the --input path.")
            .suggestion("By default, tsfasta reads output.trees in the current directory."));
    }

    let ext = path.as_ref().extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    debug!("Loading genealogy {path:?} with extension {ext:?}.");

    match ext {
        "json" => Ok(Dataset::Tables(Tables::read(path)?)),
        #[cfg(feature = "tskit")]
        "trees" => Ok(Dataset::Tskit(trees::TskitGenealogy::load(path)?)),
        #[cfg(not(feature = "tskit"))]
        "trees" => Err(eyre!("Cannot load tree sequence {path:?}, tskit support is disabled.")
            .suggestion("Rebuild with the default `tskit` feature enabled.")),
        _ext => Err(eyre!("Unknown genealogy file extension: {_ext:?}")
            .suggestion("Options: trees (tskit tree sequence) or json (genealogy tables).")),
    }
}
