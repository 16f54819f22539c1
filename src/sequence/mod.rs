//! Render synthetic nucleotide sequences for the individuals of a genealogy.


use crate::sample::{group_by_population, PopulationMap};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::io::Write;
use strum::{EnumIter, IntoEnumIterator};
use tsfasta_genealogy::{Genealogy, IndividualId, NodeId, PopulationId, Variant};

// ----------------------------------------------------------------------------
// Nucleotide
// ----------------------------------------------------------------------------

/// A DNA base.
#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, Hash, PartialEq, Serialize)]
pub enum Nucleotide {
    A,
    T,
    G,
    C,
}

impl Nucleotide {
    /// Draw a base uniformly at random.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let bases = Nucleotide::iter().collect_vec();
        bases[rng.gen_range(0..bases.len())]
    }

    /// Draw a base uniformly at random, from every base except `other`.
    pub fn random_except<R>(rng: &mut R, other: Nucleotide) -> Self
    where
        R: Rng + ?Sized,
    {
        let bases = Nucleotide::iter().filter(|b| *b != other).collect_vec();
        bases[rng.gen_range(0..bases.len())]
    }
}

impl From<Nucleotide> for char {
    fn from(base: Nucleotide) -> char {
        match base {
            Nucleotide::A => 'A',
            Nucleotide::T => 'T',
            Nucleotide::G => 'G',
            Nucleotide::C => 'C',
        }
    }
}

impl Display for Nucleotide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

// ----------------------------------------------------------------------------
// SiteBases
// ----------------------------------------------------------------------------

/// The bases assigned to the alleles of a single position.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SiteBases {
    /// Base of allele 0, and of every allele without a base of its own.
    pub reference: Nucleotide,
    /// Base of allele 1, only at polymorphic positions.
    pub alternate: Option<Nucleotide>,
}

impl SiteBases {
    /// A single random base, shared by all haplotypes.
    pub fn invariant<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        SiteBases { reference: Nucleotide::random(rng), alternate: None }
    }

    /// Two distinct random bases, for allele 0 and allele 1.
    pub fn biallelic<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let reference = Nucleotide::random(rng);
        let alternate = Nucleotide::random_except(rng, reference);
        SiteBases { reference, alternate: Some(alternate) }
    }

    /// Returns the base of an allele index.
    ///
    /// ```rust
    /// use tsfasta::sequence::{Nucleotide, SiteBases};
    /// let site = SiteBases { reference: Nucleotide::A, alternate: Some(Nucleotide::G) };
    /// assert_eq!(site.base(0), Nucleotide::A);
    /// assert_eq!(site.base(1), Nucleotide::G);
    /// // alleles beyond the alternate fall back to the reference
    /// assert_eq!(site.base(2), Nucleotide::A);
    /// ```
    pub fn base(&self, allele: usize) -> Nucleotide {
        match (allele, self.alternate) {
            (1, Some(alternate)) => alternate,
            _ => self.reference,
        }
    }
}

// ----------------------------------------------------------------------------
// Record
// ----------------------------------------------------------------------------

/// A rendered sequence for one individual.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Record {
    /// FASTA identifier, `<population_name>_ind<individual_id>`.
    pub id: String,
    pub population: PopulationId,
    pub individual: IndividualId,
    /// The haplotype node the sequence was rendered from.
    pub node: NodeId,
    pub sequence: Vec<char>,
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, ">{}\n{}", self.id, self.sequence.iter().collect::<String>())
    }
}

/// Write records as FASTA, one header line and one sequence line each.
pub fn write_fasta<W>(records: &[Record], writer: &mut W) -> Result<(), Report>
where
    W: Write,
{
    for record in records {
        writeln!(writer, "{record}")
            .wrap_err_with(|| format!("Failed to write sequence record: {}", record.id))?;
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Assign display names to the populations that have individuals.
///
/// Names are given positionally, in population id order. Populations without a
/// positional name are named `pop<id>`.
///
/// ```rust
/// use tsfasta::{sample::group_by_population, sequence::population_names};
/// use tsfasta_genealogy::examples;
///
/// let groups = group_by_population(&examples::uneven_populations())?;
/// let names = population_names(&groups, Some(&["NAT".to_string()][..]));
/// assert_eq!(names.into_iter().collect::<Vec<_>>(), [(0, "NAT".to_string()), (2, "pop2".to_string())]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn population_names(
    groups: &PopulationMap,
    names: Option<&[String]>,
) -> BTreeMap<PopulationId, String> {
    groups
        .iter()
        .filter(|(_, individuals)| !individuals.is_empty())
        .enumerate()
        .map(|(i, (id, _))| {
            let name = names.and_then(|names| names.get(i)).cloned();
            (*id, name.unwrap_or_else(|| format!("pop{id}")))
        })
        .collect()
}

/// Map each integer position to the variant found there.
///
/// Site positions are truncated, a later site replaces an earlier one at the same position.
pub fn variants_by_position<G>(genealogy: &G) -> Result<BTreeMap<usize, Variant>, Report>
where
    G: Genealogy,
{
    let variants = genealogy.variants()?.into_iter().map(|v| (v.position as usize, v)).collect();
    Ok(variants)
}

/// Draw the bases of every position along a genome of `length`.
///
/// Positions without a variant, or where all samples carry the same allele, get a single
/// base. Polymorphic positions get distinct reference and alternate bases.
pub fn site_bases<R>(length: usize, variants: &BTreeMap<usize, Variant>, rng: &mut R) -> Vec<SiteBases>
where
    R: Rng + ?Sized,
{
    (0..length)
        .map(|position| match variants.get(&position) {
            None => SiteBases::invariant(rng),
            Some(variant) => {
                let alleles = variant.distinct_alleles();
                if alleles.len() <= 1 {
                    return SiteBases::invariant(rng);
                }
                if alleles.iter().any(|allele| *allele > 1) {
                    warn!(
                        "Position {position} has {} alleles, alleles other than the first two will be rendered as the reference base.",
                        alleles.len()
                    );
                }
                SiteBases::biallelic(rng)
            }
        })
        .collect()
}

/// Render one sequence per individual of the genealogy.
///
/// Each individual is represented by one of its haplotype nodes, chosen uniformly at random.
/// Records are returned in population id order, then individual id order.
///
/// ## Arguments
///
/// - `genealogy` - Genealogy to render, usually already reduced to the sampled individuals.
/// - `names` - Optional population display names, see [`population_names`].
/// - `rng` - Random number generator for bases and haplotype choice.
///
/// ## Examples
///
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use tsfasta::sequence;
/// use tsfasta_genealogy::examples;
///
/// let mut rng = StdRng::seed_from_u64(11);
/// let records = sequence::render(&examples::uneven_populations(), None, &mut rng)?;
/// let ids = records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();
/// assert_eq!(ids, ["pop0_ind0", "pop0_ind1", "pop0_ind2", "pop0_ind3", "pop2_ind4", "pop2_ind5"]);
/// assert!(records.iter().all(|r| r.sequence.len() == 12));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn render<G, R>(
    genealogy: &G,
    names: Option<&[String]>,
    rng: &mut R,
) -> Result<Vec<Record>, Report>
where
    G: Genealogy,
    R: Rng + ?Sized,
{
    let length = genealogy.sequence_length() as usize;
    let groups = group_by_population(genealogy)?;
    let population_names = population_names(&groups, names);

    let variants = variants_by_position(genealogy)?;
    let bases = site_bases(length, &variants, rng);
    debug!("Drew bases for {length} positions, {} with variants.", variants.len());

    // genotypes are indexed by sample, not by node
    let sample_index: HashMap<NodeId, usize> =
        genealogy.samples()?.into_iter().enumerate().map(|(i, node)| (node, i)).collect();

    let mut records = Vec::new();
    for (population, individuals) in &groups {
        let Some(name) = population_names.get(population) else {
            continue;
        };
        for individual in individuals {
            let node = *individual
                .nodes
                .choose(rng)
                .ok_or_else(|| eyre!("Individual {} has no haplotype nodes.", individual.id))?;
            let index = sample_index.get(&node).copied();
            if index.is_none() {
                warn!("Node {node} of individual {} is not a sample, rendering reference bases.", individual.id);
            }

            let sequence = bases
                .iter()
                .enumerate()
                .map(|(position, site)| {
                    let allele = variants
                        .get(&position)
                        .zip(index)
                        .and_then(|(variant, i)| variant.genotype(i))
                        .unwrap_or(0);
                    char::from(site.base(allele))
                })
                .collect();

            records.push(Record {
                id: format!("{name}_ind{}", individual.id),
                population: *population,
                individual: individual.id,
                node,
                sequence,
            });
        }
    }

    debug!("Rendered {} sequences of length {length}.", records.len());
    Ok(records)
}
