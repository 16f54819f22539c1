//! Small example genealogies, used in documentation and tests.

use crate::Tables;

/// Returns a genealogy with two populations of five diploid individuals each,
/// plus a third population (`ghost`) with no individuals.
///
/// - Individual `i` owns nodes `2i` and `2i + 1`.
/// - Individuals `0..5` belong to population 0, individuals `5..10` to population 1.
/// - The genome is 20 bp long, with five sites:
///
/// | position | alleles   | derived carriers              |
/// |----------|-----------|-------------------------------|
/// | 2.0      | A, T      | 0, 3, 4, 11, 12, 17           |
/// | 5.5      | C, G      | every node (fixed)            |
/// | 9.0      | G, A, C   | 1 (A), 6 (C), 13 (A), 18 (C)  |
/// | 14.0     | T, C      | nodes of population 1         |
/// | 17.9     | A, G      | 7                             |
///
/// ```rust
/// use tsfasta_genealogy::{examples, Genealogy};
/// let tables = examples::two_populations();
/// assert_eq!(tables.sequence_length(), 20.0);
/// assert_eq!(tables.variants()?.len(), 5);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn two_populations() -> Tables {
    let mut tables = Tables::new(20.0);

    let pop_0 = tables.add_population(None);
    let pop_1 = tables.add_population(None);
    tables.add_population(Some("ghost"));

    for population in [pop_0, pop_1] {
        for _ in 0..5 {
            tables.add_individual(Some(population), 2);
        }
    }

    tables.add_site(2.0, &["A", "T"], &[(0, 1), (3, 1), (4, 1), (11, 1), (12, 1), (17, 1)]);
    let fixed = (0..20).map(|node| (node, 1)).collect::<Vec<_>>();
    tables.add_site(5.5, &["C", "G"], &fixed);
    tables.add_site(9.0, &["G", "A", "C"], &[(1, 1), (6, 2), (13, 1), (18, 2)]);
    let pop_1_nodes = (10..20).map(|node| (node, 1)).collect::<Vec<_>>();
    tables.add_site(14.0, &["T", "C"], &pop_1_nodes);
    tables.add_site(17.9, &["A", "G"], &[(7, 1)]);

    tables
}

/// Returns a genealogy where population 1 sits between two populations with individuals,
/// has no individuals itself, and population 2 has only two (haploid) individuals.
///
/// ```rust
/// use tsfasta_genealogy::{examples, Genealogy};
/// let tables = examples::uneven_populations();
/// assert_eq!(tables.individuals()?.len(), 6);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn uneven_populations() -> Tables {
    let mut tables = Tables::new(12.5);

    let pop_0 = tables.add_population(Some("north"));
    tables.add_population(Some("empty"));
    let pop_2 = tables.add_population(None);

    for _ in 0..4 {
        tables.add_individual(Some(pop_0), 2);
    }
    for _ in 0..2 {
        tables.add_individual(Some(pop_2), 1);
    }

    tables.add_site(3.0, &["A", "C"], &[(0, 1), (8, 1)]);
    tables.add_site(3.7, &["A", "G"], &[(2, 1), (9, 1)]);
    tables.add_site(11.0, &["T", "A"], &[(5, 1)]);

    tables
}
