use itertools::Itertools;
use std::fmt;

use super::cell::{PeriodicBox, Position};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoleculeKind {
    /// A single unbonded site.
    Point,
    /// An ordered chain whose consecutive sites are `bond_length` apart.
    Chain { bond_length: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub species: String,
    pub kind: MoleculeKind,
    pub positions: Vec<Position>,
}

impl Molecule {
    pub fn point(species: impl Into<String>, position: Position) -> Self {
        Self {
            species: species.into(),
            kind: MoleculeKind::Point,
            positions: vec![position],
        }
    }

    pub fn chain(species: impl Into<String>, bond_length: f64, positions: Vec<Position>) -> Self {
        Self {
            species: species.into(),
            kind: MoleculeKind::Chain { bond_length },
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Identifies one site as `(molecule index, index within the molecule)`.
pub type SiteRef = (usize, usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Two sites are closer than the minimum distance.
    Overlap {
        a: SiteRef,
        b: SiteRef,
        distance: f64,
    },
    /// Two consecutive chain sites are not one bond length apart.
    BondLength {
        molecule: usize,
        bond: usize,
        expected: f64,
        actual: f64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Overlap { a, b, distance } => write!(
                f,
                "sites {}:{} and {}:{} overlap (distance {:.6})",
                a.0, a.1, b.0, b.1, distance
            ),
            Violation::BondLength {
                molecule,
                bond,
                expected,
                actual,
            } => write!(
                f,
                "bond {} of molecule {} has length {:.6}, expected {:.6}",
                bond, molecule, actual, expected
            ),
        }
    }
}

/// A fully seeded system: a periodic cell and the molecules placed in it, in
/// placement order.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub cell: PeriodicBox,
    pub molecules: Vec<Molecule>,
}

impl Configuration {
    pub fn new(cell: PeriodicBox) -> Self {
        Self {
            cell,
            molecules: Vec::new(),
        }
    }

    pub fn num_sites(&self) -> usize {
        self.molecules.iter().map(Molecule::len).sum()
    }

    fn sites(&self) -> impl Iterator<Item = (SiteRef, &Position)> + Clone + '_ {
        self.molecules.iter().enumerate().flat_map(|(m, molecule)| {
            molecule
                .positions
                .iter()
                .enumerate()
                .map(move |(i, p)| ((m, i), p))
        })
    }

    /// Checks the configuration against `rmin` and the bond lengths of its chains.
    ///
    /// Pairs closer than `rmin - tolerance` are reported as overlaps; bonds whose
    /// minimum-image length deviates from the expected one by more than
    /// `tolerance * bond_length` are reported as bond violations. An empty result
    /// means the configuration is valid. The check is quadratic in the number of
    /// sites.
    pub fn validate(&self, rmin: f64, tolerance: f64) -> Vec<Violation> {
        let mut violations: Vec<Violation> = self
            .sites()
            .tuple_combinations()
            .filter_map(|((a, pa), (b, pb))| {
                let distance = self.cell.distance(pa, pb);
                (distance < rmin - tolerance).then_some(Violation::Overlap { a, b, distance })
            })
            .collect();

        for (m, molecule) in self.molecules.iter().enumerate() {
            let MoleculeKind::Chain { bond_length } = molecule.kind else {
                continue;
            };
            for (bond, (p, q)) in molecule.positions.iter().tuple_windows().enumerate() {
                let actual = self.cell.distance(p, q);
                if (actual - bond_length).abs() > tolerance * bond_length {
                    violations.push(Violation::BondLength {
                        molecule: m,
                        bond,
                        expected: bond_length,
                        actual,
                    });
                }
            }
        }

        violations
    }
}
