use crate::core::io::traits::ConfigurationFile;
use crate::core::models::cell::{PeriodicBox, Position};
use crate::core::models::configuration::{Configuration, Molecule, MoleculeKind};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufRead, Write};
use thiserror::Error;

const PROPERTIES: &str = "species:S:1:pos:R:3:molecule:I:1";

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum XyzParseErrorKind {
    #[error("Missing {0} line")]
    MissingLine(&'static str),
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Unterminated quoted value in comment line")]
    UnterminatedQuote,
    #[error("Missing required key '{0}' in comment line")]
    MissingKey(&'static str),
    #[error("Unsupported properties '{0}' (expected 'species:S:1:pos:R:3:molecule:I:1')")]
    UnsupportedProperties(String),
    #[error("Lattice must be cubic and diagonal, got '{0}'")]
    NonCubicLattice(String),
    #[error("Invalid bond entry '{0}' (expected 'molecule:bond_length')")]
    InvalidBond(String),
    #[error("Expected 5 columns (species x y z molecule), found {0}")]
    WrongColumnCount(usize),
    #[error("Invalid float in column '{column}' (value: '{value}')")]
    InvalidFloat { column: &'static str, value: String },
    #[error("Invalid molecule index '{0}'")]
    InvalidMoleculeIndex(String),
}

fn parse_error(line: usize, kind: XyzParseErrorKind) -> XyzError {
    XyzError::Parse { line, kind }
}

/// Extended XYZ files carrying the periodic lattice, a per-site molecule index
/// and the bond lengths of chain molecules.
///
/// ```text
/// 3
/// Lattice="10 0 0 0 10 0 0 0 10" Properties=species:S:1:pos:R:3:molecule:I:1 pbc="T T T" bonds="1:1"
/// ion 0.5 -2 3.25 0
/// poly 1 1 1 1
/// poly 2 1 1 1
/// ```
pub struct XyzFile;

impl ConfigurationFile for XyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Configuration, Self::Error> {
        let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));

        let (count_line, count_text) = lines
            .next()
            .ok_or_else(|| parse_error(1, XyzParseErrorKind::MissingLine("atom count")))?;
        let count_text = count_text?;
        let count: usize = count_text.trim().parse().map_err(|_| {
            parse_error(
                count_line,
                XyzParseErrorKind::InvalidAtomCount(count_text.trim().to_string()),
            )
        })?;

        let (comment_line, comment) = lines
            .next()
            .ok_or_else(|| parse_error(2, XyzParseErrorKind::MissingLine("comment")))?;
        let header = parse_header(&comment?).map_err(|kind| parse_error(comment_line, kind))?;

        let mut configuration = Configuration::new(header.cell);
        let mut read = 0;
        for (line_num, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if read == count {
                return Err(XyzError::Inconsistency(format!(
                    "Found more site records than the declared count of {count} (line {line_num})"
                )));
            }
            let (species, position, molecule) =
                parse_site(&line).map_err(|kind| parse_error(line_num, kind))?;
            push_site(&mut configuration, species, position, molecule, line_num)?;
            read += 1;
        }

        if read != count {
            return Err(XyzError::Inconsistency(format!(
                "Declared {count} sites but found {read}"
            )));
        }

        for (index, bond_length) in header.bonds {
            let molecule = configuration.molecules.get_mut(index).ok_or_else(|| {
                XyzError::Inconsistency(format!(
                    "Bond length given for molecule {index}, which has no sites"
                ))
            })?;
            molecule.kind = MoleculeKind::Chain { bond_length };
        }
        if let Some(m) = configuration
            .molecules
            .iter()
            .position(|m| m.kind == MoleculeKind::Point && m.len() > 1)
        {
            return Err(XyzError::Inconsistency(format!(
                "Molecule {m} has several sites but no bond length"
            )));
        }

        Ok(configuration)
    }

    fn write_to(configuration: &Configuration, writer: &mut impl Write) -> Result<(), Self::Error> {
        if let Some(m) = configuration.molecules.iter().position(Molecule::is_empty) {
            return Err(XyzError::Inconsistency(format!(
                "Molecule {m} has no sites and cannot be indexed"
            )));
        }
        let l = configuration.cell.length();
        let bonds = configuration
            .molecules
            .iter()
            .enumerate()
            .filter_map(|(i, m)| match m.kind {
                MoleculeKind::Chain { bond_length } => Some(format!("{i}:{bond_length}")),
                MoleculeKind::Point => None,
            })
            .collect::<Vec<_>>()
            .join(",");

        writeln!(writer, "{}", configuration.num_sites())?;
        writeln!(
            writer,
            "Lattice=\"{l} 0 0 0 {l} 0 0 0 {l}\" Properties={PROPERTIES} pbc=\"T T T\" bonds=\"{bonds}\""
        )?;
        for (index, molecule) in configuration.molecules.iter().enumerate() {
            for p in &molecule.positions {
                writeln!(
                    writer,
                    "{} {} {} {} {}",
                    molecule.species, p.x, p.y, p.z, index
                )?;
            }
        }
        Ok(())
    }
}

struct Header {
    cell: PeriodicBox,
    bonds: BTreeMap<usize, f64>,
}

fn parse_header(comment: &str) -> Result<Header, XyzParseErrorKind> {
    let fields = parse_key_values(comment)?;

    let properties = fields
        .get("Properties")
        .ok_or(XyzParseErrorKind::MissingKey("Properties"))?;
    if properties != PROPERTIES {
        return Err(XyzParseErrorKind::UnsupportedProperties(properties.clone()));
    }

    let lattice = fields
        .get("Lattice")
        .ok_or(XyzParseErrorKind::MissingKey("Lattice"))?;
    let cell = parse_cubic_lattice(lattice)
        .ok_or_else(|| XyzParseErrorKind::NonCubicLattice(lattice.clone()))?;

    let mut bonds = BTreeMap::new();
    if let Some(list) = fields.get("bonds") {
        for entry in list.split(',').filter(|e| !e.trim().is_empty()) {
            let (index, length) = entry
                .split_once(':')
                .and_then(|(i, b)| {
                    Some((i.trim().parse::<usize>().ok()?, b.trim().parse::<f64>().ok()?))
                })
                .filter(|&(_, b)| b.is_finite() && b > 0.0)
                .ok_or_else(|| XyzParseErrorKind::InvalidBond(entry.to_string()))?;
            bonds.insert(index, length);
        }
    }

    Ok(Header { cell, bonds })
}

fn parse_cubic_lattice(lattice: &str) -> Option<PeriodicBox> {
    let values: Vec<f64> = lattice
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    if values.len() != 9 {
        return None;
    }
    let l = values[0];
    let diagonal_ok = values[4] == l && values[8] == l;
    let off_diagonal_ok = [1, 2, 3, 5, 6, 7].iter().all(|&i| values[i] == 0.0);
    if !(diagonal_ok && off_diagonal_ok) {
        return None;
    }
    PeriodicBox::new(l).ok()
}

/// Splits `key=value key="quoted value"` pairs.
fn parse_key_values(line: &str) -> Result<HashMap<String, String>, XyzParseErrorKind> {
    let mut fields = HashMap::new();
    let mut rest = line.trim_start();
    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        rest = &rest[key_end..];

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            if let Some(quoted) = after_eq.strip_prefix('"') {
                let close = quoted.find('"').ok_or(XyzParseErrorKind::UnterminatedQuote)?;
                rest = &quoted[close + 1..];
                &quoted[..close]
            } else {
                let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                rest = &after_eq[end..];
                &after_eq[..end]
            }
        } else {
            ""
        };

        fields.insert(key.to_string(), value.to_string());
        rest = rest.trim_start();
    }
    Ok(fields)
}

fn parse_site(line: &str) -> Result<(&str, Position, usize), XyzParseErrorKind> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() != 5 {
        return Err(XyzParseErrorKind::WrongColumnCount(columns.len()));
    }
    let coordinate = |column: &'static str, value: &str| -> Result<f64, XyzParseErrorKind> {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| XyzParseErrorKind::InvalidFloat {
                column,
                value: value.to_string(),
            })
    };
    let position = Position::new(
        coordinate("x", columns[1])?,
        coordinate("y", columns[2])?,
        coordinate("z", columns[3])?,
    );
    let molecule = columns[4]
        .parse()
        .map_err(|_| XyzParseErrorKind::InvalidMoleculeIndex(columns[4].to_string()))?;
    Ok((columns[0], position, molecule))
}

fn push_site(
    configuration: &mut Configuration,
    species: &str,
    position: Position,
    molecule: usize,
    line_num: usize,
) -> Result<(), XyzError> {
    let next_index = configuration.molecules.len();
    if molecule == next_index {
        configuration
            .molecules
            .push(Molecule::point(species, position));
        return Ok(());
    }
    match configuration.molecules.last_mut() {
        Some(current) if molecule + 1 == next_index => {
            if current.species != species {
                return Err(XyzError::Inconsistency(format!(
                    "Line {line_num}: molecule {molecule} mixes species '{}' and '{species}'",
                    current.species
                )));
            }
            current.positions.push(position);
            Ok(())
        }
        _ => Err(XyzError::Inconsistency(format!(
            "Line {line_num}: molecule index {molecule} is out of order (expected {} or {next_index})",
            next_index.saturating_sub(1)
        ))),
    }
}
