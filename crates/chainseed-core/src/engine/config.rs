use std::collections::HashSet;
use thiserror::Error;

use super::chain::ChainParams;
use crate::core::models::cell::{InvalidParameter, PeriodicBox, require_non_negative};

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameter),
    #[error("At least one species is required")]
    NoSpecies,
    #[error("Species name '{0}' must be non-empty and contain no whitespace")]
    InvalidSpeciesName(String),
    #[error("Species '{0}' is defined more than once")]
    DuplicateSpecies(String),
    #[error("Chain species '{0}' must have at least one monomer per chain")]
    EmptyChain(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeciesKind {
    /// `count` isolated points.
    Points { count: usize },
    /// `count` chains of `length` monomers each.
    Chains {
        count: usize,
        length: usize,
        bond_length: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesConfig {
    pub name: String,
    pub kind: SpeciesKind,
}

impl SpeciesConfig {
    pub fn points(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            kind: SpeciesKind::Points { count },
        }
    }

    pub fn chains(name: impl Into<String>, count: usize, length: usize, bond_length: f64) -> Self {
        Self {
            name: name.into(),
            kind: SpeciesKind::Chains {
                count,
                length,
                bond_length,
            },
        }
    }

    /// Number of positions this species contributes.
    pub fn num_sites(&self) -> usize {
        match self.kind {
            SpeciesKind::Points { count } => count,
            SpeciesKind::Chains { count, length, .. } => count * length,
        }
    }
}

/// Parameters of a complete seeding run. Species are placed in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemConfig {
    pub cell: PeriodicBox,
    pub rmin: f64,
    pub max_attempts: usize,
    pub species: Vec<SpeciesConfig>,
}

impl SystemConfig {
    pub fn num_sites(&self) -> usize {
        self.species.iter().map(SpeciesConfig::num_sites).sum()
    }

    /// Fraction of the box volume covered by exclusion spheres of diameter `rmin`.
    pub fn packing_fraction(&self) -> f64 {
        let sphere = std::f64::consts::PI / 6.0 * self.rmin.powi(3);
        self.num_sites() as f64 * sphere / self.cell.volume()
    }
}

#[derive(Default)]
pub struct SystemConfigBuilder {
    box_length: Option<f64>,
    rmin: Option<f64>,
    max_attempts: Option<usize>,
    species: Vec<SpeciesConfig>,
}

impl SystemConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn box_length(mut self, length: f64) -> Self {
        self.box_length = Some(length);
        self
    }
    pub fn rmin(mut self, rmin: f64) -> Self {
        self.rmin = Some(rmin);
        self
    }
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
    pub fn species(mut self, species: SpeciesConfig) -> Self {
        self.species.push(species);
        self
    }

    pub fn build(self) -> Result<SystemConfig, ConfigError> {
        let cell = PeriodicBox::new(
            self.box_length
                .ok_or(ConfigError::MissingParameter("box_length"))?,
        )?;
        let rmin = require_non_negative(
            "rmin",
            self.rmin.ok_or(ConfigError::MissingParameter("rmin"))?,
        )?;
        let max_attempts = self
            .max_attempts
            .ok_or(ConfigError::MissingParameter("max_attempts"))?;
        if max_attempts == 0 {
            return Err(InvalidParameter::new(
                "max_attempts",
                0.0,
                "at least one attempt is required",
            )
            .into());
        }

        if self.species.is_empty() {
            return Err(ConfigError::NoSpecies);
        }
        let mut seen = HashSet::new();
        for species in &self.species {
            if species.name.is_empty() || species.name.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidSpeciesName(species.name.clone()));
            }
            if !seen.insert(species.name.as_str()) {
                return Err(ConfigError::DuplicateSpecies(species.name.clone()));
            }
            if let SpeciesKind::Chains {
                length,
                bond_length,
                ..
            } = species.kind
            {
                if length == 0 {
                    return Err(ConfigError::EmptyChain(species.name.clone()));
                }
                ChainParams::new(length, rmin, bond_length).validate(&cell)?;
            }
        }

        Ok(SystemConfig {
            cell,
            rmin,
            max_attempts,
            species: self.species,
        })
    }
}
