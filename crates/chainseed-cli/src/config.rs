mod defaults;
mod models;

pub use defaults::DefaultsConfig;
pub use models::AppConfig;

use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use chainseed::engine::config::{SpeciesConfig, SystemConfigBuilder};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialCellConfig {
    #[serde(rename = "box-length")]
    box_length: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialPlacementConfig {
    rmin: Option<f64>,
    #[serde(rename = "max-attempts")]
    max_attempts: Option<usize>,
    seed: Option<u64>,
    replicas: Option<usize>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PartialSpeciesType {
    Points,
    Chains,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialSpeciesConfig {
    name: String,
    #[serde(rename = "type")]
    kind: PartialSpeciesType,
    count: usize,
    length: Option<usize>,
    #[serde(rename = "bond-length")]
    bond_length: Option<f64>,
}

impl TryFrom<PartialSpeciesConfig> for SpeciesConfig {
    type Error = CliError;

    fn try_from(p: PartialSpeciesConfig) -> Result<Self> {
        match p.kind {
            PartialSpeciesType::Points => {
                if p.length.is_some() || p.bond_length.is_some() {
                    return Err(CliError::Config(format!(
                        "Species '{}' is of type 'points' and cannot set `length` or `bond-length`.",
                        p.name
                    )));
                }
                Ok(SpeciesConfig::points(p.name, p.count))
            }
            PartialSpeciesType::Chains => {
                let length = p.length.ok_or_else(|| {
                    CliError::Config(format!("Chain species '{}' requires `length`.", p.name))
                })?;
                let bond_length = p.bond_length.ok_or_else(|| {
                    CliError::Config(format!(
                        "Chain species '{}' requires `bond-length`.",
                        p.name
                    ))
                })?;
                Ok(SpeciesConfig::chains(p.name, p.count, length, bond_length))
            }
        }
    }
}

/// The system description as read from a TOML file, before CLI overrides and
/// defaults are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSystemConfig {
    cell: Option<PartialCellConfig>,
    placement: Option<PartialPlacementConfig>,
    #[serde(default)]
    species: Vec<PartialSpeciesConfig>,
}

impl PartialSystemConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn merge_with_cli(mut self, args: &GenerateArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let defaults = DefaultsConfig::default();
        let cell = self.cell.take().unwrap_or_default();
        let placement = self.placement.take().unwrap_or_default();

        let box_length = args.box_length.or(cell.box_length).ok_or_else(|| {
            CliError::Config(
                "`cell.box-length` is required either in the config file or via --box-length."
                    .to_string(),
            )
        })?;
        let rmin = args.rmin.or(placement.rmin).ok_or_else(|| {
            CliError::Config(
                "`placement.rmin` is required either in the config file or via --rmin.".to_string(),
            )
        })?;
        let max_attempts = args
            .max_attempts
            .or(placement.max_attempts)
            .unwrap_or(defaults.max_attempts);
        let replicas = args
            .replicas
            .or(placement.replicas)
            .unwrap_or(defaults.replicas);
        if replicas == 0 {
            return Err(CliError::Argument(
                "At least one replica must be generated.".to_string(),
            ));
        }

        let mut builder = SystemConfigBuilder::new()
            .box_length(box_length)
            .rmin(rmin)
            .max_attempts(max_attempts);
        for species in self.species {
            builder = builder.species(species.try_into()?);
        }
        let system = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(AppConfig {
            output_template: args.output.clone(),
            seed: args.seed.or(placement.seed),
            replicas,
            system,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "cell.box-length" => {
                    self.cell.get_or_insert_with(Default::default).box_length =
                        Some(parse_value(key, value_str)?);
                }
                "placement.rmin" => {
                    self.placement.get_or_insert_with(Default::default).rmin =
                        Some(parse_value(key, value_str)?);
                }
                "placement.max-attempts" => {
                    self.placement
                        .get_or_insert_with(Default::default)
                        .max_attempts = Some(parse_value(key, value_str)?);
                }
                "placement.seed" => {
                    self.placement.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value_str)?);
                }
                "placement.replicas" => {
                    self.placement.get_or_insert_with(Default::default).replicas =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value_str
        ))
    })
}
