use crate::core::models::cell::Position;
use crate::core::models::configuration::{Configuration, Molecule};
use crate::engine::chain::{ChainParams, build_chain};
use crate::engine::config::{SpeciesConfig, SpeciesKind, SystemConfig};
use crate::engine::error::{GenerationError, WorkflowError};
use crate::engine::placement::generate_points;
use crate::engine::progress::{Progress, ProgressReporter};
use rand::Rng;
use tracing::{info, instrument, warn};

/// Packing fractions above this rarely succeed with uniform rejection sampling.
const CROWDED_PACKING_FRACTION: f64 = 0.3;

/// Seeds every species of `config`, in order, into one configuration.
///
/// Each molecule sees every position placed before it (including earlier
/// molecules of the same species) as occupied. A points species is placed in
/// a single batch; a chain species is grown one chain at a time.
///
/// The run is atomic: on failure no configuration is returned, and the error
/// names the species and molecule index that could not be placed.
///
/// # Arguments
///
/// * `config` - The box, exclusion distance, attempt budget and ordered species.
/// * `rng` - Source of randomness shared by every species.
/// * `reporter` - Receives a start and finish event per species and one event
///   per placed molecule.
///
/// # Return
///
/// The assembled configuration. Molecules appear in species order, and points
/// species contribute one single-site molecule per point.
///
/// # Errors
///
/// Returns [`WorkflowError::Species`] wrapping the generator failure of the
/// first molecule that could not be placed.
#[instrument(skip_all, name = "seed_workflow")]
pub fn run(
    config: &SystemConfig,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<Configuration, WorkflowError> {
    let packing = config.packing_fraction();
    info!(
        cell = %config.cell,
        rmin = config.rmin,
        sites = config.num_sites(),
        packing,
        "Starting seeding run."
    );
    if packing > CROWDED_PACKING_FRACTION {
        warn!(
            packing,
            "Exclusion spheres cover a large fraction of the box; placement may exhaust its attempt budget."
        );
    }

    let mut configuration = Configuration::new(config.cell);
    let mut occupied: Vec<Position> = Vec::with_capacity(config.num_sites());

    for species in &config.species {
        seed_species(config, species, &mut configuration, &mut occupied, rng, reporter)?;
    }

    info!(
        molecules = configuration.molecules.len(),
        sites = configuration.num_sites(),
        "Seeding run complete."
    );
    Ok(configuration)
}

fn seed_species(
    config: &SystemConfig,
    species: &SpeciesConfig,
    configuration: &mut Configuration,
    occupied: &mut Vec<Position>,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<(), WorkflowError> {
    let tag = |molecule: usize| {
        move |source: GenerationError| WorkflowError::Species {
            species: species.name.clone(),
            molecule,
            source,
        }
    };

    match species.kind {
        SpeciesKind::Points { count } => {
            info!(species = %species.name, count, "Placing points.");
            reporter.report(Progress::SpeciesStart {
                name: species.name.clone(),
                molecules: 1,
            });
            let points = generate_points(
                count,
                &config.cell,
                config.rmin,
                occupied,
                config.max_attempts,
                rng,
            )
            .map_err(|source| match source {
                GenerationError::PlacementExhausted { slot, .. } => tag(slot)(source),
                other => tag(0)(other),
            })?;
            occupied.extend_from_slice(&points);
            configuration.molecules.extend(
                points
                    .into_iter()
                    .map(|p| Molecule::point(species.name.as_str(), p)),
            );
            reporter.report(Progress::MoleculePlaced);
        }
        SpeciesKind::Chains {
            count,
            length,
            bond_length,
        } => {
            info!(species = %species.name, count, length, bond_length, "Growing chains.");
            reporter.report(Progress::SpeciesStart {
                name: species.name.clone(),
                molecules: count as u64,
            });
            let params = ChainParams::new(length, config.rmin, bond_length);
            for molecule in 0..count {
                let chain = build_chain(
                    &params,
                    &config.cell,
                    occupied,
                    config.max_attempts,
                    rng,
                )
                .map_err(tag(molecule))?;
                occupied.extend_from_slice(&chain);
                if !chain.is_empty() {
                    configuration.molecules.push(Molecule::chain(
                        species.name.as_str(),
                        bond_length,
                        chain,
                    ));
                }
                reporter.report(Progress::MoleculePlaced);
            }
        }
    }

    reporter.report(Progress::SpeciesFinish);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::traits::ConfigurationFile;
    use crate::core::io::xyz::XyzFile;
    use crate::core::models::configuration::MoleculeKind;
    use crate::engine::config::SystemConfigBuilder;
    use rand::{SeedableRng, rngs::StdRng};
    use std::sync::{Arc, Mutex};

    fn mixed_config() -> SystemConfig {
        SystemConfigBuilder::new()
            .box_length(12.0)
            .rmin(1.0)
            .max_attempts(1000)
            .species(SpeciesConfig::points("ion", 30))
            .species(SpeciesConfig::chains("poly", 3, 25, 1.0))
            .species(SpeciesConfig::points("salt", 10))
            .build()
            .unwrap()
    }

    #[test]
    fn mixed_system_satisfies_all_invariants() {
        let config = mixed_config();
        let mut rng = StdRng::seed_from_u64(12);

        let configuration = run(&config, &mut rng, &ProgressReporter::new()).unwrap();

        assert_eq!(configuration.num_sites(), config.num_sites());
        assert_eq!(configuration.molecules.len(), 30 + 3 + 10);
        assert!(configuration.validate(config.rmin, 1e-9).is_empty());
    }

    #[test]
    fn molecules_follow_species_order() {
        let config = mixed_config();
        let mut rng = StdRng::seed_from_u64(3);

        let configuration = run(&config, &mut rng, &ProgressReporter::new()).unwrap();

        let species: Vec<&str> = configuration
            .molecules
            .iter()
            .map(|m| m.species.as_str())
            .collect();
        assert!(species[..30].iter().all(|s| *s == "ion"));
        assert!(species[30..33].iter().all(|s| *s == "poly"));
        assert!(species[33..].iter().all(|s| *s == "salt"));
        assert_eq!(
            configuration.molecules[30].kind,
            MoleculeKind::Chain { bond_length: 1.0 }
        );
        assert_eq!(configuration.molecules[30].len(), 25);
    }

    #[test]
    fn same_seed_reproduces_configuration() {
        let config = mixed_config();
        let a = run(&config, &mut StdRng::seed_from_u64(5), &ProgressReporter::new()).unwrap();
        let b = run(&config, &mut StdRng::seed_from_u64(5), &ProgressReporter::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn generated_configuration_reads_back_from_xyz() {
        let config = mixed_config();
        let configuration =
            run(&config, &mut StdRng::seed_from_u64(21), &ProgressReporter::new()).unwrap();

        let mut buffer = Vec::new();
        XyzFile::write_to(&configuration, &mut buffer).unwrap();
        let parsed = XyzFile::read_from(&mut buffer.as_slice()).unwrap();

        assert_eq!(parsed, configuration);
        assert!(parsed.validate(config.rmin, 1e-9).is_empty());
    }

    #[test]
    fn chains_without_monomers_add_no_molecules() {
        let mut config = mixed_config();
        config.species.insert(0, SpeciesConfig::chains("empty", 2, 0, 1.0));

        let configuration =
            run(&config, &mut StdRng::seed_from_u64(4), &ProgressReporter::new()).unwrap();

        assert_eq!(configuration.molecules.len(), 30 + 3 + 10);
        assert!(configuration.molecules.iter().all(|m| !m.is_empty()));
        let mut buffer = Vec::new();
        XyzFile::write_to(&configuration, &mut buffer).unwrap();
        assert_eq!(XyzFile::read_from(&mut buffer.as_slice()).unwrap(), configuration);
    }

    #[test]
    fn failure_names_species_and_molecule() {
        let config = SystemConfigBuilder::new()
            .box_length(1.0)
            .rmin(1.0)
            .max_attempts(20)
            .species(SpeciesConfig::points("crowded", 5))
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let err = run(&config, &mut rng, &ProgressReporter::new()).unwrap_err();

        assert_eq!(
            err,
            WorkflowError::Species {
                species: "crowded".to_string(),
                molecule: 1,
                source: GenerationError::PlacementExhausted {
                    slot: 1,
                    attempts: 20
                },
            }
        );
    }

    #[test]
    fn reports_progress_per_species_and_molecule() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        let config = SystemConfigBuilder::new()
            .box_length(10.0)
            .rmin(1.0)
            .max_attempts(100)
            .species(SpeciesConfig::points("a", 4))
            .species(SpeciesConfig::chains("b", 2, 3, 1.0))
            .build()
            .unwrap();

        run(&config, &mut StdRng::seed_from_u64(1), &reporter).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                Progress::SpeciesStart {
                    name: "a".to_string(),
                    molecules: 1
                },
                Progress::MoleculePlaced,
                Progress::SpeciesFinish,
                Progress::SpeciesStart {
                    name: "b".to_string(),
                    molecules: 2
                },
                Progress::MoleculePlaced,
                Progress::MoleculePlaced,
                Progress::SpeciesFinish,
            ]
        );
    }
}
