use crate::cli::GenerateArgs;
use crate::config::PartialSystemConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use chainseed::{
    core::io::{traits::ConfigurationFile, xyz::XyzFile},
    engine::progress::ProgressReporter,
    workflows,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(args: GenerateArgs) -> Result<()> {
    let partial_config = PartialSystemConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&args)?;

    let seed = match app_config.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::thread_rng().r#gen::<u64>();
            info!(seed, "No seed given, drew a random one.");
            seed
        }
    };

    let system = &app_config.system;
    println!(
        "Seeding {} site(s) in a {} (packing fraction {:.4}), base seed {}.",
        system.num_sites(),
        system.cell,
        system.packing_fraction(),
        seed
    );

    for replica in 0..app_config.replicas {
        let replica_seed = seed.wrapping_add(replica as u64);
        let output_path =
            replica_output_path(&app_config.output_template, replica, app_config.replicas);
        info!(replica, seed = replica_seed, "Generating replica.");

        let progress_handler = CliProgressHandler::new();
        let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
        let mut rng = StdRng::seed_from_u64(replica_seed);

        let configuration = workflows::seed::run(system, &mut rng, &reporter)?;

        info!("Writing replica {} to {:?}", replica, &output_path);
        XyzFile::write_to_path(&configuration, &output_path).map_err(|e| {
            CliError::FileParsing {
                path: output_path.clone(),
                source: e.into(),
            }
        })?;
        println!(
            "✓ Replica {} (seed {}) written to: {}",
            replica,
            replica_seed,
            output_path.display()
        );
    }

    Ok(())
}

/// Output path of replica `index` out of `total`.
///
/// A single replica is written to `template` itself; otherwise `_<index>` is
/// appended to the file stem, keeping the extension.
fn replica_output_path(template: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return template.to_path_buf();
    }
    let stem = template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match template.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    template.with_file_name(file_name)
}
