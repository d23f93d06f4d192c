use chainseed::engine::config::SystemConfig;
use std::path::PathBuf;

/// Everything the `generate` command needs after merging file, flags and defaults.
pub struct AppConfig {
    pub output_template: PathBuf,
    pub seed: Option<u64>,
    pub replicas: usize,
    pub system: SystemConfig,
}
