use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use chainseed::core::io::{traits::ConfigurationFile, xyz::XyzFile};
use chainseed::core::models::cell::require_non_negative;
use tracing::{info, warn};

pub fn run(args: CheckArgs) -> Result<()> {
    require_non_negative("rmin", args.rmin)
        .and_then(|_| require_non_negative("tolerance", args.tolerance))
        .map_err(|e| CliError::Argument(e.to_string()))?;

    info!("Loading configuration from {:?}", &args.input);
    let configuration =
        XyzFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;

    println!(
        "Checking {} molecule(s), {} site(s) in a {} against rmin = {}.",
        configuration.molecules.len(),
        configuration.num_sites(),
        configuration.cell,
        args.rmin
    );

    let violations = configuration.validate(args.rmin, args.tolerance);
    if violations.is_empty() {
        println!("✓ No overlaps or broken bonds found.");
        return Ok(());
    }

    warn!(count = violations.len(), "Configuration has violations.");
    for violation in violations.iter().take(args.max_report) {
        println!("  {}", violation);
    }
    if violations.len() > args.max_report {
        println!("  ... and {} more.", violations.len() - args.max_report);
    }

    Err(CliError::Validation {
        path: args.input,
        count: violations.len(),
    })
}
