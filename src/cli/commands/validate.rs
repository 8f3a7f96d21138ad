//! `validate` command handler

use serde_json::json;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::LightConfig;
use crate::error::{ConfigError, TrafficLightError};

/// Validate each configuration file and report the result.
///
/// Every file is checked even after a failure.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationFailed`] if any file is invalid, or a
/// JSON error if the report cannot be serialized.
pub fn validate(args: &ValidateArgs, quiet: bool) -> Result<(), TrafficLightError> {
    let results: Vec<_> = args
        .files
        .iter()
        .map(|path| {
            tracing::info!(file = %path.display(), "validating configuration");
            (path, LightConfig::load(path))
        })
        .collect();

    match args.format {
        OutputFormat::Human => {
            for (path, result) in &results {
                match result {
                    Ok(config) if !quiet => println!(
                        "ok      {}  cycle [{}, {})  poll {}  seed {}",
                        path.display(),
                        humantime::format_duration(config.cycle.min),
                        humantime::format_duration(config.cycle.max),
                        humantime::format_duration(config.poll_interval),
                        config
                            .seed
                            .map_or_else(|| "entropy".to_string(), |s| s.to_string()),
                    ),
                    Ok(_) => {}
                    Err(e) => eprintln!("invalid {}: {e}", path.display()),
                }
            }
        }
        OutputFormat::Json => {
            let report: Vec<_> = results
                .iter()
                .map(|(path, result)| match result {
                    Ok(config) => json!({
                        "file": path.display().to_string(),
                        "valid": true,
                        "config": config,
                    }),
                    Err(e) => json!({
                        "file": path.display().to_string(),
                        "valid": false,
                        "error": e.to_string(),
                    }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        return Err(ConfigError::ValidationFailed {
            failed,
            total: results.len(),
        }
        .into());
    }
    Ok(())
}
