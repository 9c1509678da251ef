//! Configuration command handler.
//!
//! Prints every ETL setting with the layer it was resolved from:
//!
//! ```json
//! {
//!   "database": { "value": "data/handfact.sqlite", "source": "default" },
//!   "max_runtime_ms": { "value": 2200, "source": "env" },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write) -> Result<(), CliError> {
    let config::ConfigResolved { config, sources } = config::load_with_sources()?;
    let display = serde_json::json!({
        "database": {
            "value": config.database,
            "source": sources.database,
        },
        "max_runtime_ms": {
            "value": config.max_runtime_ms,
            "source": sources.max_runtime_ms,
        },
        "max_hands_per_run": {
            "value": config.max_hands_per_run,
            "source": sources.max_hands_per_run,
        },
        "page_size": {
            "value": config.page_size,
            "source": sources.page_size,
        },
        "relay": {
            "value": config.relay,
            "source": sources.relay,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
