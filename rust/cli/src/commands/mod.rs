//! Command handler modules for the handfact CLI.
//!
//! Each command lives in its own file and follows one pattern:
//!
//! - Public handler: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Output streams (`&mut dyn Write`) are passed in
//! - Errors propagate through `CliError`

pub mod cfg;
pub mod etl;
pub mod evaluate;
pub mod import;
pub mod show;
pub mod stats;

pub use cfg::handle_cfg_command;
pub use etl::{EtlArgs, handle_etl_command};
pub use evaluate::handle_evaluate_command;
pub use import::handle_import_command;
pub use show::handle_show_command;
pub use stats::handle_stats_command;
