//! Command trait definition for CLI commands.
//!
//! All seqpool CLI commands implement [`Command`]; dispatch across the
//! subcommand enum uses `enum_dispatch`.

use anyhow::Result;
use enum_dispatch::enum_dispatch;

/// Trait implemented by all seqpool CLI commands.
///
/// The `command_line` parameter carries the full invocation for logging.
#[enum_dispatch]
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self, command_line: &str) -> Result<()>;
}
