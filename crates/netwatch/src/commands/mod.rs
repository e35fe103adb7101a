//! Command dispatch: bridges CLI args -> dashboard -> output formatting.

pub mod alerts;
pub mod config_cmd;
pub mod devices;
pub mod stats;
pub mod status;
pub mod util;
pub mod watch;

use netwatch_core::{DashboardConfig, SessionContext};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// What every server-bound command runs against.
pub struct CommandContext {
    pub config: DashboardConfig,
    pub session: SessionContext,
}

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    ctx: &CommandContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(ctx, global).await,
        Command::Stats(args) => stats::handle(ctx, &args, global).await,
        Command::Alerts => alerts::handle(ctx, global).await,
        Command::Devices(args) => devices::handle(ctx, &args, global).await,
        Command::Watch => watch::handle(ctx, global).await,
        // Config and Completions never reach the server
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "not a server command".into(),
        }),
    }
}
