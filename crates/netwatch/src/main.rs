mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use netwatch_api::StaticToken;
use netwatch_config::Defaults;
use netwatch_core::SessionContext;

use crate::cli::{Cli, Command};
use crate::commands::CommandContext;
use crate::config::{ResolvedSession, TokenSource};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(ref args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "netwatch", &mut std::io::stdout());
            Ok(())
        }

        // Config commands don't need a server, and must keep working
        // when the config file itself is broken.
        Command::Config(ref args) => {
            let cfg = netwatch_config::load_config_or_default();
            if let Err(err) = cli.global.apply_defaults(&cfg.defaults) {
                warn!(error = %err, "ignoring config defaults");
                cli.global.apply_defaults(&Defaults::default())?;
            }
            commands::config_cmd::handle(args, &cli.global)
        }

        cmd => {
            let cfg = netwatch_config::load_config()?;
            cli.global.apply_defaults(&cfg.defaults)?;
            let resolved = config::resolve_session(&cli.global, &cfg)?;

            let ResolvedSession {
                profile_name,
                dashboard,
                token,
                token_source,
            } = resolved;

            let ctx = CommandContext {
                config: dashboard,
                session: SessionContext::new(Arc::new(StaticToken::new(token))),
            };

            debug!(command = ?cmd, profile = %profile_name, "dispatching command");
            let result = commands::dispatch(cmd, &ctx, &cli.global).await;

            match result {
                Err(err) if err.is_session_expired() => {
                    forget_token(&profile_name, token_source);
                    Err(CliError::SessionExpired {
                        profile: profile_name,
                    })
                }
                other => other,
            }
        }
    }
}

/// Drop a rejected token from the keyring. Tokens from anywhere else are
/// left alone; the keyring entry was never sent.
fn forget_token(profile_name: &str, source: TokenSource) {
    if !source.is_keyring() {
        return;
    }
    match netwatch_config::clear_token(profile_name) {
        Ok(true) => warn!(profile = profile_name, "cleared rejected token from keyring"),
        Ok(false) => {}
        Err(e) => warn!(profile = profile_name, error = %e, "failed to clear keyring token"),
    }
}
