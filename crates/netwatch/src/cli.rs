//! Clap derive structures for the `netwatch` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};
use netwatch_config::Defaults;

use crate::error::CliError;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netwatch -- terminal client for the home network monitor
#[derive(Debug, Parser)]
#[command(
    name = "netwatch",
    version,
    about = "Watch your home network monitor from the terminal",
    long_about = "Fetches network status, traffic history and alerts from a\n\
        netwatch monitor backend, and follows its live status feed.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "NETWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Monitor server URL (overrides profile)
    #[arg(long, short = 's', env = "NETWATCH_SERVER", global = true)]
    pub server: Option<String>,

    /// Session token
    #[arg(long, env = "NETWATCH_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format [default: table, or `defaults.output` from the config]
    #[arg(
        long = "output",
        short = 'o',
        env = "NETWATCH_OUTPUT",
        value_name = "FORMAT",
        global = true
    )]
    output_flag: Option<OutputFormat>,

    /// When to use color output [default: auto, or `defaults.color`]
    #[arg(long = "color", value_name = "WHEN", global = true)]
    color_flag: Option<ColorMode>,

    /// Effective output format, set by [`GlobalOpts::apply_defaults`].
    #[arg(skip)]
    pub output: OutputFormat,

    /// Effective color mode, set by [`GlobalOpts::apply_defaults`].
    #[arg(skip)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates (REST and live feed)
    #[arg(long, short = 'k', env = "NETWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NETWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// Resolve output format and color mode: a flag wins, then the
    /// config file's `[defaults]`.
    pub fn apply_defaults(&mut self, defaults: &Defaults) -> Result<(), CliError> {
        self.output = match self.output_flag {
            Some(output) => output,
            None => parse_default("defaults.output", &defaults.output)?,
        };
        self.color = match self.color_flag {
            Some(color) => color,
            None => parse_default("defaults.color", &defaults.color)?,
        };
        Ok(())
    }
}

fn parse_default<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current network status and device census
    #[command(alias = "st")]
    Status,

    /// Show download/upload history
    Stats(StatsArgs),

    /// Show the most recent alerts
    #[command(alias = "al")]
    Alerts,

    /// List devices seen on the network
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Follow the live status feed until interrupted
    #[command(alias = "w")]
    Watch,

    /// Manage CLI configuration and tokens
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Only show the N most recent samples
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only online devices
    #[arg(long, conflicts_with = "offline")]
    pub online: bool,

    /// Only offline devices
    #[arg(long)]
    pub offline: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration (tokens redacted)
    Show,

    /// Store a session token in the system keyring
    SetToken,

    /// Remove the session token from the system keyring
    ClearToken,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
