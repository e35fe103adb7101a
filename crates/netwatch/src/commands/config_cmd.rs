//! Config subcommand handlers.

use secrecy::SecretString;

use netwatch_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

/// Replace plaintext tokens before showing a config.
fn redact(mut config: Config) -> Config {
    for profile in config.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
    config
}

fn read_token(global: &GlobalOpts) -> Result<SecretString, CliError> {
    let token = match global.token {
        Some(ref token) => token.clone(),
        None => rpassword::prompt_password("Session token: ")?,
    };
    let token = token.trim().to_owned();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(SecretString::from(token))
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(
                &netwatch_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redact(netwatch_config::load_config()?);
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(|e| CliError::Render(e.to_string()))?
                }
                OutputFormat::Json => output::render_json(&cfg, false)?,
                OutputFormat::JsonCompact => output::render_json(&cfg, true)?,
                OutputFormat::Yaml => output::render_yaml(&cfg)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken => {
            let cfg = netwatch_config::load_config_or_default();
            let profile = active_profile_name(global, &cfg);
            let token = read_token(global)?;
            netwatch_config::store_token(&profile, &token)?;
            if !global.quiet {
                eprintln!("Token stored in the system keyring for profile '{profile}'");
            }
            Ok(())
        }

        ConfigCommand::ClearToken => {
            let cfg = netwatch_config::load_config_or_default();
            let profile = active_profile_name(global, &cfg);
            let removed = netwatch_config::clear_token(&profile)?;
            if !global.quiet {
                if removed {
                    eprintln!("Token removed for profile '{profile}'");
                } else {
                    eprintln!("No stored token for profile '{profile}'");
                }
            }
            Ok(())
        }
    }
}
