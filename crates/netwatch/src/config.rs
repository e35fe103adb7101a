//! Profile resolution with CLI flag overrides.
//!
//! Produces the `DashboardConfig` and session token the core runs with.
//! Core never sees profiles or flags.

use secrecy::SecretString;

use netwatch_config::{Config, CredentialSource, Profile};
use netwatch_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Where the session token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `--token` or `NETWATCH_TOKEN`.
    Flag,
    /// Profile chain: `token_env`, keyring or plaintext.
    Profile(CredentialSource),
}

impl TokenSource {
    /// Whether the token lives in the system keyring, where a rejected
    /// token can be cleared.
    pub fn is_keyring(self) -> bool {
        self == Self::Profile(CredentialSource::Keyring)
    }
}

/// Everything a server-bound command needs.
pub struct ResolvedSession {
    pub profile_name: String,
    pub dashboard: DashboardConfig,
    pub token: SecretString,
    pub token_source: TokenSource,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Pick the profile (or synthesize one from `--server`) and apply flag
/// overrides.
pub fn effective_profile(global: &GlobalOpts, config: &Config) -> Result<Profile, CliError> {
    let name = active_profile_name(global, config);

    let mut profile = match (config.profiles.get(&name), global.server.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(server)) => Profile::new(server),
        (None, None) if global.profile.is_some() => {
            let mut names: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
            names.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: netwatch_config::config_path().display().to_string(),
            });
        }
    };

    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    Ok(profile)
}

/// Resolve profile, flags and token into a runnable session.
pub fn resolve_session(global: &GlobalOpts, config: &Config) -> Result<ResolvedSession, CliError> {
    let profile_name = active_profile_name(global, config);
    let profile = effective_profile(global, config)?;
    let dashboard = netwatch_config::profile_to_dashboard_config(&profile, &config.defaults)?;

    let (token, token_source) = match global.token {
        Some(ref token) => (SecretString::from(token.clone()), TokenSource::Flag),
        None => {
            let resolved = netwatch_config::resolve_token(&profile, &profile_name)?;
            (resolved.token, TokenSource::Profile(resolved.source))
        }
    };

    Ok(ResolvedSession {
        profile_name,
        dashboard,
        token,
        token_source,
    })
}
