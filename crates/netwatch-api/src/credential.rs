// Credential provider capability.
//
// The bearer token is owned by an external credential store. Clients and
// the live channel receive a provider at construction time and read the
// token on every request; they never cache, refresh or mutate it.

use std::fmt;

use secrecy::SecretString;

/// Read-only access to the session's bearer token.
pub trait CredentialProvider: Send + Sync {
    /// The current bearer token, or `None` if the session has none.
    fn bearer_token(&self) -> Option<SecretString>;
}

/// A fixed token resolved once at startup (config file, env, keyring).
#[derive(Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl From<String> for StaticToken {
    fn from(token: String) -> Self {
        Self(SecretString::from(token))
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(****)")
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }
}

/// Provider that never yields a token. REST requests fail with `MissingCredential`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl CredentialProvider for NoToken {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}
