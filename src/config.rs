//! Configuration loader. A JSON file selects the digest algorithm, the name of
//! the signature parameter, and where the shared secret is read from. The
//! secret itself never lives in the file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use zeroize::Zeroize;

use crate::signing::canonical::is_blank;
use crate::signing::digest::{DigestAlgorithm, UnknownAlgorithm};
use crate::signing::SIGN_FIELD;

/// Environment variable consulted when no secret source is configured.
pub const DEFAULT_SECRET_ENV: &str = "PARAM_SIGN_SECRET";

/// Environment variable that, when set, overrides the configured algorithm.
pub const ALGORITHM_ENV: &str = "PARAM_SIGN_ALGORITHM";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("secret source unreadable: {0}")]
    SecretUnreadable(String),
    #[error("secret source {0} is empty")]
    EmptySecret(String),
    #[error("signature field must not be blank")]
    BlankSignatureField,
    #[error("algorithm override rejected: {0}")]
    Algorithm(#[from] UnknownAlgorithm),
}

/// Where the shared secret comes from. The environment wins when both are set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SecretSource {
    /// Environment variable holding the secret.
    pub env: Option<String>,
    /// File whose trimmed contents are the secret.
    pub path: Option<PathBuf>,
}

impl SecretSource {
    fn describe(&self) -> String {
        match (&self.env, &self.path) {
            (Some(var), _) => format!("env:{var}"),
            (None, Some(path)) => format!("file:{}", path.display()),
            (None, None) => format!("env:{DEFAULT_SECRET_ENV}"),
        }
    }

    /// Reads the secret. Blank secrets are refused here so the signer never
    /// silently produces empty signatures for a misconfigured deployment.
    pub fn load(&self) -> Result<SharedSecret, ConfigError> {
        let mut raw = match (&self.env, &self.path) {
            (Some(var), _) => std::env::var(var)
                .map_err(|e| ConfigError::SecretUnreadable(format!("{var}: {e}")))?,
            (None, Some(path)) => fs::read_to_string(path)
                .map_err(|e| ConfigError::SecretUnreadable(format!("{}: {e}", path.display())))?,
            (None, None) => std::env::var(DEFAULT_SECRET_ENV)
                .map_err(|e| ConfigError::SecretUnreadable(format!("{DEFAULT_SECRET_ENV}: {e}")))?,
        };
        let secret = SharedSecret::new(raw.trim());
        raw.zeroize();
        if is_blank(Some(secret.expose())) {
            return Err(ConfigError::EmptySecret(self.describe()));
        }
        Ok(secret)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawSignerConfig {
    algorithm: Option<DigestAlgorithm>,
    signature_field: Option<String>,
    secret: Option<SecretSource>,
}

/// Settings for a [`Signer`](crate::signing::Signer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    pub algorithm: DigestAlgorithm,
    pub signature_field: String,
    pub secret: SecretSource,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::default(),
            signature_field: SIGN_FIELD.to_string(),
            secret: SecretSource::default(),
        }
    }
}

impl SignerConfig {
    /// Parses configuration JSON. Missing fields take the legacy defaults.
    pub fn from_json(raw_json: &str) -> Result<Self, ConfigError> {
        let raw: RawSignerConfig =
            serde_json::from_str(raw_json).map_err(|e| ConfigError::Parse(format!("{e}")))?;

        let signature_field = raw.signature_field.unwrap_or_else(|| SIGN_FIELD.to_string());
        if signature_field.trim().is_empty() {
            return Err(ConfigError::BlankSignatureField);
        }

        Ok(Self {
            algorithm: raw.algorithm.unwrap_or_default(),
            signature_field,
            secret: raw.secret.unwrap_or_default(),
        })
    }

    /// Replaces the algorithm with one named by `name` (`md5`, `sha256`, ...).
    pub fn override_algorithm(&mut self, name: &str) -> Result<(), ConfigError> {
        self.algorithm = name.parse()?;
        Ok(())
    }

    /// Applies `$PARAM_SIGN_ALGORITHM` when it is set.
    pub fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(name) = std::env::var(ALGORITHM_ENV) {
            self.override_algorithm(&name)?;
        }
        Ok(self)
    }

    pub fn secret_source(&self) -> String {
        self.secret.describe()
    }
}

/// Loads the JSON configuration file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<SignerConfig, ConfigError> {
    let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    SignerConfig::from_json(&raw_json)
}

/// Secret material read from a [`SecretSource`]. Zeroed on drop and redacted
/// in debug output.
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
