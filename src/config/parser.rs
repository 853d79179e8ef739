use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable consulted when the file leaves the username empty
pub const USERNAME_ENV: &str = "FNGUIDE_USERNAME";

/// Environment variable consulted when the file leaves the password empty
pub const PASSWORD_ENV: &str = "FNGUIDE_PASSWORD";

/// Loads and parses a configuration file from the given path
///
/// Empty credentials are filled from `FNGUIDE_USERNAME` / `FNGUIDE_PASSWORD`
/// before validation. Call `dotenvy::dotenv()` first to pick up a `.env` file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;

    fill_credentials_from_env(&mut config);

    validate(&config)?;

    Ok(config)
}

fn fill_credentials_from_env(config: &mut Config) {
    if config.credentials.username.is_empty() {
        if let Ok(username) = std::env::var(USERNAME_ENV) {
            config.credentials.username = username;
        }
    }
    if config.credentials.password.is_empty() {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            config.credentials.password = password;
        }
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so result files can be traced back to the settings
/// that produced them.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
