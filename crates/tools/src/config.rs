//! Multi-network deployment configuration management
//!
//! This module provides typed, strongly-validated configuration for the EVM
//! networks the timekeeping contracts deploy to. Configuration is resolved in
//! priority order:
//!
//! 1. Environment variables (MUMBAI_URL, PRIVATE_KEY, TIMEKEEPING_*)
//! 2. networks.toml profile selection
//! 3. Built-in network defaults
//!
//! # Examples
//!
//! ```rust,no_run
//! use timekeeping_tools::config::{Config, Network};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! println!("Network: {}", config.network);
//! println!("RPC URL: {}", config.rpc_url);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Solidity compiler version the contracts are built with.
pub const SOLIDITY_VERSION: &str = "0.8.24";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid network: {0}. Must be: mumbai, polygon, or localhost")]
    InvalidNetwork(String),

    #[error("networks.toml not found")]
    MissingNetworksToml,

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Networks the deployment tooling knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Polygon Mumbai testnet - for testing before mainnet
    Mumbai,
    /// Polygon mainnet - production
    Polygon,
    /// Local development node
    Localhost,
}

impl Network {
    /// Get network as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mumbai => "mumbai",
            Network::Polygon => "polygon",
            Network::Localhost => "localhost",
        }
    }

    /// Parse network from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "mumbai" => Ok(Network::Mumbai),
            "polygon" => Ok(Network::Polygon),
            "localhost" => Ok(Network::Localhost),
            other => Err(ConfigError::InvalidNetwork(other.to_string())),
        }
    }

    /// Chain id submitted with every signed transaction
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mumbai => 80001,
            Network::Polygon => 137,
            Network::Localhost => 31337,
        }
    }

    /// Environment variable that carries this network's RPC endpoint
    pub fn url_env_var(&self) -> &'static str {
        match self {
            Network::Mumbai => "MUMBAI_URL",
            Network::Polygon => "POLYGON_URL",
            Network::Localhost => "LOCALHOST_URL",
        }
    }

    /// Fallback RPC URL when neither env var nor profile supplies one.
    ///
    /// Remote networks fall back to the empty string: there is no endpoint
    /// we can assume on the operator's behalf, and deployment reports the
    /// missing URL when it actually needs one.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mumbai => "",
            Network::Polygon => "",
            Network::Localhost => "http://localhost:8545",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// TOML profile definition from networks.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub url: String,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Complete networks.toml layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworksToml {
    #[serde(default)]
    pub default: Option<DefaultNetwork>,
    #[serde(default)]
    pub profile: std::collections::HashMap<String, NetworkProfile>,
}

/// Default network section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultNetwork {
    pub network: Option<String>,
}

/// Resolved runtime configuration with all required fields
#[derive(Debug, Clone)]
pub struct Config {
    /// Active network
    pub network: Network,
    /// RPC endpoint URL (may be empty until the operator configures one)
    pub rpc_url: String,
    /// Chain id for transaction signing
    pub chain_id: u64,
    /// Signing keys; empty when PRIVATE_KEY is unset
    pub accounts: Vec<String>,
    /// Pinned Solidity compiler version
    pub solidity: String,
    /// RPC timeout in milliseconds
    pub rpc_timeout_ms: u64,
    /// Debug mode
    pub debug: bool,
}

impl Config {
    /// Load configuration from environment and networks.toml
    ///
    /// # Resolution Order
    ///
    /// 1. Load TIMEKEEPING_NETWORK from env (or networks.toml default,
    ///    or "mumbai")
    /// 2. Load the network's URL env var (MUMBAI_URL etc)
    /// 3. Overlay on the networks.toml profile, then built-in defaults
    /// 4. Collect PRIVATE_KEY into the account list if set
    /// 5. Validate
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - An invalid network name is configured
    /// - A configured URL or private key fails validation
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_network(None)
    }

    /// Load configuration, forcing the active network when `network` is set.
    pub fn load_with_network(network: Option<&str>) -> Result<Self, ConfigError> {
        // Load .env file if it exists (non-fatal)
        let _ = dotenvy::dotenv();

        let toml_config = Self::load_toml().ok();

        // Determine active network
        let network_name = network
            .map(str::to_string)
            .or_else(|| std::env::var("TIMEKEEPING_NETWORK").ok())
            .or_else(|| {
                toml_config
                    .as_ref()
                    .and_then(|t| t.default.as_ref())
                    .and_then(|d| d.network.clone())
            })
            .unwrap_or_else(|| "mumbai".to_string());

        let network = Network::from_str(&network_name)?;

        let profile = toml_config
            .as_ref()
            .and_then(|t| t.profile.get(network.as_str()));

        let rpc_url = resolve_rpc_url(
            std::env::var(network.url_env_var()).ok(),
            profile,
            network,
        );

        let chain_id = profile
            .and_then(|p| p.chain_id)
            .unwrap_or_else(|| network.chain_id());

        let accounts = accounts_from(std::env::var("PRIVATE_KEY").ok());

        let rpc_timeout_ms = std::env::var("TIMEKEEPING_RPC_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30000);
        let debug = std::env::var("TIMEKEEPING_DEBUG")
            .ok()
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        // Validate
        Self::validate(&network, &rpc_url, &accounts)?;

        Ok(Config {
            network,
            rpc_url,
            chain_id,
            accounts,
            solidity: SOLIDITY_VERSION.to_string(),
            rpc_timeout_ms,
            debug,
        })
    }

    /// Load networks.toml from the workspace root
    fn load_toml() -> Result<NetworksToml, ConfigError> {
        let paths = [
            Path::new("networks.toml"),
            Path::new("./networks.toml"),
        ];

        for path in paths {
            if path.exists() {
                return Self::load_toml_from(path);
            }
        }

        Err(ConfigError::MissingNetworksToml)
    }

    /// Parse a networks.toml file at an explicit path
    pub fn load_toml_from(path: &Path) -> Result<NetworksToml, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(ConfigError::TomlError)
    }

    /// Validate configuration values.
    ///
    /// An empty URL or empty account list is valid here: the tooling can
    /// report configuration without either, and deployment raises its own
    /// error when it needs them. Values that ARE present must be well formed.
    fn validate(
        _network: &Network,
        rpc_url: &str,
        accounts: &[String],
    ) -> Result<(), ConfigError> {
        if !rpc_url.is_empty()
            && !rpc_url.starts_with("http://")
            && !rpc_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "RPC URL must start with http:// or https://: {}",
                rpc_url
            )));
        }

        for key in accounts {
            validate_private_key(key)?;
        }

        Ok(())
    }

    /// Print the resolved configuration
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════════╗");
        println!("║        TIMEKEEPING NETWORK CONFIGURATION RESOLVED              ║");
        println!("╚════════════════════════════════════════════════════════════════╝");
        println!("  Network:             {}", self.network);

        if self.rpc_url.is_empty() {
            println!(
                "  RPC URL:             (not configured - set {})",
                self.network.url_env_var()
            );
        } else {
            println!("  RPC URL:             {}", self.rpc_url);
        }

        println!("  Chain ID:            {}", self.chain_id);

        if self.accounts.is_empty() {
            println!("  Accounts:            (none configured - set PRIVATE_KEY)");
        } else {
            println!("  Accounts:            {} signing key(s)", self.accounts.len());
        }

        println!("  Solidity:            {}", self.solidity);
        println!("  RPC Timeout:         {}ms", self.rpc_timeout_ms);

        if self.debug {
            println!("  Debug Mode:          ENABLED");
        }

        println!("╚════════════════════════════════════════════════════════════════╝");
    }

    /// Get configuration as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the signing account list from an optional PRIVATE_KEY value.
///
/// Unset means an empty list; set means a list of exactly that key.
pub fn accounts_from(private_key: Option<String>) -> Vec<String> {
    match private_key {
        Some(key) => vec![key],
        None => Vec::new(),
    }
}

/// Resolve the RPC URL from env, profile, and built-in default, in that order.
pub fn resolve_rpc_url(
    env_url: Option<String>,
    profile: Option<&NetworkProfile>,
    network: Network,
) -> String {
    env_url
        .or_else(|| profile.map(|p| p.url.clone()))
        .unwrap_or_else(|| network.default_rpc_url().to_string())
}

/// Check a private key is 32 bytes of hex, with or without a 0x prefix.
pub fn validate_private_key(key: &str) -> Result<(), ConfigError> {
    let stripped = key.strip_prefix("0x").unwrap_or(key);

    if stripped.len() != 64 {
        return Err(ConfigError::InvalidPrivateKey(
            "private key must be 64 hex characters (32 bytes)".to_string(),
        ));
    }

    if hex::decode(stripped).is_err() {
        return Err(ConfigError::InvalidPrivateKey(
            "private key must be valid hexadecimal".to_string(),
        ));
    }

    Ok(())
}

// Manual Serialize impl for Config: signing keys are serialized as a count,
// never as raw key material.
impl Serialize for Config {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("network", &self.network.to_string())?;
        map.serialize_entry("rpc_url", &self.rpc_url)?;
        map.serialize_entry("chain_id", &self.chain_id)?;
        map.serialize_entry("accounts", &self.accounts.len())?;
        map.serialize_entry("solidity", &self.solidity)?;
        map.serialize_entry("rpc_timeout_ms", &self.rpc_timeout_ms)?;
        map.serialize_entry("debug", &self.debug)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_network_from_str() {
        assert_eq!(Network::from_str("mumbai").unwrap(), Network::Mumbai);
        assert_eq!(Network::from_str("polygon").unwrap(), Network::Polygon);
        assert_eq!(Network::from_str("localhost").unwrap(), Network::Localhost);
        assert_eq!(Network::from_str("MUMBAI").unwrap(), Network::Mumbai);
    }

    #[test]
    fn test_network_invalid() {
        assert!(Network::from_str("sepolia").is_err());
    }

    #[test]
    fn test_network_display() {
        assert_eq!(Network::Mumbai.to_string(), "mumbai");
        assert_eq!(Network::Polygon.to_string(), "polygon");
        assert_eq!(Network::Localhost.to_string(), "localhost");
    }

    #[test]
    fn test_network_chain_ids() {
        assert_eq!(Network::Mumbai.chain_id(), 80001);
        assert_eq!(Network::Polygon.chain_id(), 137);
        assert_eq!(Network::Localhost.chain_id(), 31337);
    }

    #[test]
    fn test_network_default_rpc_urls() {
        // Remote networks have no assumable endpoint
        assert_eq!(Network::Mumbai.default_rpc_url(), "");
        assert_eq!(Network::Polygon.default_rpc_url(), "");
        assert_eq!(Network::Localhost.default_rpc_url(), "http://localhost:8545");
    }

    #[test]
    fn test_network_url_env_vars() {
        assert_eq!(Network::Mumbai.url_env_var(), "MUMBAI_URL");
        assert_eq!(Network::Polygon.url_env_var(), "POLYGON_URL");
        assert_eq!(Network::Localhost.url_env_var(), "LOCALHOST_URL");
    }

    #[test]
    fn test_accounts_from_unset_key() {
        assert!(accounts_from(None).is_empty());
    }

    #[test]
    fn test_accounts_from_set_key() {
        let accounts = accounts_from(Some(TEST_PRIVATE_KEY.to_string()));
        assert_eq!(accounts, vec![TEST_PRIVATE_KEY.to_string()]);
    }

    #[test]
    fn test_resolve_rpc_url_env_wins() {
        let profile = NetworkProfile {
            url: "https://profile.example".to_string(),
            chain_id: None,
            description: None,
        };
        let url = resolve_rpc_url(
            Some("https://env.example".to_string()),
            Some(&profile),
            Network::Mumbai,
        );
        assert_eq!(url, "https://env.example");
    }

    #[test]
    fn test_resolve_rpc_url_profile_over_default() {
        let profile = NetworkProfile {
            url: "https://profile.example".to_string(),
            chain_id: None,
            description: None,
        };
        let url = resolve_rpc_url(None, Some(&profile), Network::Mumbai);
        assert_eq!(url, "https://profile.example");
    }

    #[test]
    fn test_resolve_rpc_url_unset_is_empty() {
        assert_eq!(resolve_rpc_url(None, None, Network::Mumbai), "");
    }

    #[test]
    fn test_validate_private_key() {
        assert!(validate_private_key(TEST_PRIVATE_KEY).is_ok());
        assert!(validate_private_key(&format!("0x{}", TEST_PRIVATE_KEY)).is_ok());
    }

    #[test]
    fn test_validate_private_key_short() {
        assert!(validate_private_key("1234").is_err());
    }

    #[test]
    fn test_validate_private_key_not_hex() {
        let key = "zz".repeat(32);
        assert!(validate_private_key(&key).is_err());
    }

    #[test]
    fn test_validate_empty_url_is_ok() {
        let result = Config::validate(&Network::Mumbai, "", &[]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_invalid_scheme() {
        let result = Config::validate(&Network::Mumbai, "ftp://example.com", &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_bad_account() {
        let accounts = vec!["not-a-key".to_string()];
        let result =
            Config::validate(&Network::Mumbai, "https://example.com", &accounts);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_success() {
        let accounts = vec![TEST_PRIVATE_KEY.to_string()];
        let result = Config::validate(
            &Network::Mumbai,
            "https://rpc-mumbai.example.com",
            &accounts,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_toml_from() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("networks.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[default]
network = "mumbai"

[profile.mumbai]
url = "https://rpc-mumbai.example.com"
chain_id = 80001
description = "Polygon Mumbai testnet"
"#
        )
        .unwrap();

        let toml = Config::load_toml_from(&path).unwrap();
        assert_eq!(toml.default.unwrap().network.as_deref(), Some("mumbai"));
        let profile = toml.profile.get("mumbai").unwrap();
        assert_eq!(profile.url, "https://rpc-mumbai.example.com");
        assert_eq!(profile.chain_id, Some(80001));
    }

    #[test]
    fn test_load_toml_from_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("networks.toml");
        std::fs::write(&path, "profile = not toml").unwrap();

        assert!(matches!(
            Config::load_toml_from(&path),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_config_to_json_redacts_keys() {
        let config = Config {
            network: Network::Mumbai,
            rpc_url: "https://rpc-mumbai.example.com".to_string(),
            chain_id: 80001,
            accounts: vec![TEST_PRIVATE_KEY.to_string()],
            solidity: SOLIDITY_VERSION.to_string(),
            rpc_timeout_ms: 30000,
            debug: false,
        };

        let json = config.to_json().unwrap();
        assert!(!json.contains(TEST_PRIVATE_KEY));
        assert!(json.contains("\"accounts\": 1"));
        assert!(json.contains("\"solidity\": \"0.8.24\""));
    }
}
