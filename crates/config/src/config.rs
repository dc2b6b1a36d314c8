use std::env;

use derive_more::{Display, From};
use log::{info, warn};
use serde::Deserialize;
use serde_valid::yaml::FromYamlStr;
use serde_valid::Validate;

pub const COINGECKO_API_KEYS_ENV: &str = "COINGECKO_API_KEYS";
pub const UPSHOT_API_KEY_ENV: &str = "UPSHOT_APIKEY";
pub const RPC_URL_ENV: &str = "RPC";

// Config Type
#[derive(Debug, Clone)]
pub struct Config {
    // API Server Configuration
    pub server: ServerConfig,
    // CoinGecko API configuration, used for spot prices of well known symbols
    pub coingecko: CoinGeckoConfig,
    // Upshot token oracle configuration, maps a block height to a meme token
    pub upshot: UpshotConfig,
    // GeckoTerminal API configuration, used for meme token prices
    pub geckoterminal: GeckoTerminalConfig,
    // Bands of the random price adjustment
    pub adjustment: AdjustmentConfig,
}

impl Config {
    pub fn from_file(file_path: &str) -> Result<Self, ConfigError> {
        let config_file_content = std::fs::read_to_string(file_path)?;
        Self::from_yaml_str(&config_file_content)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let raw_config = RawConfig::from_yaml_str(s)?;

        Ok(Config {
            server: raw_config.server,
            coingecko: raw_config.coingecko,
            upshot: raw_config.upshot,
            geckoterminal: raw_config.geckoterminal,
            adjustment: raw_config.adjustment,
        })
    }

    /// Replaces the CoinGecko credential pool with the keys found in `COINGECKO_API_KEYS`, if set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        match env::var(COINGECKO_API_KEYS_ENV) {
            Ok(raw) if !raw.trim().is_empty() => self.override_api_keys(&raw),
            _ => Ok(()),
        }
    }

    /// Parses a comma separated key list into a deduplicated credential pool.
    pub fn override_api_keys(&mut self, raw: &str) -> Result<(), ConfigError> {
        let mut api_keys: Vec<String> = Vec::new();
        for key in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            if api_keys.iter().any(|existing| existing == key) {
                warn!("Ignoring duplicate CoinGecko API key in {}", COINGECKO_API_KEYS_ENV);
                continue;
            }
            api_keys.push(key.to_string());
        }

        if api_keys.is_empty() {
            return Err(ConfigError::EmptyCredentialPool);
        }

        info!("Using {} CoinGecko API keys from environment", api_keys.len());
        self.coingecko.api_keys = api_keys;
        Ok(())
    }
}

#[derive(Debug, From, Display)]
pub enum ConfigError {
    #[display("Credential pool is empty")]
    #[from(ignore)]
    EmptyCredentialPool,

    #[display("Serde Error: {}", _0)]
    SerdeError(serde_valid::Error<serde_yaml::Error>),

    #[display("Error Reading Config File: {}", _0)]
    IoError(std::io::Error),
}

impl std::error::Error for ConfigError {}

// Intermediate Config Type as Deserialization Target
#[derive(Debug, Deserialize, Validate)]
pub struct RawConfig {
    #[validate]
    pub server: ServerConfig,
    #[validate]
    pub coingecko: CoinGeckoConfig,
    #[validate]
    pub upshot: UpshotConfig,
    #[validate]
    pub geckoterminal: GeckoTerminalConfig,
    #[serde(default)]
    #[validate]
    pub adjustment: AdjustmentConfig,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct ServerConfig {
    // The port the server will listen on
    #[validate(minimum = 1)]
    pub port: u16,

    // The host the server will listen on
    #[validate(min_length = 1)]
    pub host: String,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct CoinGeckoConfig {
    // The base URL of the CoinGecko API
    #[validate(
        pattern = r"https?:\/\/(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&//=]*)"
    )]
    pub base_url: String,

    // Interchangeable demo API keys, one is picked per request
    #[validate(min_items = 1)]
    #[validate(unique_items)]
    pub api_keys: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct UpshotConfig {
    // The base URL of the Upshot API, the API key is read from UPSHOT_APIKEY
    #[validate(
        pattern = r"https?:\/\/(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&//=]*)"
    )]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct GeckoTerminalConfig {
    // The base URL of the GeckoTerminal API
    #[validate(
        pattern = r"https?:\/\/(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&//=]*)"
    )]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct AdjustmentConfig {
    // Relative band applied to spot prices, 0.008 means +-0.8%
    #[serde(default = "default_spot_band")]
    #[validate(exclusive_minimum = 0.0)]
    #[validate(exclusive_maximum = 1.0)]
    pub spot_band: f64,

    // Relative band applied to meme token prices
    #[serde(default = "default_meme_band")]
    #[validate(exclusive_minimum = 0.0)]
    #[validate(exclusive_maximum = 1.0)]
    pub meme_band: f64,
}

fn default_spot_band() -> f64 {
    0.008
}

fn default_meme_band() -> f64 {
    0.03
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        AdjustmentConfig { spot_band: default_spot_band(), meme_band: default_meme_band() }
    }
}

/// Secrets needed by the block height flow, read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct MemeSecrets {
    pub upshot_api_key: Option<String>,
    pub rpc_url: Option<String>,
}

impl MemeSecrets {
    pub fn from_env() -> Self {
        MemeSecrets::new(env::var(UPSHOT_API_KEY_ENV).ok(), env::var(RPC_URL_ENV).ok())
    }

    // Blank values count as unset
    pub fn new(upshot_api_key: Option<String>, rpc_url: Option<String>) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        MemeSecrets { upshot_api_key: non_blank(upshot_api_key), rpc_url: non_blank(rpc_url) }
    }
}

pub fn get_sample_config() -> Config {
    Config::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/../../config.yaml.example")).unwrap()
}
