use std::fmt::Debug;

use async_trait::async_trait;
use serde::Deserialize;

pub use geckoterminal::{GeckoTerminalClient, GeckoTerminalClientError};
pub use oracle::{OracleError, UpshotOracleClient};

mod geckoterminal;
mod oracle;

/// Token the oracle associates with a block height.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemeToken {
    pub token_id: String,
    #[serde(default)]
    pub name: String,
    pub symbol: String,
    // Network the token lives on, e.g. "base" or "eth"
    pub platform: String,
    // Contract address on `platform`
    pub address: String,
}

#[async_trait]
pub trait MemeTokenResolver: Debug + Send + Sync {
    /// Reads the latest block height from `rpc_url` and asks the oracle which token it selects.
    async fn resolve_meme_token(
        &self,
        rpc_url: &str,
        api_key: &str,
    ) -> Result<MemeToken, OracleError>;
}

#[async_trait]
pub trait TokenPriceAggregator: Debug + Send + Sync {
    /// USD price of the token at `address` on `network`.
    async fn get_token_price(
        &self,
        network: &str,
        address: &str,
    ) -> Result<f64, GeckoTerminalClientError>;
}
