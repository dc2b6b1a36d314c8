use async_trait::async_trait;
use log::{error, info};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::meme::{MemeToken, MemeTokenResolver};

const API_KEY_HEADER: &str = "x-api-key";

/// Resolves meme tokens through a chain RPC `/status` endpoint and the Upshot tokens oracle.
#[derive(Debug)]
pub struct UpshotOracleClient {
    base_url: String,
    client: reqwest::Client,
}

impl UpshotOracleClient {
    pub fn new(base_url: &str) -> Self {
        UpshotOracleClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn latest_block_height(&self, rpc_url: &str) -> Result<String, OracleError> {
        let url = format!("{}/status", rpc_url.trim_end_matches('/'));
        info!("Fetching latest block height from {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            error!("RPC /status Request failed with status: {}", response.status());
            return Err(OracleError::RequestFailed("rpc status", response.status()));
        }

        let raw_text = response.text().await?;
        let status: StatusResponse = serde_json::from_str(&raw_text)
            .map_err(|err| OracleError::DeserialisationError(raw_text, err))?;

        Ok(status.result.sync_info.latest_block_height)
    }

    pub async fn token_at_height(
        &self,
        block_height: &str,
        api_key: &str,
    ) -> Result<MemeToken, OracleError> {
        info!("Fetching meme token for block height {}", block_height);

        let response = self
            .client
            .get(format!("{}/tokens-oracle/token/{}", self.base_url, block_height))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            error!("Upshot tokens-oracle Request failed with status: {}", response.status());
            return Err(OracleError::RequestFailed("tokens oracle", response.status()));
        }

        let raw_text = response.text().await?;
        let oracle_response: OracleResponse = serde_json::from_str(&raw_text)
            .map_err(|err| OracleError::DeserialisationError(raw_text, err))?;

        let token = oracle_response
            .data
            .ok_or_else(|| OracleError::TokenNotFound(block_height.to_string()))?;

        info!(
            "Block height {} resolved to token {} ({} on {})",
            block_height, token.symbol, token.address, token.platform
        );

        Ok(token)
    }
}

#[async_trait]
impl MemeTokenResolver for UpshotOracleClient {
    async fn resolve_meme_token(
        &self,
        rpc_url: &str,
        api_key: &str,
    ) -> Result<MemeToken, OracleError> {
        let block_height = self.latest_block_height(rpc_url).await?;
        self.token_at_height(&block_height, api_key).await
    }
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no token found for block height {0}")]
    TokenNotFound(String),

    #[error("Deserialization Error - Original String {0}, Error {1}")]
    DeserialisationError(String, serde_json::Error),

    #[error("{} request failed with status code {}", .0, .1.as_u16())]
    RequestFailed(&'static str, StatusCode),

    #[error("{0}")]
    ApiCallError(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    result: StatusResult,
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    sync_info: SyncInfo,
}

#[derive(Debug, Deserialize)]
struct SyncInfo {
    latest_block_height: String,
}

#[derive(Debug, Deserialize)]
struct OracleResponse {
    data: Option<MemeToken>,
}
