use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use reqwest::{header, StatusCode};
use thiserror::Error;

use crate::token_price::utils::{round_to_cents, RawPrice};
use crate::token_price::{provider_id, CredentialPool, SpotPriceProvider};

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

#[derive(Debug)]
pub struct CoingeckoClient {
    base_url: String,
    client: reqwest::Client,
    credentials: Arc<dyn CredentialPool>,
}

impl CoingeckoClient {
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialPool>) -> CoingeckoClient {
        CoingeckoClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            credentials,
        }
    }

    async fn get_simple_price(&self, token_id: &str) -> Result<f64, CoingeckoClientError> {
        info!("Fetching spot price for {}", token_id);

        let response = self
            .client
            .get(format!("{}/simple/price", self.base_url))
            .query(&[("ids", token_id), ("vs_currencies", "usd")])
            .header(header::ACCEPT, "application/json")
            .header(API_KEY_HEADER, self.credentials.next_credential())
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            error!("CoinGecko /simple/price Request failed with status: {}", response.status());
            return Err(CoingeckoClientError::RequestFailed(response.status()));
        }

        let raw_text = response.text().await?;

        let prices: HashMap<String, HashMap<String, RawPrice>> = serde_json::from_str(&raw_text)
            .map_err(|err| CoingeckoClientError::DeserialisationError(raw_text.clone(), err))?;

        let price = prices
            .get(token_id)
            .and_then(|quote| quote.get("usd"))
            .ok_or_else(|| CoingeckoClientError::PriceNotFound(token_id.to_string()))?;

        let price = price
            .as_f64()
            .ok_or_else(|| CoingeckoClientError::InvalidPrice(token_id.to_string(), raw_text))?;

        info!("Spot price fetched for token {}: {}", token_id, price);

        Ok(round_to_cents(price))
    }
}

#[async_trait]
impl SpotPriceProvider for CoingeckoClient {
    async fn get_spot_price(&self, token_symbol: &str) -> Result<f64, CoingeckoClientError> {
        let token_id = provider_id(token_symbol);
        self.get_simple_price(&token_id).await
    }
}

#[derive(Debug, Error)]
pub enum CoingeckoClientError {
    #[error("price not found for token {0}")]
    PriceNotFound(String),

    #[error("invalid price for token {0} in response {1}")]
    InvalidPrice(String, String),

    #[error("Deserialization Error - Original String {0}, Error {1}")]
    DeserialisationError(String, serde_json::Error),

    #[error("status code {}", .0.as_u16())]
    RequestFailed(StatusCode),

    #[error("{0}")]
    ApiCallError(#[from] reqwest::Error),
}
