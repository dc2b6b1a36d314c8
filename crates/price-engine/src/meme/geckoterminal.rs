use std::collections::HashMap;

use async_trait::async_trait;
use log::{error, info};
use reqwest::{header, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::meme::TokenPriceAggregator;
use crate::token_price::utils::RawPrice;

#[derive(Debug)]
pub struct GeckoTerminalClient {
    base_url: String,
    client: reqwest::Client,
}

impl GeckoTerminalClient {
    pub fn new(base_url: &str) -> Self {
        GeckoTerminalClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TokenPriceAggregator for GeckoTerminalClient {
    async fn get_token_price(
        &self,
        network: &str,
        address: &str,
    ) -> Result<f64, GeckoTerminalClientError> {
        info!("Fetching token price for {} on {}", address, network);

        let response = self
            .client
            .get(format!("{}/simple/networks/{}/token_price/{}", self.base_url, network, address))
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            error!("GeckoTerminal token_price Request failed with status: {}", response.status());
            return Err(GeckoTerminalClientError::RequestFailed(response.status()));
        }

        let raw_text = response.text().await?;
        let response: TokenPriceResponse = serde_json::from_str(&raw_text)
            .map_err(|err| GeckoTerminalClientError::DeserialisationError(raw_text.clone(), err))?;

        let token_prices = response.data.attributes.token_prices;

        // Addresses are echoed back in the provider's own casing
        let price = token_prices
            .get(address)
            .or_else(|| {
                token_prices
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(address))
                    .map(|(_, price)| price)
            })
            .and_then(|price| price.as_ref())
            .ok_or_else(|| GeckoTerminalClientError::PriceNotFound(address.to_string()))?;

        let price = price
            .as_f64()
            .ok_or_else(|| GeckoTerminalClientError::InvalidPrice(address.to_string(), raw_text))?;

        info!("Token price fetched for {} on {}: {}", address, network, price);

        Ok(price)
    }
}

#[derive(Debug, Error)]
pub enum GeckoTerminalClientError {
    #[error("price not found for address {0}")]
    PriceNotFound(String),

    #[error("invalid price for address {0} in response {1}")]
    InvalidPrice(String, String),

    #[error("Deserialization Error - Original String {0}, Error {1}")]
    DeserialisationError(String, serde_json::Error),

    #[error("status code {}", .0.as_u16())]
    RequestFailed(StatusCode),

    #[error("{0}")]
    ApiCallError(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct TokenPriceResponse {
    data: TokenPriceData,
}

#[derive(Debug, Deserialize)]
struct TokenPriceData {
    attributes: TokenPriceAttributes,
}

#[derive(Debug, Deserialize)]
struct TokenPriceAttributes {
    token_prices: HashMap<String, Option<RawPrice>>,
}
