use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use config::{MemeSecrets, RPC_URL_ENV, UPSHOT_API_KEY_ENV};

use crate::adjustment::{AdjustmentBand, Jitter};
use crate::meme::{GeckoTerminalClientError, MemeTokenResolver, OracleError, TokenPriceAggregator};
use crate::token_price::{CoingeckoClientError, SpotPriceProvider};

/// What an `/inference/:token` path parameter asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceRequest {
    BlockHeight(u64),
    Token(String),
}

impl InferenceRequest {
    pub fn parse(param: &str) -> Self {
        // Block heights are non-negative, so "-5" is looked up as a symbol
        match param.parse::<u64>() {
            Ok(block_height) => InferenceRequest::BlockHeight(block_height),
            Err(_) => InferenceRequest::Token(param.to_string()),
        }
    }
}

/// Turns an inference request into an adjusted USD price rendered as text.
///
/// Both flows render the shortest representation that round-trips. Rounding to cents would push
/// sub-dollar quotes outside their adjustment band.
#[derive(Debug)]
pub struct InferenceEngine {
    spot_prices: Arc<dyn SpotPriceProvider>,
    meme_resolver: Arc<dyn MemeTokenResolver>,
    token_prices: Arc<dyn TokenPriceAggregator>,
    jitter: Arc<Jitter>,
    secrets: MemeSecrets,
}

impl InferenceEngine {
    pub fn new(
        spot_prices: Arc<dyn SpotPriceProvider>,
        meme_resolver: Arc<dyn MemeTokenResolver>,
        token_prices: Arc<dyn TokenPriceAggregator>,
        jitter: Arc<Jitter>,
        secrets: MemeSecrets,
    ) -> Self {
        InferenceEngine { spot_prices, meme_resolver, token_prices, jitter, secrets }
    }

    pub async fn infer(&self, param: &str) -> Result<String, InferenceError> {
        match InferenceRequest::parse(param) {
            InferenceRequest::BlockHeight(block_height) => self.infer_meme(block_height).await,
            InferenceRequest::Token(token) => self.infer_spot(&token).await,
        }
    }

    async fn infer_spot(&self, token: &str) -> Result<String, InferenceError> {
        let price = self.spot_prices.get_spot_price(token).await?;
        let adjusted = self.jitter.adjust(price, AdjustmentBand::Spot);

        debug!(
            "Adjusted {} price {} to {} ({} band)",
            token,
            price,
            adjusted,
            AdjustmentBand::Spot
        );

        Ok(adjusted.to_string())
    }

    async fn infer_meme(&self, block_height: u64) -> Result<String, InferenceError> {
        let api_key = self.secrets.upshot_api_key.as_deref().ok_or(InferenceError::MissingApiKey)?;
        let rpc_url = self.secrets.rpc_url.as_deref().ok_or(InferenceError::MissingRpcUrl)?;

        info!("Resolving meme token for requested block height {}", block_height);

        let token = self.meme_resolver.resolve_meme_token(rpc_url, api_key).await?;
        let price = self.token_prices.get_token_price(&token.platform, &token.address).await?;
        let adjusted = self.jitter.adjust(price, AdjustmentBand::Meme);

        debug!(
            "Adjusted {} price {} to {} ({} band)",
            token.symbol,
            price,
            adjusted,
            AdjustmentBand::Meme
        );

        Ok(adjusted.to_string())
    }
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{} environment variable not set", UPSHOT_API_KEY_ENV)]
    MissingApiKey,

    #[error("{} environment variable not set", RPC_URL_ENV)]
    MissingRpcUrl,

    #[error(transparent)]
    SpotPrice(#[from] CoingeckoClientError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    TokenPrice(#[from] GeckoTerminalClientError),
}

impl InferenceError {
    /// Errors caused by how the service was set up for the caller rather than by an upstream.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, InferenceError::MissingApiKey)
    }
}
