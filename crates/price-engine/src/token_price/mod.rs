use std::fmt::Debug;

use async_trait::async_trait;

pub use coingecko::{CoingeckoClient, CoingeckoClientError};
pub use credentials::{CredentialPool, FixedCredential, RandomCredentialPool};

mod coingecko;
mod credentials;
pub mod utils;

/// Symbols the price API knows under a different identifier.
pub const KNOWN_PROVIDER_IDS: [(&str, &str); 5] = [
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("BTC", "bitcoin"),
    ("BNB", "binancecoin"),
    ("ARB", "arbitrum"),
];

/// Maps a token symbol to the identifier expected by the price API.
///
/// The lookup is case-insensitive. Unknown symbols are passed through lowercased without
/// validation, so a bogus symbol surfaces later as a "price not found" error.
pub fn provider_id(token_symbol: &str) -> String {
    let token_symbol = token_symbol.to_uppercase();
    KNOWN_PROVIDER_IDS
        .iter()
        .find(|(symbol, _)| *symbol == token_symbol)
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| token_symbol.to_lowercase())
}

#[async_trait]
pub trait SpotPriceProvider: Debug + Send + Sync {
    /// USD spot price of `token_symbol`, rounded to cents.
    async fn get_spot_price(&self, token_symbol: &str) -> Result<f64, CoingeckoClientError>;
}
