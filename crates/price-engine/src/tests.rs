use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use reqwest::StatusCode;

use config::{AdjustmentConfig, MemeSecrets};

use crate::adjustment::Jitter;
use crate::engine::{InferenceEngine, InferenceError};
use crate::meme::{
    GeckoTerminalClientError, MemeToken, MemeTokenResolver, OracleError, TokenPriceAggregator,
};
use crate::token_price::{CoingeckoClientError, SpotPriceProvider};

mock! {
    pub SpotPrices {}

    #[async_trait]
    impl SpotPriceProvider for SpotPrices {
        async fn get_spot_price(&self, token_symbol: &str) -> Result<f64, CoingeckoClientError>;
    }
}

mock! {
    pub MemeResolver {}

    #[async_trait]
    impl MemeTokenResolver for MemeResolver {
        async fn resolve_meme_token(&self, rpc_url: &str, api_key: &str) -> Result<MemeToken, OracleError>;
    }
}

mock! {
    pub TokenPrices {}

    #[async_trait]
    impl TokenPriceAggregator for TokenPrices {
        async fn get_token_price(&self, network: &str, address: &str) -> Result<f64, GeckoTerminalClientError>;
    }
}

impl Debug for MockSpotPrices {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("MockSpotPrices")
    }
}

impl Debug for MockMemeResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("MockMemeResolver")
    }
}

impl Debug for MockTokenPrices {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("MockTokenPrices")
    }
}

const DOGE_ADDRESS: &str = "0xabc0000000000000000000000000000000000001";

fn doge() -> MemeToken {
    MemeToken {
        token_id: "dogecoin".to_string(),
        name: "Dogecoin".to_string(),
        symbol: "DOGE".to_string(),
        platform: "base".to_string(),
        address: DOGE_ADDRESS.to_string(),
    }
}

fn secrets() -> MemeSecrets {
    MemeSecrets::new(Some("upshot-key".to_string()), Some("http://rpc.local".to_string()))
}

fn engine(
    spot_prices: MockSpotPrices,
    meme_resolver: MockMemeResolver,
    token_prices: MockTokenPrices,
    secrets: MemeSecrets,
) -> InferenceEngine {
    seeded_engine(11, spot_prices, meme_resolver, token_prices, secrets)
}

fn seeded_engine(
    seed: u64,
    spot_prices: MockSpotPrices,
    meme_resolver: MockMemeResolver,
    token_prices: MockTokenPrices,
    secrets: MemeSecrets,
) -> InferenceEngine {
    InferenceEngine::new(
        Arc::new(spot_prices),
        Arc::new(meme_resolver),
        Arc::new(token_prices),
        Arc::new(Jitter::seeded(seed, &AdjustmentConfig::default())),
        secrets,
    )
}

#[tokio::test]
async fn test_symbol_uses_spot_price_and_never_the_oracle() {
    let mut spot_prices = MockSpotPrices::new();
    let mut meme_resolver = MockMemeResolver::new();
    let mut token_prices = MockTokenPrices::new();

    spot_prices
        .expect_get_spot_price()
        .withf(|token_symbol| token_symbol == "eth")
        .times(1)
        .returning(|_| Ok(3000.0));
    meme_resolver.expect_resolve_meme_token().never();
    token_prices.expect_get_token_price().never();

    let engine = engine(spot_prices, meme_resolver, token_prices, secrets());
    let price: f64 = engine.infer("eth").await.unwrap().parse().unwrap();

    assert!((2976.0..=3024.0).contains(&price), "{} out of band", price);
}

#[tokio::test]
async fn test_sub_dollar_spot_price_stays_within_band() {
    for seed in 0..200 {
        let mut spot_prices = MockSpotPrices::new();
        spot_prices.expect_get_spot_price().returning(|_| Ok(0.80));

        let engine = seeded_engine(
            seed,
            spot_prices,
            MockMemeResolver::new(),
            MockTokenPrices::new(),
            secrets(),
        );
        let price: f64 = engine.infer("ARB").await.unwrap().parse().unwrap();

        let deviation = (price - 0.80).abs() / 0.80;
        assert!(deviation <= 0.008 + 1e-12, "seed {}: {} deviates by {}", seed, price, deviation);
    }
}

#[tokio::test]
async fn test_block_height_resolves_token_before_pricing() {
    let mut spot_prices = MockSpotPrices::new();
    let mut meme_resolver = MockMemeResolver::new();
    let mut token_prices = MockTokenPrices::new();
    let mut sequence = mockall::Sequence::new();

    spot_prices.expect_get_spot_price().never();
    meme_resolver
        .expect_resolve_meme_token()
        .withf(|rpc_url, api_key| rpc_url == "http://rpc.local" && api_key == "upshot-key")
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(doge()));
    token_prices
        .expect_get_token_price()
        .withf(|network, address| network == "base" && address == DOGE_ADDRESS)
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(0.005));

    let engine = engine(spot_prices, meme_resolver, token_prices, secrets());
    let price: f64 = engine.infer("12345").await.unwrap().parse().unwrap();

    assert!((0.00485..=0.00515).contains(&price), "{} out of band", price);
}

#[tokio::test]
async fn test_missing_api_key_short_circuits_block_height_flow() {
    let mut meme_resolver = MockMemeResolver::new();
    let mut token_prices = MockTokenPrices::new();
    meme_resolver.expect_resolve_meme_token().never();
    token_prices.expect_get_token_price().never();

    let engine = engine(
        MockSpotPrices::new(),
        meme_resolver,
        token_prices,
        MemeSecrets::new(None, Some("http://rpc.local".to_string())),
    );
    let err = engine.infer("12345").await.unwrap_err();

    assert!(matches!(err, InferenceError::MissingApiKey));
    assert!(err.is_bad_request());
}

#[tokio::test]
async fn test_missing_rpc_url_is_a_server_error() {
    let mut meme_resolver = MockMemeResolver::new();
    meme_resolver.expect_resolve_meme_token().never();

    let engine = engine(
        MockSpotPrices::new(),
        meme_resolver,
        MockTokenPrices::new(),
        MemeSecrets::new(Some("upshot-key".to_string()), None),
    );
    let err = engine.infer("1").await.unwrap_err();

    assert!(matches!(err, InferenceError::MissingRpcUrl));
    assert!(!err.is_bad_request());
    assert_eq!(err.to_string(), "RPC environment variable not set");
}

#[tokio::test]
async fn test_spot_price_errors_pass_through() {
    let mut spot_prices = MockSpotPrices::new();
    spot_prices
        .expect_get_spot_price()
        .returning(|_| Err(CoingeckoClientError::PriceNotFound("xyz".to_string())));

    let engine = engine(spot_prices, MockMemeResolver::new(), MockTokenPrices::new(), secrets());
    let err = engine.infer("XYZ").await.unwrap_err();

    assert_eq!(err.to_string(), "price not found for token xyz");
}

#[tokio::test]
async fn test_oracle_errors_stop_the_block_height_flow() {
    let mut meme_resolver = MockMemeResolver::new();
    let mut token_prices = MockTokenPrices::new();
    meme_resolver
        .expect_resolve_meme_token()
        .returning(|_, _| Err(OracleError::RequestFailed("rpc status", StatusCode::BAD_GATEWAY)));
    token_prices.expect_get_token_price().never();

    let engine = engine(MockSpotPrices::new(), meme_resolver, token_prices, secrets());
    let err = engine.infer("42").await.unwrap_err();

    assert_eq!(err.to_string(), "rpc status request failed with status code 502");
}
