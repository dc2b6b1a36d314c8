pub use adjustment::{AdjustmentBand, Jitter};
pub use engine::{InferenceEngine, InferenceError, InferenceRequest};
pub use meme::{GeckoTerminalClient, MemeToken, UpshotOracleClient};
pub use token_price::{CoingeckoClient, RandomCredentialPool};

pub mod adjustment;
pub mod engine;
pub mod meme;
pub mod token_price;

#[cfg(test)]
mod tests;
