use serde::Deserialize;

/// Upstream APIs quote prices either as JSON numbers or as decimal strings.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    pub fn as_f64(&self) -> Option<f64> {
        let price = match self {
            RawPrice::Number(n) => *n,
            RawPrice::Text(s) => s.trim().parse().ok()?,
        };
        price.is_finite().then_some(price)
    }
}

pub fn round_to_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}
