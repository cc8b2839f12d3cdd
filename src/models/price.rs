use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::models::selection::Currency;
use crate::models::summary::title_case;

/// Point-in-time reading from /simple/price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub coin_id: String,
    pub currency: Currency,
    pub price: f64,
    pub market_cap: Option<f64>,
    pub change_24h: Option<f64>,
    pub fetched_at: DateTime<Utc>,
    /// Upstream body as returned, e.g. {"bitcoin": {"usd": 1.0, "usd_market_cap": 2.0}}
    pub payload: Map<String, Value>,
}

impl PriceSnapshot {
    /// Read the typed fields for `coin_id`/`currency` out of a /simple/price body.
    ///
    /// CoinGecko answers unknown ids with `{}`, so a missing entry is treated as a
    /// malformed (empty) response rather than an upstream failure.
    pub fn from_payload(
        coin_id: &str,
        currency: Currency,
        payload: Map<String, Value>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, FetchError> {
        let fields = payload
            .get(coin_id)
            .and_then(Value::as_object)
            .ok_or_else(|| FetchError::Malformed(format!("no price entry for '{}'", coin_id)))?;

        let price = fields
            .get(currency.as_str())
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                FetchError::Malformed(format!("no {} price for '{}'", currency, coin_id))
            })?;

        let market_cap = fields
            .get(&currency.market_cap_field())
            .and_then(Value::as_f64);
        let change_24h = fields
            .get(&currency.change_24h_field())
            .and_then(Value::as_f64);

        Ok(Self {
            coin_id: coin_id.to_string(),
            currency,
            price,
            market_cap,
            change_24h,
            fetched_at,
            payload,
        })
    }
}

/// Display form of a snapshot for the price tile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTile {
    pub title: String,
    pub price: String,
    pub market_cap: String,
    pub change_24h: String,
}

impl From<&PriceSnapshot> for PriceTile {
    fn from(snapshot: &PriceSnapshot) -> Self {
        Self {
            title: format!(
                "Current {} Price ({})",
                title_case(&snapshot.coin_id),
                snapshot.currency.as_str().to_uppercase()
            ),
            price: format_amount(snapshot.price),
            market_cap: snapshot
                .market_cap
                .map(format_amount)
                .unwrap_or_else(|| "N/A".to_string()),
            change_24h: snapshot
                .change_24h
                .map(|change| format!("{:.2}%", change))
                .unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

/// Two decimals with thousands separators: 67123.456 -> "67,123.46"
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}
