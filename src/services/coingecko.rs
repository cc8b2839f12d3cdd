use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::FetchError;
use crate::models::history::{HistorySeries, PricePoint};
use crate::models::price::PriceSnapshot;
use crate::models::selection::{Currency, Days};
use crate::services::cache::{CacheSettings, Clock, TtlCache};
use crate::services::transport::{Transport, UpstreamResponse};

const STATUS_OK: u16 = 200;
const STATUS_TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PriceKey {
    coin_id: String,
    currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HistoryKey {
    coin_id: String,
    currency: Currency,
    days: Days,
}

#[derive(Clone)]
pub struct CoinGeckoService {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    prices: TtlCache<PriceKey, PriceSnapshot>,
    history: TtlCache<HistoryKey, HistorySeries>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(i64, f64)>,
}

impl CoinGeckoService {
    pub fn new(transport: Arc<dyn Transport>, cache: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            prices: TtlCache::new(cache, clock.clone()),
            history: TtlCache::new(cache, clock.clone()),
            clock,
        }
    }

    /// Current price, market cap and 24h change for one coin.
    pub async fn fetch_price(
        &self,
        coin_id: &str,
        currency: Currency,
    ) -> Result<PriceSnapshot, FetchError> {
        let key = PriceKey {
            coin_id: coin_id.to_string(),
            currency,
        };

        self.prices
            .get_or_try_insert(key, move || self.request_price(coin_id, currency))
            .await
    }

    /// Seconds left before the cached price for this coin expires
    pub async fn price_expires_in_secs(&self, coin_id: &str, currency: Currency) -> Option<i64> {
        let key = PriceKey {
            coin_id: coin_id.to_string(),
            currency,
        };

        self.prices.expires_in_secs(&key).await
    }

    /// Price history over the last `days` days, oldest first.
    pub async fn fetch_history(
        &self,
        coin_id: &str,
        currency: Currency,
        days: Days,
    ) -> Result<HistorySeries, FetchError> {
        let key = HistoryKey {
            coin_id: coin_id.to_string(),
            currency,
            days,
        };

        self.history
            .get_or_try_insert(key, move || self.request_history(coin_id, currency, days))
            .await
    }

    async fn request_price(
        &self,
        coin_id: &str,
        currency: Currency,
    ) -> Result<PriceSnapshot, FetchError> {
        tracing::info!("Fetching current {} price for {} from CoinGecko", currency, coin_id);

        let response = self
            .transport
            .get(
                "/simple/price",
                &[
                    ("ids", coin_id.to_string()),
                    ("vs_currencies", currency.to_string()),
                    ("include_market_cap", "true".to_string()),
                    ("include_24hr_change", "true".to_string()),
                ],
            )
            .await?;

        let body = expect_ok(response, coin_id)?;

        let payload: Map<String, Value> = serde_json::from_str(&body)
            .map_err(|e| FetchError::Malformed(format!("simple price body: {}", e)))?;

        PriceSnapshot::from_payload(coin_id, currency, payload, self.clock.now())
    }

    async fn request_history(
        &self,
        coin_id: &str,
        currency: Currency,
        days: Days,
    ) -> Result<HistorySeries, FetchError> {
        tracing::info!("Fetching {}-day market chart for {} from CoinGecko", days, coin_id);

        let url = format!("/coins/{}/market_chart", coin_id);

        let response = self
            .transport
            .get(
                &url,
                &[
                    ("vs_currency", currency.to_string()),
                    ("days", days.to_string()),
                ],
            )
            .await?;

        let body = expect_ok(response, coin_id)?;

        let data: MarketChartResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::Malformed(format!("market chart body: {}", e)))?;

        let points = data
            .prices
            .into_iter()
            .map(|(timestamp_ms, price)| {
                DateTime::from_timestamp_millis(timestamp_ms)
                    .map(|date| PricePoint { date, price })
                    .ok_or_else(|| {
                        FetchError::Malformed(format!("timestamp out of range: {}", timestamp_ms))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(last) = points.last() {
            tracing::debug!(
                "Fetched {} prices for {}, last: {} @ {}",
                points.len(),
                coin_id,
                last.price,
                last.date.format("%Y-%m-%d %H:%M:%S")
            );
        }

        Ok(HistorySeries::new(points))
    }
}

fn expect_ok(response: UpstreamResponse, coin_id: &str) -> Result<String, FetchError> {
    match response.status {
        STATUS_OK => Ok(response.body),
        STATUS_TOO_MANY_REQUESTS => {
            tracing::warn!("CoinGecko rate limit hit while fetching {}", coin_id);
            Err(FetchError::RateLimited)
        }
        status => {
            tracing::error!("CoinGecko API error {} for {}: {}", status, coin_id, response.body);
            Err(FetchError::Upstream {
                status,
                body: response.body,
            })
        }
    }
}
