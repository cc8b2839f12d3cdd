use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::models::history::PricePoint;
use crate::models::price::{PriceSnapshot, PriceTile};
use crate::models::selection::{Currency, Days, Selection};
use crate::models::summary::SummaryRow;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const PRICE_UNAVAILABLE_MESSAGE: &str = "Unable to fetch current price.";
pub const NO_HISTORY_MESSAGE: &str = "No historical price data available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// User-visible message attached to a degraded result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Notice for a failed fetch of `what` ("current price", "historical data").
    pub fn for_fetch_error(err: &FetchError, what: &str) -> Option<Self> {
        let level = err.notice_level()?;

        let message = match err {
            FetchError::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
            FetchError::Upstream { status, .. } => format!("Error fetching {}: {}", what, status),
            FetchError::Transport(reason) => format!("Error fetching {}: {}", what, reason),
            FetchError::Malformed(_) => return None,
        };

        Some(Self { level, message })
    }
}

/// Notices collected while building a view, without repeats
#[derive(Debug, Clone, Default)]
pub struct Notices(Vec<Notice>);

impl Notices {
    pub fn push(&mut self, notice: Notice) {
        if !self.0.contains(&notice) {
            self.0.push(notice);
        }
    }

    pub fn record(&mut self, err: &FetchError, what: &str) {
        if let Some(notice) = Notice::for_fetch_error(err, what) {
            self.push(notice);
        }
    }

    pub fn into_vec(self) -> Vec<Notice> {
        self.0
    }
}

/// One line of the history chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub coin: String,
    pub points: Vec<PricePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    pub tile: Option<PriceTile>,
    pub snapshot: Option<PriceSnapshot>,
    pub chart: Vec<ChartSeries>,
    pub summary: Vec<SummaryRow>,
    pub notices: Vec<Notice>,
    pub built_at: DateTime<Utc>,
}

/// Query parameters for GET /api/price
#[derive(Debug, Clone, Deserialize)]
pub struct PriceQuery {
    pub coin: Option<String>,
    pub currency: Option<String>,
}

/// Query parameters for GET /api/history and GET /api/summary
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionQuery {
    pub coins: Option<String>,     // Comma-separated: "bitcoin,ethereum"
    pub currency: Option<String>,  // Default from config
    pub days: Option<String>,      // 1-30, validated by the handler
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceResponse {
    pub tile: Option<PriceTile>,
    pub snapshot: Option<PriceSnapshot>,
    pub cache_expires_in_secs: Option<i64>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub currency: Currency,
    pub days: Days,
    pub series: Vec<ChartSeries>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub rows: Vec<SummaryRow>,
    pub notices: Vec<Notice>,
}

/// Choices offered to the user
#[derive(Debug, Clone, Serialize)]
pub struct OptionsResponse {
    pub coins: Vec<&'static str>,
    pub currencies: Vec<Currency>,
    pub min_days: u32,
    pub max_days: u32,
    pub refresh_intervals: Vec<u64>,
    pub defaults: Selection,
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
