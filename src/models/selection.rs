use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Coins offered in the selection menu
pub const SUPPORTED_COINS: [&str; 4] = ["bitcoin", "ethereum", "cardano", "dogecoin"];

/// Auto-refresh choices in seconds (0 = off)
pub const REFRESH_INTERVALS: [u64; 4] = [0, 10, 30, 60];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Unsupported currency '{0}' (expected one of usd, eur, cad, gbp)")]
    UnsupportedCurrency(String),

    #[error("Days must be between 1 and 30, got {0}")]
    DaysOutOfRange(u32),

    #[error("Days must be a whole number, got '{0}'")]
    InvalidDays(String),

    #[error("Invalid coin id '{0}'")]
    InvalidCoinId(String),

    #[error("At least one coin must be selected")]
    NoCoins,

    #[error("Unsupported refresh interval {0}s (expected 0, 10, 30 or 60)")]
    UnsupportedRefreshInterval(u64),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Cad,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Cad, Currency::Gbp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Cad => "cad",
            Currency::Gbp => "gbp",
        }
    }

    /// Key of the market cap field in a /simple/price entry
    pub fn market_cap_field(&self) -> String {
        format!("{}_market_cap", self.as_str())
    }

    /// Key of the 24h change field in a /simple/price entry
    pub fn change_24h_field(&self) -> String {
        format!("{}_24h_change", self.as_str())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "eur" => Ok(Currency::Eur),
            "cad" => Ok(Currency::Cad),
            "gbp" => Ok(Currency::Gbp),
            _ => Err(SelectionError::UnsupportedCurrency(s.to_string())),
        }
    }
}

/// Length of the history window, 1 to 30 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Days(u32);

impl Days {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 30;

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Days {
    fn default() -> Self {
        Days(7)
    }
}

impl TryFrom<u32> for Days {
    type Error = SelectionError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&days) {
            Ok(Days(days))
        } else {
            Err(SelectionError::DaysOutOfRange(days))
        }
    }
}

impl FromStr for Days {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days: u32 = s
            .trim()
            .parse()
            .map_err(|_| SelectionError::InvalidDays(s.to_string()))?;
        Days::try_from(days)
    }
}

impl fmt::Display for Days {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coins, currency and window the dashboard is built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub coins: Vec<String>,
    pub currency: Currency,
    pub days: Days,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            coins: vec!["bitcoin".to_string()],
            currency: Currency::default(),
            days: Days::default(),
        }
    }
}

impl Selection {
    /// Apply optional overrides (typically query parameters) on top of `defaults`.
    pub fn with_overrides(
        defaults: &Selection,
        coins: Option<&str>,
        currency: Option<&str>,
        days: Option<&str>,
    ) -> Result<Selection, SelectionError> {
        let coins = match coins {
            Some(raw) => parse_coin_list(raw)?,
            None => defaults.coins.clone(),
        };

        let currency = match currency {
            Some(raw) => raw.parse()?,
            None => defaults.currency,
        };

        let days = match days {
            Some(raw) => raw.parse()?,
            None => defaults.days,
        };

        Ok(Selection {
            coins,
            currency,
            days,
        })
    }

    /// Coin shown in the price tile
    pub fn primary_coin(&self) -> Option<&str> {
        self.coins.first().map(String::as_str)
    }
}

/// Parse a comma-separated coin list, e.g. "bitcoin, ethereum".
///
/// Ids are lowercased and de-duplicated keeping first occurrence order.
pub fn parse_coin_list(raw: &str) -> Result<Vec<String>, SelectionError> {
    let mut coins: Vec<String> = Vec::new();

    for coin in raw
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
    {
        validate_coin_id(&coin)?;
        if !coins.contains(&coin) {
            coins.push(coin);
        }
    }

    if coins.is_empty() {
        return Err(SelectionError::NoCoins);
    }

    Ok(coins)
}

/// CoinGecko ids are lowercase ascii alphanumerics and dashes; anything else
/// would leak into the request path.
pub fn validate_coin_id(coin: &str) -> Result<(), SelectionError> {
    let valid = !coin.is_empty()
        && coin
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(SelectionError::InvalidCoinId(coin.to_string()))
    }
}

pub fn validate_refresh_interval(secs: u64) -> Result<u64, SelectionError> {
    if REFRESH_INTERVALS.contains(&secs) {
        Ok(secs)
    } else {
        Err(SelectionError::UnsupportedRefreshInterval(secs))
    }
}
