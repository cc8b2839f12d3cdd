//! Statistics over a price history.

use crate::models::history::HistorySeries;
use crate::models::summary::{title_case, SummaryRow};

/// Max, min, mean and start-to-end change of `series`; `None` for an empty series.
///
/// The change compares the first and last points in upstream (chronological)
/// order. It is left empty when the first price is zero.
pub fn summarize(coin_id: &str, series: &HistorySeries) -> Option<SummaryRow> {
    let first = series.first()?.price;
    let last = series.last()?.price;

    let mut max_price = first;
    let mut min_price = first;
    let mut total = 0.0;

    for price in series.prices() {
        max_price = max_price.max(price);
        min_price = min_price.min(price);
        total += price;
    }

    Some(SummaryRow {
        coin: title_case(coin_id),
        max_price,
        min_price,
        avg_price: total / series.len() as f64,
        change_percent: percent_change(first, last),
    })
}

pub fn percent_change(first: f64, last: f64) -> Option<f64> {
    if first == 0.0 {
        return None;
    }

    Some((last - first) / first * 100.0)
}
