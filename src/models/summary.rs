use serde::Serialize;

/// One row of the statistical summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub coin: String,
    pub max_price: f64,
    pub min_price: f64,
    pub avg_price: f64,
    /// None when the first price is zero
    pub change_percent: Option<f64>,
}

/// "bitcoin" -> "Bitcoin", "usd-coin" -> "Usd-Coin"
pub fn title_case(coin_id: &str) -> String {
    let mut out = String::with_capacity(coin_id.len());
    let mut at_word_start = true;

    for c in coin_id.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}
