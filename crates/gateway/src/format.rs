//! Turns raw upstream payloads into the two parallel facets of a chat
//! response: a one-sentence `answer` and a structured `data` value. Field
//! lookups go through `mdgate_upstream::alias` so provider field-naming
//! drift never leaks into a formatter as a scattered `.get("price").or(...)`.

use mdgate_upstream::alias;
use serde_json::{json, Value};

pub const STALE_WARNING: &str = "[Note: showing cached data, the live service is temporarily unavailable] ";

pub fn format_price(symbol: &str, data: &Value) -> (String, Value) {
    let price = alias::first_f64(data, alias::PRICE_KEYS);
    let answer = match price {
        Some(p) => format!("{symbol} is currently trading at {p:.2}."),
        None => format!("I couldn't determine the current price for {symbol}."),
    };
    (answer, json!({ "symbol": symbol, "price": price }))
}

pub fn format_quote(symbol: &str, data: &Value) -> (String, Value) {
    let price = alias::first_f64(data, alias::PRICE_KEYS);
    let change_percent = alias::first_f64(data, alias::CHANGE_PERCENT_KEYS);
    let high = alias::first_f64(data, alias::FIFTY_TWO_WEEK_HIGH_KEYS);
    let low = alias::first_f64(data, alias::FIFTY_TWO_WEEK_LOW_KEYS);
    let answer = match (price, change_percent) {
        (Some(p), Some(c)) => format!("{symbol} is at {p:.2} ({c:+.2}%)."),
        (Some(p), None) => format!("{symbol} is at {p:.2}."),
        _ => format!("I couldn't retrieve a detailed quote for {symbol}."),
    };
    (
        answer,
        json!({
            "symbol": symbol,
            "price": price,
            "change_percent": change_percent,
            "fifty_two_week_high": high,
            "fifty_two_week_low": low,
        }),
    )
}

pub fn format_historical(symbol: &str, interval: &str, data: &Value) -> (String, Value) {
    let series = alias::capped_series(data, alias::SERIES_KEYS);
    let answer = format!(
        "Here's the {interval} historical data for {symbol} ({} points).",
        series.len()
    );
    (answer, json!({ "symbol": symbol, "interval": interval, "values": series }))
}

pub fn format_indicator(symbol: &str, indicator: &str, data: &Value) -> (String, Value) {
    let series = alias::capped_series(data, alias::SERIES_KEYS);
    let answer = format!(
        "Here's the {} for {symbol} ({} points).",
        indicator.to_uppercase(),
        series.len()
    );
    (
        answer,
        json!({ "symbol": symbol, "indicator": indicator, "values": series }),
    )
}

pub fn format_conversion(from: &str, to: &str, amount: f64, data: &Value) -> (String, Value) {
    let rate = alias::first_f64(data, alias::RATE_KEYS);
    let result = alias::first_f64(data, alias::RESULT_KEYS);
    let answer = match result {
        Some(r) => format!("{amount} {from} is {r:.2} {to}."),
        None => format!("I couldn't convert {amount} {from} to {to}."),
    };
    (
        answer,
        json!({ "from": from, "to": to, "amount": amount, "rate": rate, "result": result }),
    )
}

pub fn format_commodities_list(data: &Value) -> (String, Value) {
    let list = alias::first_array(data, &["commodities", "values", "data"]);
    let answer = format!("There are {} commodities available.", list.len());
    (answer, json!({ "commodities": list }))
}

pub fn prefix_stale(answer: String) -> String {
    format!("{STALE_WARNING}{answer}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_price_reads_close_alias() {
        let data = json!({ "close": 1950.5 });
        let (answer, data) = format_price("XAU/USD", &data);
        assert!(answer.contains("1950.50"));
        assert_eq!(data["price"], 1950.5);
    }

    #[test]
    fn format_conversion_reports_result_and_rate() {
        let data = json!({ "rate": 0.92, "amount": 92.0 });
        let (answer, data) = format_conversion("USD", "EUR", 100.0, &data);
        assert!(answer.contains("92.00 EUR"));
        assert_eq!(data["rate"], 0.92);
    }

    #[test]
    fn stale_prefix_is_prepended() {
        let prefixed = prefix_stale("AAPL is at 190.00.".to_string());
        assert!(prefixed.starts_with("[Note:"));
    }
}
