//! Field-alias resolution for upstream payloads. The upstream's exact field
//! names drift across tools and provider versions; every downstream
//! formatter looks fields up through here rather than indexing
//! `serde_json::Value` directly.

use serde_json::Value;

/// Returns the first present, non-null field among `keys`.
pub fn first_of<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| data.get(k).filter(|v| !v.is_null()))
}

pub fn first_f64(data: &Value, keys: &[&str]) -> Option<f64> {
    first_of(data, keys).and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
}

pub fn first_array<'a>(data: &'a Value, keys: &[&str]) -> Vec<Value> {
    first_of(data, keys)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

pub const PRICE_KEYS: &[&str] = &["price", "close", "last"];
pub const CHANGE_PERCENT_KEYS: &[&str] = &["change_percent", "percent_change", "change"];
pub const FIFTY_TWO_WEEK_HIGH_KEYS: &[&str] = &["fifty_two_week_high", "52_week_high"];
pub const FIFTY_TWO_WEEK_LOW_KEYS: &[&str] = &["fifty_two_week_low", "52_week_low"];
pub const SERIES_KEYS: &[&str] = &["values", "candles", "data"];
pub const RATE_KEYS: &[&str] = &["rate", "exchange_rate"];
pub const RESULT_KEYS: &[&str] = &["result", "amount"];

/// Caps a candle/indicator series to the first 100 points, per the
/// provider's pagination contract.
pub fn capped_series(data: &Value, keys: &[&str]) -> Vec<Value> {
    let mut series = first_array(data, keys);
    series.truncate(100);
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_of_picks_first_present_alias() {
        let data = serde_json::json!({"close": 42.0});
        assert_eq!(first_f64(&data, PRICE_KEYS), Some(42.0));
    }

    #[test]
    fn first_of_skips_null_entries() {
        let data = serde_json::json!({"price": null, "close": 10.0});
        assert_eq!(first_f64(&data, PRICE_KEYS), Some(10.0));
    }

    #[test]
    fn capped_series_truncates_to_100() {
        let values: Vec<i32> = (0..150).collect();
        let data = serde_json::json!({"values": values});
        assert_eq!(capped_series(&data, SERIES_KEYS).len(), 100);
    }
}
