//! Pure, deterministic interpretation of free-form market queries into a
//! [`ParsedQuery`]. No I/O, no async — every function here is a referentially
//! transparent text-to-structure transform, which is what makes the
//! invariants in the project's testable-properties section checkable as
//! plain unit tests.

pub mod tables;

use mdgate_core::{Intent, ParsedQuery, TurnContextEntry};
use tables::*;

/// Interprets `query` against the most recent turns of `context` (oldest
/// first, as stored on [`mdgate_core::Session`]).
pub fn interpret(query: &str, context: &[TurnContextEntry]) -> ParsedQuery {
    let lower = query.to_lowercase();
    let intent = detect_intent(&lower);
    let mut symbols = extract_symbols(query, &lower);
    if symbols.is_empty() && !context.is_empty() && is_follow_up(&lower) {
        if let Some(resolved) = resolve_from_context(context) {
            symbols = resolved;
        }
    }

    let (from_currency, to_currency) = extract_conversion(&lower);

    ParsedQuery {
        intent: Some(intent),
        symbols,
        interval: Some(extract_interval(&lower).unwrap_or_else(|| "1day".to_string())),
        indicator: extract_indicator(&lower),
        time_period: Some(extract_time_period(&lower).unwrap_or(14)),
        output_size: Some(extract_outputsize(&lower).unwrap_or(30).min(5000)),
        from_currency,
        to_currency,
        amount: extract_amount(query),
        raw_query: query.to_string(),
    }
}

fn contains_any(haystack: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| haystack.contains(p))
}

fn detect_intent(lower: &str) -> Intent {
    if contains_any(lower, COMMODITIES_LIST_PHRASES) {
        return Intent::CommoditiesList;
    }
    if contains_any(lower, CONVERSION_PHRASES) {
        return Intent::Conversion;
    }
    if INDICATORS.iter().any(|(phrase, _)| lower.contains(phrase)) {
        return Intent::Indicator;
    }
    if contains_any(lower, HISTORICAL_PHRASES) || LAST_N_PERIOD_RE.is_match(lower) {
        return Intent::Historical;
    }
    if contains_any(lower, QUOTE_PHRASES) {
        return Intent::Quote;
    }
    if contains_any(lower, COMPARISON_PHRASES) {
        return Intent::Comparison;
    }
    if contains_any(lower, PRICE_PHRASES) {
        return Intent::Price;
    }
    Intent::Price
}

fn has_financial_intent(lower: &str) -> bool {
    contains_any(lower, FINANCIAL_INTENT_PHRASES)
}

fn extract_symbols(raw: &str, lower: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut push_unique = |sym: String, found: &mut Vec<String>| {
        if !found.contains(&sym) {
            found.push(sym);
        }
    };

    for (word, symbol) in METALS.iter() {
        if lower.contains(word) {
            push_unique(symbol.to_string(), &mut found);
        }
    }
    for (word, symbol) in CRYPTO.iter() {
        if lower.contains(word) {
            push_unique(symbol.to_string(), &mut found);
        }
    }
    for (name, ticker) in STOCK_NAMES.iter() {
        if lower.contains(name) {
            push_unique(ticker.to_string(), &mut found);
        }
    }
    for pair in FOREX_PAIRS.iter() {
        let slashed = pair.to_lowercase();
        let unslashed = slashed.replace('/', "");
        if lower.contains(&slashed) || lower.contains(&unslashed) {
            push_unique(pair.to_string(), &mut found);
        }
    }
    for m in TICKER_WORD_RE.find_iter(raw) {
        let word = m.as_str();
        if COMMON_STOCKS.contains(&word) && !EXCLUDED_WORDS.contains(word) {
            push_unique(word.to_string(), &mut found);
        }
    }
    if found.is_empty() && has_financial_intent(lower) {
        for word in raw.split_whitespace() {
            let cleaned: String = word.chars().filter(|c| c.is_ascii_alphabetic()).collect();
            if cleaned.len() >= 2
                && cleaned.len() <= 5
                && cleaned.chars().all(|c| c.is_ascii_uppercase())
                && !EXCLUDED_WORDS.contains(cleaned.as_str())
            {
                push_unique(cleaned, &mut found);
                break;
            }
        }
    }
    for m in EXPLICIT_PAIR_RE.find_iter(raw) {
        push_unique(m.as_str().to_string(), &mut found);
    }
    found
}

fn is_follow_up(lower: &str) -> bool {
    FOLLOW_UP_RES.iter().any(|re| re.is_match(lower))
}

fn resolve_from_context(context: &[TurnContextEntry]) -> Option<Vec<String>> {
    context
        .iter()
        .rev()
        .find(|entry| !entry.symbols.is_empty())
        .map(|entry| entry.symbols.clone())
}

fn extract_interval(lower: &str) -> Option<String> {
    INTERVALS
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, code)| code.to_string())
}

fn extract_indicator(lower: &str) -> Option<String> {
    INDICATORS
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, code)| code.to_string())
}

fn extract_time_period(lower: &str) -> Option<u32> {
    for re in TIME_PERIOD_RES.iter() {
        if let Some(caps) = re.captures(lower) {
            if let Some(m) = caps.get(1) {
                if let Ok(n) = m.as_str().parse::<u32>() {
                    return Some(n);
                }
            }
        }
    }
    None
}

fn extract_outputsize(lower: &str) -> Option<u32> {
    for re in OUTPUTSIZE_RES.iter() {
        if let Some(caps) = re.captures(lower) {
            if let Some(m) = caps.get(1) {
                if let Ok(n) = m.as_str().parse::<u32>() {
                    return Some(n.min(5000));
                }
            }
        }
    }
    None
}

fn extract_amount(raw: &str) -> Option<f64> {
    AMOUNT_RE.find(raw).and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Returns `(from, to)` currency codes. A single word-map hit yields `from`
/// only; a second occurrence yields `to`. Two or more explicit currency
/// codes (e.g. `"USD"`, `"EUR"`) override the word-map result entirely.
fn extract_conversion(lower: &str) -> (Option<String>, Option<String>) {
    let mut from: Option<String> = None;
    let mut to: Option<String> = None;
    for word in lower.split_whitespace() {
        let cleaned: String = word.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        if let Some((_, code)) = CURRENCY_WORDS.iter().find(|(w, _)| *w == cleaned) {
            if from.is_none() {
                from = Some(code.to_string());
            } else if to.is_none() && Some(code.to_string()) != from {
                to = Some(code.to_string());
            }
        }
    }

    let codes: Vec<String> = CURRENCY_CODE_RE
        .find_iter(lower)
        .map(|m| m.as_str().to_uppercase())
        .collect();
    if codes.len() >= 2 {
        return (Some(codes[0].clone()), Some(codes[1].clone()));
    }
    if codes.len() == 1 && from.is_none() {
        from = Some(codes[0].clone());
    }

    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(symbols: &[&str]) -> TurnContextEntry {
        TurnContextEntry {
            query: "prior".to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            intent: Intent::Price,
            indicator: None,
            interval: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn simple_price_query_resolves_metal_and_intent() {
        let parsed = interpret("What's the price of gold?", &[]);
        assert_eq!(parsed.intent(), Intent::Price);
        assert_eq!(parsed.symbols, vec!["XAU/USD".to_string()]);
    }

    #[test]
    fn indicator_query_detects_rsi_and_symbol() {
        let parsed = interpret("What is the RSI for AAPL?", &[]);
        assert_eq!(parsed.intent(), Intent::Indicator);
        assert_eq!(parsed.indicator.as_deref(), Some("rsi"));
        assert!(parsed.symbols.contains(&"AAPL".to_string()));
    }

    #[test]
    fn follow_up_resolves_symbol_from_prior_turn() {
        let ctx = vec![entry(&["XAU/USD"])];
        let parsed = interpret("what about its RSI?", &ctx);
        assert_eq!(parsed.intent(), Intent::Indicator);
        assert_eq!(parsed.symbols, vec!["XAU/USD".to_string()]);
    }

    #[test]
    fn follow_up_walks_context_newest_first() {
        let ctx = vec![entry(&["AAPL"]), entry(&["TSLA"])];
        let parsed = interpret("what about that?", &ctx);
        assert_eq!(parsed.symbols, vec!["TSLA".to_string()]);
    }

    #[test]
    fn conversion_query_extracts_amount_and_currencies() {
        let parsed = interpret("convert 100 USD to EUR", &[]);
        assert_eq!(parsed.intent(), Intent::Conversion);
        assert_eq!(parsed.amount, Some(100.0));
        assert_eq!(parsed.from_currency.as_deref(), Some("USD"));
        assert_eq!(parsed.to_currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn unknown_ticker_without_financial_intent_yields_no_symbols() {
        let parsed = interpret("tell me a joke", &[]);
        assert!(parsed.symbols.is_empty());
    }

    #[test]
    fn historical_query_detects_last_n_days_pattern() {
        let parsed = interpret("show me the last 30 days for AAPL", &[]);
        assert_eq!(parsed.intent(), Intent::Historical);
    }

    #[test]
    fn commodities_list_takes_priority_over_price_phrases() {
        let parsed = interpret("show commodities available to trade", &[]);
        assert_eq!(parsed.intent(), Intent::CommoditiesList);
    }

    #[test]
    fn interpretation_is_idempotent() {
        let a = interpret("price of bitcoin", &[]);
        let b = interpret("price of bitcoin", &[]);
        assert_eq!(a.symbols, b.symbols);
        assert_eq!(a.intent(), b.intent());
    }

    #[test]
    fn outputsize_is_capped_at_5000() {
        let parsed = interpret("give me the last 9000 days of AAPL", &[]);
        assert_eq!(parsed.output_size, Some(5000));
    }
}
