//! Compiled-once lookup tables driving intent classification and entity
//! extraction. Kept as plain data (phrase → value) rather than scattered
//! `if` chains so the interpreter's behavior is auditable in one place.

use once_cell::sync::Lazy;
use regex::Regex;

pub static METALS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("gold", "XAU/USD"),
        ("silver", "XAG/USD"),
        ("platinum", "XPT/USD"),
        ("palladium", "XPD/USD"),
    ]
});

pub static CRYPTO: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("bitcoin", "BTC/USD"),
        ("btc", "BTC/USD"),
        ("ethereum", "ETH/USD"),
        ("eth", "ETH/USD"),
        ("litecoin", "LTC/USD"),
        ("ltc", "LTC/USD"),
    ]
});

pub static STOCK_NAMES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("apple", "AAPL"),
        ("microsoft", "MSFT"),
        ("google", "GOOGL"),
        ("alphabet", "GOOGL"),
        ("amazon", "AMZN"),
        ("meta", "META"),
        ("facebook", "META"),
        ("nvidia", "NVDA"),
        ("tesla", "TSLA"),
        ("jpmorgan", "JPM"),
        ("jp morgan", "JPM"),
        ("walmart", "WMT"),
        ("johnson", "JNJ"),
        ("exxon", "XOM"),
        ("chevron", "CVX"),
    ]
});

pub static COMMON_STOCKS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "AAPL", "MSFT", "GOOGL", "GOOG", "AMZN", "META", "NVDA", "TSLA", "JPM", "V", "MA", "UNH",
        "JNJ", "WMT", "PG", "XOM", "CVX", "BAC",
    ]
});

pub static FOREX_PAIRS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "EUR/USD", "GBP/USD", "USD/JPY", "USD/CHF", "AUD/USD", "USD/CAD", "NZD/USD", "EUR/GBP",
        "EUR/JPY", "GBP/JPY",
    ]
});

pub static INDICATORS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("simple moving average", "sma"),
        ("moving average", "sma"),
        ("sma", "sma"),
        ("exponential moving average", "ema"),
        ("ema", "ema"),
        ("relative strength index", "rsi"),
        ("rsi", "rsi"),
        ("moving average convergence divergence", "macd"),
        ("macd", "macd"),
        ("bollinger bands", "bbands"),
        ("bbands", "bbands"),
        ("stochastic", "stoch"),
        ("stoch", "stoch"),
        ("average directional index", "adx"),
        ("adx", "adx"),
        ("average true range", "atr"),
        ("atr", "atr"),
        ("commodity channel index", "cci"),
        ("cci", "cci"),
        ("on balance volume", "obv"),
        ("obv", "obv"),
        ("momentum", "mom"),
        ("mom", "mom"),
        ("rate of change", "roc"),
        ("roc", "roc"),
        ("williams %r", "willr"),
        ("willr", "willr"),
    ]
});

pub static INTERVALS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("1 minute", "1min"),
        ("1min", "1min"),
        ("5 minute", "5min"),
        ("5min", "5min"),
        ("15 minute", "15min"),
        ("15min", "15min"),
        ("30 minute", "30min"),
        ("30min", "30min"),
        ("1 hour", "1h"),
        ("1h", "1h"),
        ("hourly", "1h"),
        ("4 hour", "4h"),
        ("4h", "4h"),
        ("daily", "1day"),
        ("1 day", "1day"),
        ("1day", "1day"),
        ("day", "1day"),
        ("weekly", "1week"),
        ("1 week", "1week"),
        ("1week", "1week"),
        ("week", "1week"),
        ("monthly", "1month"),
        ("1 month", "1month"),
        ("1month", "1month"),
        ("month", "1month"),
    ]
});

pub const CURRENCY_WORDS: &[(&str, &str)] = &[
    ("dollars", "USD"),
    ("dollar", "USD"),
    ("usd", "USD"),
    ("euros", "EUR"),
    ("euro", "EUR"),
    ("eur", "EUR"),
    ("pounds", "GBP"),
    ("pound", "GBP"),
    ("gbp", "GBP"),
    ("yen", "JPY"),
    ("jpy", "JPY"),
    ("francs", "CHF"),
    ("franc", "CHF"),
    ("chf", "CHF"),
];

pub static CURRENCY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(USD|EUR|GBP|JPY|CHF|AUD|CAD|NZD)\b").unwrap());

pub static EXPLICIT_PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]{2,6}/[A-Z]{2,6})\b").unwrap());

pub static TICKER_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2,5}\b").unwrap());

pub static LAST_N_PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)last\s+\d+\s+(?:days?|weeks?|months?|hours?)").unwrap());

pub static TIME_PERIOD_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(\d+)[\s-]*(?:period|days?)\b").unwrap(),
        Regex::new(r"(?i)period\s*of\s*(\d+)").unwrap(),
        Regex::new(r"(?i)(\d+)[\s-]*(?:day|week)\s*(?:sma|ema|rsi|macd)").unwrap(),
    ]
});

pub static OUTPUTSIZE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)last\s*(\d+)\s*(?:days?|weeks?|candles?|points?|bars?)").unwrap(),
        Regex::new(r"(?i)(\d+)\s*(?:days?|weeks?|candles?|points?|bars?)\s*of").unwrap(),
    ]
});

pub static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());

pub static COMMODITIES_LIST_PHRASES: &[&str] =
    &["list commodities", "available commodities", "show commodities"];

pub static CONVERSION_PHRASES: &[&str] =
    &["convert", "exchange", "to usd", "to eur", "to gbp", "how much is"];

pub static HISTORICAL_PHRASES: &[&str] = &[
    "historical",
    "history",
    "past",
    "chart",
    "time series",
    "candles",
    "over time",
    "last week",
    "last month",
    "last year",
    "trend",
];

pub static QUOTE_PHRASES: &[&str] = &[
    "quote",
    "detailed",
    "52 week",
    "volume",
    "high low",
    "open close",
    "ohlc",
];

pub static COMPARISON_PHRASES: &[&str] = &["compare", "vs", "versus", "against", "difference between"];

pub static PRICE_PHRASES: &[&str] = &[
    "price",
    "cost",
    "worth",
    "value",
    "trading at",
    "what is",
    "how much",
];

pub static FINANCIAL_INTENT_PHRASES: &[&str] = &[
    "price",
    "quote",
    "cost",
    "worth",
    "value",
    "trading at",
    "buy",
    "sell",
    "invest",
    "stock",
    "share",
    "ticker",
    "chart",
    "history",
    "historical",
    "candle",
    "ohlc",
    "indicator",
    "sma",
    "ema",
    "rsi",
    "macd",
];

pub static EXCLUDED_WORDS: Lazy<std::collections::HashSet<&'static str>> = Lazy::new(|| {
    [
        "THE", "IS", "OF", "TO", "FOR", "AT", "BY", "IN", "ON", "AN", "IT", "WHAT", "HOW", "SHOW",
        "GET", "GIVE", "ME", "AND", "OR", "WITH", "PRICE", "COST", "WORTH", "VALUE", "RATE",
        "DATA", "QUOTE", "LAST", "PAST", "TODAY", "NOW", "CURRENT", "DAILY", "WEEKLY", "SMA",
        "EMA", "RSI", "MACD", "ADX", "ATR", "CCI", "OBV", "ROC", "USD", "EUR", "GBP", "JPY",
        "CHF", "AUD", "CAD", "NZD", "DAY", "WEEK", "MONTH", "YEAR", "HOUR", "MIN", "CAN", "YOU",
        "TELL", "ABOUT", "THIS", "THAT", "FROM", "GOLD", "SILVER", "PLATINUM", "BITCOIN",
        "ETHEREUM", "JOKE", "FUNNY", "HELP", "HELLO", "HI", "BYE", "THANKS", "PLEASE", "STOCK",
        "STOCKS", "MARKET", "TRADING", "TRADE", "TRADES", "INFO", "KNOW", "WANT", "NEED", "LIKE",
    ]
    .into_iter()
    .collect()
});

pub static FOLLOW_UP_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bits?\b",
        r"(?i)\bthat\b",
        r"(?i)\bthe same\b",
        r"(?i)\bthis\b",
        r"(?i)\bsame stock\b",
        r"(?i)\bsame symbol\b",
        r"(?i)\band what about\b",
        r"(?i)\bhow about\b",
        r"(?i)\bwhat about\b",
        r"(?i)\balso\b",
        r"(?i)\btoo\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
