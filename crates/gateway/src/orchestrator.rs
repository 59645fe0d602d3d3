//! Turns one chat turn into a `ChatResponse` or `ErrorEnvelope`: validate the
//! session, consume rate-limit quota, interpret the query, then run the
//! guard → cache → upstream → stale-fallback pattern described for every
//! intent.

use std::sync::Arc;

use chrono::Utc;
use mdgate_cache::CacheLayer;
use mdgate_core::{ChatResponse, CoreError, ErrorEnvelope, Intent, ParsedQuery, TurnContextEntry};
use mdgate_interpreter::interpret;
use mdgate_upstream::UpstreamClient;
use serde_json::{json, Value};

use crate::format;
use crate::session_gate::{GetOutcome, SessionGate};

pub struct Orchestrator {
    gate: Arc<SessionGate>,
    cache: Arc<CacheLayer>,
    upstream: Arc<dyn UpstreamClient>,
}

impl Orchestrator {
    pub fn new(gate: Arc<SessionGate>, cache: Arc<CacheLayer>, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { gate, cache, upstream }
    }

    /// Exposes the cache layer so the binary can hand it to the background janitor.
    pub fn cache(&self) -> Arc<CacheLayer> {
        self.cache.clone()
    }

    pub async fn process_chat(&self, session_id: &str, query: &str) -> Result<ChatResponse, ErrorEnvelope> {
        match self.try_process(session_id, query).await {
            Ok(response) => Ok(response),
            Err(err) => Err(err.into()),
        }
    }

    async fn try_process(&self, session_id: &str, query: &str) -> Result<ChatResponse, CoreError> {
        let session = match self.gate.get(session_id).await? {
            GetOutcome::Found(s) => s,
            GetOutcome::NotFound => return Err(CoreError::SessionNotFound),
            GetOutcome::Expired => return Err(CoreError::SessionExpired),
        };

        self.gate.touch(session_id).await?;

        let (count, retry_after) = self.gate.consume_quota(session_id).await?;
        if self.gate.is_over_limit(count) {
            return Err(CoreError::RateLimited {
                retry_after_seconds: retry_after,
                requests_made: count,
                requests_limit: self.gate.rate_limit_requests(),
            });
        }

        let parsed = interpret(query, &session.context);

        let (answer, data) = match parsed.intent() {
            Intent::CommoditiesList => self.handle_commodities_list().await?,
            Intent::Conversion => self.handle_conversion(&parsed).await?,
            Intent::Indicator => self.handle_indicator(&parsed).await?,
            Intent::Historical => self.handle_historical(&parsed).await?,
            Intent::Quote | Intent::Price | Intent::Comparison | Intent::Unknown => {
                self.handle_price_like(&parsed).await?
            }
        };

        if !parsed.symbols.is_empty() {
            self.gate
                .append_context(
                    session_id,
                    TurnContextEntry {
                        query: query.to_string(),
                        symbols: parsed.symbols.clone(),
                        intent: parsed.intent(),
                        indicator: parsed.indicator.clone(),
                        interval: parsed.interval.clone(),
                        timestamp: Utc::now(),
                    },
                )
                .await?;
        }

        Ok(ChatResponse::new(answer, parsed.intent().as_query_type(), data, Utc::now()))
    }

    async fn handle_commodities_list(&self) -> Result<(String, Value), CoreError> {
        let result = self.upstream.list_commodities().await;
        if !result.success {
            return Err(CoreError::Upstream(result.error.unwrap_or_else(|| "unknown error".into())));
        }
        let data = result.data.unwrap_or(Value::Null);
        Ok(format::format_commodities_list(&data))
    }

    async fn handle_conversion(&self, parsed: &ParsedQuery) -> Result<(String, Value), CoreError> {
        let (Some(from), Some(to), Some(amount)) =
            (parsed.from_currency.as_deref(), parsed.to_currency.as_deref(), parsed.amount)
        else {
            return Err(CoreError::MissingCurrencies);
        };

        let cache_params = json!({ "from": from, "to": to, "amount": amount });
        self.run_with_cache("conversion", &cache_params, || self.upstream.convert_currency(from, to, amount), |data| {
            format::format_conversion(from, to, amount, data)
        })
        .await
    }

    async fn handle_indicator(&self, parsed: &ParsedQuery) -> Result<(String, Value), CoreError> {
        let Some(symbol) = parsed.symbols.first() else {
            return Err(CoreError::NoSymbol);
        };
        let Some(indicator) = parsed.indicator.as_deref() else {
            return Err(CoreError::NoIndicator);
        };
        let interval = parsed.interval.as_deref().unwrap_or("1day");
        let time_period = parsed.time_period.unwrap_or(14);
        let outputsize = parsed.output_size.unwrap_or(30);

        let cache_params = json!({
            "symbol": symbol,
            "indicator": indicator,
            "interval": interval,
            "time_period": time_period,
        });
        self.run_with_cache(
            "indicator",
            &cache_params,
            || self.upstream.technical_indicator(symbol, indicator, interval, time_period, outputsize),
            |data| format::format_indicator(symbol, indicator, data),
        )
        .await
    }

    async fn handle_historical(&self, parsed: &ParsedQuery) -> Result<(String, Value), CoreError> {
        let Some(symbol) = parsed.symbols.first() else {
            return Err(CoreError::NoSymbol);
        };
        let interval = parsed.interval.as_deref().unwrap_or("1day");
        let outputsize = parsed.output_size.unwrap_or(30);

        let cache_params = json!({ "symbol": symbol, "interval": interval, "outputsize": outputsize });
        self.run_with_cache(
            "historical",
            &cache_params,
            || self.upstream.get_time_series(symbol, interval, outputsize),
            |data| format::format_historical(symbol, interval, data),
        )
        .await
    }

    async fn handle_price_like(&self, parsed: &ParsedQuery) -> Result<(String, Value), CoreError> {
        let Some(symbol) = parsed.symbols.first() else {
            return Err(CoreError::NoSymbol);
        };

        if parsed.intent() == Intent::Quote {
            let cache_params = json!({ "symbol": symbol });
            return self
                .run_with_cache(
                    "quote",
                    &cache_params,
                    || self.upstream.get_quote(symbol),
                    |data| format::format_quote(symbol, data),
                )
                .await;
        }

        let cache_params = json!({ "symbol": symbol });
        self.run_with_cache("price", &cache_params, || self.upstream.get_price(symbol), |data| {
            format::format_price(symbol, data)
        })
        .await
    }

    /// The shared guard→cache→upstream→stale-fallback pattern every
    /// symbol-bearing intent follows.
    async fn run_with_cache<'a, F, Fut, Fmt>(
        &'a self,
        query_type: &str,
        cache_params: &Value,
        call_upstream: F,
        format_fn: Fmt,
    ) -> Result<(String, Value), CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = mdgate_core::ToolResult>,
        Fmt: Fn(&Value) -> (String, Value),
    {
        if let Some(hit) = self.cache.get(query_type, cache_params, false).await? {
            return Ok(format_fn(&hit.data));
        }

        let result = call_upstream().await;
        if result.success {
            let data = result.data.unwrap_or(Value::Null);
            self.cache.set(query_type, cache_params, data.clone()).await?;
            return Ok(format_fn(&data));
        }

        if let Some(stale) = self.cache.get(query_type, cache_params, true).await? {
            let (answer, data) = format_fn(&stale.data);
            return Ok((format::prefix_stale(answer), data));
        }

        Err(CoreError::Upstream(result.error.unwrap_or_else(|| "unknown error".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mdgate_store::{InMemoryCacheStore, InMemorySessionStore};

    struct StubUpstream {
        price_response: mdgate_core::ToolResult,
    }

    #[async_trait]
    impl UpstreamClient for StubUpstream {
        async fn get_price(&self, _symbol: &str) -> mdgate_core::ToolResult {
            self.price_response.clone()
        }
        async fn get_quote(&self, _symbol: &str) -> mdgate_core::ToolResult {
            mdgate_core::ToolResult::ok(json!({}), 1)
        }
        async fn get_time_series(&self, _symbol: &str, _interval: &str, _outputsize: u32) -> mdgate_core::ToolResult {
            mdgate_core::ToolResult::ok(json!({"values": []}), 1)
        }
        async fn get_exchange_rate(&self, _symbol: &str) -> mdgate_core::ToolResult {
            mdgate_core::ToolResult::ok(json!({}), 1)
        }
        async fn convert_currency(&self, _from: &str, _to: &str, _amount: f64) -> mdgate_core::ToolResult {
            mdgate_core::ToolResult::ok(json!({}), 1)
        }
        async fn list_commodities(&self) -> mdgate_core::ToolResult {
            mdgate_core::ToolResult::ok(json!({"commodities": ["gold", "silver"]}), 1)
        }
        async fn technical_indicator(
            &self,
            _symbol: &str,
            _indicator: &str,
            _interval: &str,
            _time_period: u32,
            _outputsize: u32,
        ) -> mdgate_core::ToolResult {
            mdgate_core::ToolResult::ok(json!({"values": []}), 1)
        }
        async fn list_tools(&self) -> mdgate_core::ToolResult {
            mdgate_core::ToolResult::ok(json!({}), 1)
        }
        async fn health_check(&self) -> bool {
            true
        }
    }

    fn orchestrator(upstream: StubUpstream) -> Orchestrator {
        let gate = Arc::new(SessionGate::new(Arc::new(InMemorySessionStore::new()), 60, 30, 60));
        let cache = Arc::new(CacheLayer::new(Arc::new(InMemoryCacheStore::new()), mdgate_cache::CacheTtls::default()));
        Orchestrator::new(gate, cache, Arc::new(upstream))
    }

    #[tokio::test]
    async fn simple_price_query_resolves_and_caches() {
        let orch = orchestrator(StubUpstream {
            price_response: mdgate_core::ToolResult::ok(json!({"close": 1950.0}), 5),
        });
        let session = orch.gate.create(None, None).await.unwrap();
        let response = orch.process_chat(&session.id, "What's the price of gold?").await.unwrap();
        assert_eq!(response.response_type, "price");
        assert_eq!(response.data["symbol"], "XAU/USD");
        assert_eq!(response.data["price"], 1950.0);
    }

    #[tokio::test]
    async fn unknown_ticker_without_financial_intent_yields_no_symbol_error() {
        let orch = orchestrator(StubUpstream {
            price_response: mdgate_core::ToolResult::ok(json!({}), 1),
        });
        let session = orch.gate.create(None, None).await.unwrap();
        let err = orch.process_chat(&session.id, "tell me a joke").await.unwrap_err();
        assert_eq!(err.error.code.as_str(), "NO_SYMBOL");
    }

    #[tokio::test]
    async fn rate_limit_is_enforced_without_calling_upstream() {
        let gate = Arc::new(SessionGate::new(Arc::new(InMemorySessionStore::new()), 60, 1, 60));
        let cache = Arc::new(CacheLayer::new(Arc::new(InMemoryCacheStore::new()), mdgate_cache::CacheTtls::default()));
        let orch = Orchestrator::new(
            gate,
            cache,
            Arc::new(StubUpstream {
                price_response: mdgate_core::ToolResult::ok(json!({"close": 1.0}), 1),
            }),
        );
        let session = orch.gate.create(None, None).await.unwrap();
        orch.process_chat(&session.id, "price of gold").await.unwrap();
        let err = orch.process_chat(&session.id, "price of gold").await.unwrap_err();
        assert_eq!(err.error.code.as_str(), "RATE_LIMITED");
    }

    #[tokio::test]
    async fn stale_cache_is_served_on_upstream_failure() {
        let gate = Arc::new(SessionGate::new(Arc::new(InMemorySessionStore::new()), 60, 30, 60));
        let cache_store = Arc::new(InMemoryCacheStore::new());
        let cache = Arc::new(CacheLayer::new(cache_store.clone(), mdgate_cache::CacheTtls::default()));
        let params = json!({ "symbol": "XAU/USD" });
        cache_store
            .set(mdgate_store::CacheRow {
                key: CacheLayer::cache_key("price", &params),
                query_type: "price".to_string(),
                response_data: json!({"close": 1900.0}),
                created_at: Utc::now() - chrono::Duration::hours(2),
                ttl_seconds: 45,
            })
            .await
            .unwrap();

        let orch = Orchestrator::new(
            gate,
            cache,
            Arc::new(StubUpstream {
                price_response: mdgate_core::ToolResult::err("upstream returned status 503", 1),
            }),
        );
        let session = orch.gate.create(None, None).await.unwrap();
        let response = orch.process_chat(&session.id, "price of gold").await.unwrap();
        assert!(response.answer.starts_with(format::STALE_WARNING));
        assert_eq!(response.data["price"], 1900.0);
    }

    #[tokio::test]
    async fn follow_up_resolves_symbol_from_prior_turn() {
        let orch = orchestrator(StubUpstream {
            price_response: mdgate_core::ToolResult::ok(json!({"close": 1950.0}), 1),
        });
        let session = orch.gate.create(None, None).await.unwrap();
        orch.process_chat(&session.id, "What's the price of gold?").await.unwrap();
        let response = orch.process_chat(&session.id, "what about its RSI?").await.unwrap();
        assert_eq!(response.response_type, "indicator");
        assert_eq!(response.data["symbol"], "XAU/USD");
        assert_eq!(response.data["indicator"], "rsi");
    }
}
