//! HTTP JSON-RPC client against the upstream market-data tool server, plus
//! response-shape normalization (the providers behind `tools/call` disagree
//! on envelope shape across versions; this is where that gets absorbed once).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use mdgate_core::ToolResult;
use serde_json::json;

use crate::error::UpstreamError;
use crate::rpc::{tool_call_params, JsonRpcRequest, JsonRpcResponse, ToolCallResult};

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn get_price(&self, symbol: &str) -> ToolResult;
    async fn get_quote(&self, symbol: &str) -> ToolResult;
    async fn get_time_series(&self, symbol: &str, interval: &str, outputsize: u32) -> ToolResult;
    async fn get_exchange_rate(&self, symbol: &str) -> ToolResult;
    async fn convert_currency(&self, from: &str, to: &str, amount: f64) -> ToolResult;
    async fn list_commodities(&self) -> ToolResult;
    async fn technical_indicator(
        &self,
        symbol: &str,
        indicator: &str,
        interval: &str,
        time_period: u32,
        outputsize: u32,
    ) -> ToolResult;
    async fn list_tools(&self) -> ToolResult;
    async fn health_check(&self) -> bool;
}

pub struct HttpUpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builder with a static timeout never fails");
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> ToolResult {
        let started = Instant::now();
        match self.call_rpc("tools/call", tool_call_params(name, arguments)).await {
            Ok(data) => ToolResult::ok(data, started.elapsed().as_millis() as u64),
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "upstream tool call failed");
                ToolResult::err(err.to_string(), started.elapsed().as_millis() as u64)
            }
        }
    }

    async fn call_rpc(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, UpstreamError> {
        let request = JsonRpcRequest::new(method, params);
        let response = self
            .http
            .post(format!("{}/mcp", self.base_url))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json, text/event-stream")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let body: JsonRpcResponse = response.json().await?;

        if let Some(err) = body.error {
            return Err(UpstreamError::Rpc(err.message));
        }

        let Some(result) = body.result else {
            return Ok(serde_json::Value::Null);
        };

        // `tools/list` returns its payload directly; `tools/call` wraps it
        // in the isError/structuredContent/content envelope.
        if method != "tools/call" {
            return Ok(result);
        }

        let call_result: ToolCallResult = serde_json::from_value(result)
            .map_err(|e| UpstreamError::Other(format!("malformed tool result: {e}")))?;

        if call_result.is_error {
            let message = call_result
                .content
                .first()
                .and_then(|c| c.text.clone())
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(UpstreamError::Rpc(message));
        }

        if let Some(structured) = call_result.structured_content {
            return Ok(structured);
        }

        if let Some(text) = call_result.content.first().and_then(|c| c.text.clone()) {
            return Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "text": text })));
        }

        Ok(serde_json::Value::Null)
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn get_price(&self, symbol: &str) -> ToolResult {
        self.call_tool("twelvedata_get_price", json!({ "symbol": symbol })).await
    }

    async fn get_quote(&self, symbol: &str) -> ToolResult {
        self.call_tool("twelvedata_get_quote", json!({ "symbol": symbol })).await
    }

    async fn get_time_series(&self, symbol: &str, interval: &str, outputsize: u32) -> ToolResult {
        self.call_tool(
            "twelvedata_get_time_series",
            json!({ "symbol": symbol, "interval": interval, "outputsize": outputsize }),
        )
        .await
    }

    async fn get_exchange_rate(&self, symbol: &str) -> ToolResult {
        self.call_tool("twelvedata_get_exchange_rate", json!({ "symbol": symbol })).await
    }

    async fn convert_currency(&self, from: &str, to: &str, amount: f64) -> ToolResult {
        self.call_tool(
            "twelvedata_convert_currency",
            json!({ "from": from, "to": to, "amount": amount }),
        )
        .await
    }

    async fn list_commodities(&self) -> ToolResult {
        self.call_tool("twelvedata_list_commodities", json!({})).await
    }

    async fn technical_indicator(
        &self,
        symbol: &str,
        indicator: &str,
        interval: &str,
        time_period: u32,
        outputsize: u32,
    ) -> ToolResult {
        self.call_tool(
            "twelvedata_technical_indicator",
            json!({
                "symbol": symbol,
                "indicator": indicator,
                "interval": interval,
                "time_period": time_period,
                "outputsize": outputsize,
            }),
        )
        .await
    }

    async fn list_tools(&self) -> ToolResult {
        let started = Instant::now();
        match self.call_rpc("tools/list", json!({})).await {
            Ok(data) => ToolResult::ok(data, started.elapsed().as_millis() as u64),
            Err(err) => ToolResult::err(err.to_string(), started.elapsed().as_millis() as u64),
        }
    }

    async fn health_check(&self) -> bool {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(crate::HEALTH_CHECK_TIMEOUT_SECS))
            .build()
        {
            Ok(c) => c,
            Err(_) => return false,
        };
        client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_params_adds_response_format_json() {
        let params = tool_call_params("twelvedata_get_price", json!({ "symbol": "AAPL" }));
        assert_eq!(params["arguments"]["response_format"], "json");
        assert_eq!(params["name"], "twelvedata_get_price");
    }
}
