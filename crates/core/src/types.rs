//! Data model shared across the gateway: sessions, parsed queries and the
//! response envelopes returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classified intent of a parsed query. `Comparison` and `Unknown` are both
/// dispatched through the same handler as `Price` by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Price,
    Quote,
    Historical,
    Indicator,
    Conversion,
    Comparison,
    CommoditiesList,
    Unknown,
}

impl Intent {
    /// The `type` tag used on the response envelope and as the cache
    /// `query_type` discriminant.
    pub fn as_query_type(&self) -> &'static str {
        match self {
            Intent::Price | Intent::Comparison | Intent::Unknown => "price",
            Intent::Quote => "quote",
            Intent::Historical => "historical",
            Intent::Indicator => "indicator",
            Intent::Conversion => "conversion",
            Intent::CommoditiesList => "quote",
        }
    }
}

/// One turn recorded into a session's bounded context list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnContextEntry {
    pub query: String,
    pub symbols: Vec<String>,
    pub intent: Intent,
    pub indicator: Option<String>,
    pub interval: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Maximum number of turn-context entries retained per session.
pub const MAX_CONTEXT_ENTRIES: usize = 10;

/// Appends `entry` to `context`, truncating to the most recent
/// [`MAX_CONTEXT_ENTRIES`] as `new = old[-9:] ++ current`.
pub fn push_context(context: &mut Vec<TurnContextEntry>, entry: TurnContextEntry) {
    if context.len() >= MAX_CONTEXT_ENTRIES {
        let drop = context.len() - (MAX_CONTEXT_ENTRIES - 1);
        context.drain(0..drop);
    }
    context.push(entry);
}

/// Conversational session state, owned by the persistent store and mutated
/// only through the session gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub context: Vec<TurnContextEntry>,
    pub request_count: u32,
    pub request_window_start: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

impl Session {
    pub fn new(user_id: Option<String>, metadata: Option<serde_json::Value>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: now,
            last_activity: now,
            context: Vec::new(),
            request_count: 0,
            request_window_start: now,
            metadata: metadata.unwrap_or_else(|| serde_json::json!({})),
        }
    }

    /// Inclusive boundary: a session timed out exactly `timeout` ago is
    /// considered expired.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        now - self.last_activity >= timeout
    }
}

/// A fully interpreted query, produced by `mdgate-interpreter` and consumed
/// by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub intent: Option<Intent>,
    pub symbols: Vec<String>,
    pub interval: Option<String>,
    pub indicator: Option<String>,
    pub time_period: Option<u32>,
    pub output_size: Option<u32>,
    pub from_currency: Option<String>,
    pub to_currency: Option<String>,
    pub amount: Option<f64>,
    pub raw_query: String,
}

impl ParsedQuery {
    pub fn intent(&self) -> Intent {
        self.intent.unwrap_or(Intent::Unknown)
    }
}

/// Successful response envelope returned by `process_chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(rename = "type")]
    pub response_type: String,
    pub data: serde_json::Value,
    pub timestamp: String,
    pub formatted_time: String,
}

impl ChatResponse {
    pub fn new(answer: impl Into<String>, response_type: impl Into<String>, data: serde_json::Value, now: DateTime<Utc>) -> Self {
        Self {
            answer: answer.into(),
            response_type: response_type.into(),
            data,
            timestamp: crate::time::iso8601(now),
            formatted_time: crate::time::formatted(now),
        }
    }
}

/// Outcome of a single upstream tool invocation, returned by
/// `mdgate-upstream`'s client to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub response_time_ms: u64,
}

impl ToolResult {
    pub fn ok(data: serde_json::Value, response_time_ms: u64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            response_time_ms,
        }
    }

    pub fn err(message: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            response_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_context_truncates_to_ten() {
        let mut ctx = Vec::new();
        for i in 0..15 {
            push_context(
                &mut ctx,
                TurnContextEntry {
                    query: format!("q{i}"),
                    symbols: vec![],
                    intent: Intent::Price,
                    indicator: None,
                    interval: None,
                    timestamp: Utc::now(),
                },
            );
        }
        assert_eq!(ctx.len(), MAX_CONTEXT_ENTRIES);
        assert_eq!(ctx.last().unwrap().query, "q14");
        assert_eq!(ctx.first().unwrap().query, "q5");
    }

    #[test]
    fn session_expiry_is_inclusive() {
        let now = Utc::now();
        let mut session = Session::new(None, None, now - chrono::Duration::minutes(60));
        session.last_activity = now - chrono::Duration::minutes(60);
        assert!(session.is_expired(now, chrono::Duration::minutes(60)));
    }
}
