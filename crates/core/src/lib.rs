//! Shared types for the market-data chat gateway.
//!
//! Every other crate in this workspace (`mdgate-store`, `mdgate-interpreter`,
//! `mdgate-cache`, `mdgate-upstream`, `mdgate-gateway`, `mdgate-server`)
//! depends on this crate for the session/query/response data model and the
//! common error taxonomy.

pub mod error;
pub mod time;
pub mod types;

pub use error::{CoreError, ErrorCode, ErrorDetail, ErrorEnvelope, Result};
pub use types::{
    push_context, ChatResponse, Intent, ParsedQuery, Session, ToolResult, TurnContextEntry,
    MAX_CONTEXT_ENTRIES,
};
