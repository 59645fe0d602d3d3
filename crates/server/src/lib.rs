//! HTTP entry point for the market-data chat gateway: wires the session
//! gate, cache, and upstream client from `mdgate-gateway` behind a thin
//! axum router.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::init_metrics;
pub use state::AppState;
