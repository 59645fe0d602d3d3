//! Session gate and chat orchestrator: the deterministic core that sits
//! between the HTTP layer and the store/interpreter/cache/upstream crates.

pub mod agent_text;
pub mod format;
pub mod janitor;
pub mod orchestrator;
pub mod session_gate;

pub use agent_text::{AgentTextGenerator, EchoAgentTextGenerator};
pub use janitor::{spawn_cache_janitor, spawn_session_janitor, JanitorHandle};
pub use orchestrator::Orchestrator;
pub use session_gate::{GetOutcome, SessionGate};
