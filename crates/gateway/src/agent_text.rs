//! Seam for an LLM-driven agent path. The deterministic orchestrator in
//! `orchestrator.rs` covers the full tool surface on its own; this trait
//! exists only so a future agent loop ("given a query and recent turns,
//! produce a direct answer or a sequence of tool calls") can be slotted in
//! without touching the rest of the gateway. No real backend is implemented.

use async_trait::async_trait;

use mdgate_core::TurnContextEntry;

#[async_trait]
pub trait AgentTextGenerator: Send + Sync {
    async fn generate(&self, query: &str, context: &[TurnContextEntry]) -> String;
}

/// Echoes the query back. Used for wiring and tests; never reaches a real model.
pub struct EchoAgentTextGenerator;

#[async_trait]
impl AgentTextGenerator for EchoAgentTextGenerator {
    async fn generate(&self, query: &str, _context: &[TurnContextEntry]) -> String {
        format!("echo: {query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_generator_returns_prefixed_query() {
        let generator = EchoAgentTextGenerator;
        let answer = generator.generate("what is the price of gold?", &[]).await;
        assert_eq!(answer, "echo: what is the price of gold?");
    }
}
