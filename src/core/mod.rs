//! Core orchestration: provider dispatch, fallback policy, and the
//! per-connection session state machine.

pub mod fallback;
pub mod llm;
pub mod session;

pub use llm::LlmOrchestrator;
pub use session::ChatSession;
