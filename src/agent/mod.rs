//! Turn-level orchestration
//!
//! Connects an external `Orchestrator` to the bindings discovered for one
//! caller and packages the result with the delegation chain.

mod prompt;
mod turn;

pub use prompt::default_system_prompt;
pub use turn::{
    ChatMessage, Orchestrator, OrchestratorStep, ToolCall, ToolExchange, TurnOutcome, TurnRequest,
    TurnRunner,
};
