//! Turn driver
//!
//! Runs one conversational turn for one caller:
//! - Credentials → fresh client and tool bindings (never reused across callers)
//! - Orchestrator step → tool calls (concurrent within a step) → next step
//! - Stops when the orchestrator responds or the iteration cap is reached
//! - Delegation chain assembled after every tool call has finished

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::CredentialContext;
use crate::core::BridgeResult;
use crate::delegation::{DelegationChainRecorder, DelegationHop};
use crate::mcp::{BridgeConfig, RemoteToolClient, ToolBindingFactory, ToolCatalog};
use crate::tools::{ToolDefinition, ToolRegistry, ToolResult};

use super::prompt::default_system_prompt;

/// Prior message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

/// Everything the orchestrator needs to know about the turn
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub system_prompt: String,
}

/// Tool invocation requested by the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// A tool call and what came back
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolExchange {
    pub call: ToolCall,
    pub result: ToolResult,
}

/// What the orchestrator wants to do next
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorStep {
    /// Run these calls (concurrently) and ask again
    CallTools(Vec<ToolCall>),
    /// Final answer for the user
    Respond(String),
}

/// The reasoning loop that decides which tools to call.
///
/// Implemented outside this crate (usually around an LLM). An `Err` aborts
/// the turn; tool failures arrive as error `ToolResult`s in the transcript.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn next_step(
        &self,
        request: &TurnRequest,
        tools: &[ToolDefinition],
        transcript: &[ToolExchange],
    ) -> BridgeResult<OrchestratorStep>;
}

/// Payload returned to the caller at the end of a turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnOutcome {
    pub response: String,
    pub user_scopes: Vec<String>,
    pub user_sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation: Option<Vec<DelegationHop>>,
    pub tool_calls: usize,
    pub iteration_limit_reached: bool,
}

/// Drives turns against the configured tool service
pub struct TurnRunner {
    config: BridgeConfig,
    catalog: Arc<ToolCatalog>,
    recorder: DelegationChainRecorder,
}

impl TurnRunner {
    pub fn new(config: BridgeConfig, catalog: ToolCatalog) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
            recorder: DelegationChainRecorder::new(),
        }
    }

    /// Run a turn, converting a turn-level failure into a user-facing message
    pub async fn respond(
        &self,
        context: &CredentialContext,
        orchestrator: &dyn Orchestrator,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> TurnOutcome {
        match self.run_turn(context, orchestrator, message, history).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("[Turn] Turn failed for '{}': {}", context.subject(), e);
                let hops = self.recorder.for_turn(context, None);
                self.outcome(context, format!("I encountered an error: {}", e), hops, 0, false)
            }
        }
    }

    /// Run a turn. Discovery and orchestrator errors abort it.
    pub async fn run_turn(
        &self,
        context: &CredentialContext,
        orchestrator: &dyn Orchestrator,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> BridgeResult<TurnOutcome> {
        tracing::info!(
            "[Turn] Chat request from '{}' with scopes {:?}",
            context.subject(),
            context.scopes()
        );

        let client = Arc::new(RemoteToolClient::new(&self.config)?);
        let mut factory = ToolBindingFactory::new(client.clone(), self.catalog.clone(), context.clone());
        if let Some(allowed) = &self.config.allowed_tools {
            factory = factory.with_allowed_tools(allowed.iter().cloned());
        }

        let mut registry = ToolRegistry::new();
        registry.add_provider(&factory).await?;
        let definitions = registry.get_definitions();

        let request = TurnRequest {
            message: message.to_string(),
            history,
            system_prompt: default_system_prompt(context),
        };

        let mut transcript: Vec<ToolExchange> = Vec::new();
        let mut response = None;

        for iteration in 1..=self.config.max_tool_iterations {
            tracing::info!("[Turn] Asking orchestrator (iteration {})", iteration);

            match orchestrator.next_step(&request, &definitions, &transcript).await? {
                OrchestratorStep::Respond(text) => {
                    response = Some(text);
                    break;
                }
                OrchestratorStep::CallTools(calls) => {
                    tracing::info!(
                        "[Turn] Running {} tool call(s): {:?}",
                        calls.len(),
                        calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
                    );
                    let results =
                        join_all(calls.iter().map(|call| registry.execute(&call.name, &call.input))).await;
                    transcript.extend(
                        calls
                            .into_iter()
                            .zip(results)
                            .map(|(call, result)| ToolExchange { call, result }),
                    );
                }
            }
        }

        let limit_reached = response.is_none();
        let response = response.unwrap_or_else(|| {
            tracing::warn!(
                "[Turn] Max tool iterations ({}) reached",
                self.config.max_tool_iterations
            );
            format!(
                "I stopped after reaching the limit of {} tool rounds for this request. Please try a narrower question.",
                self.config.max_tool_iterations
            )
        });

        let captured = client.captured_secondary_token();
        let hops = self.recorder.for_turn(context, captured.as_deref());

        tracing::info!(
            "[Turn] Completed with {} tool calls and {} delegation hops",
            transcript.len(),
            hops.len()
        );

        Ok(self.outcome(context, response, hops, transcript.len(), limit_reached))
    }

    fn outcome(
        &self,
        context: &CredentialContext,
        response: String,
        hops: Vec<DelegationHop>,
        tool_calls: usize,
        iteration_limit_reached: bool,
    ) -> TurnOutcome {
        TurnOutcome {
            response,
            user_scopes: context.scopes().to_vec(),
            user_sub: context.subject().to_string(),
            delegation: if hops.is_empty() { None } else { Some(hops) },
            tool_calls,
            iteration_limit_reached,
        }
    }
}
