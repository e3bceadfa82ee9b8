//! Agentic loop engine.
//!
//! Calls the model, extracts tool calls from its reply, runs them one at a
//! time through the tool session, feeds the observations back, and repeats
//! until the model answers without tools or the iteration budget runs out.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::client::ChatModel;
use crate::agent::conversation::ConversationState;
use crate::agent::extractor::ToolCallExtractor;
use crate::agent::invoker::{ToolInvoker, ToolSession};
use crate::agent::types::*;

/// Default bound on model round-trips per run
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

// ---------------------------------------------------------------------------
// Callback trait
// ---------------------------------------------------------------------------

/// Hooks for callers that want to follow a run (progress output, tracing).
#[async_trait]
pub trait LoopCallback: Send + Sync {
    /// Called at the start of each iteration, before the model call.
    async fn on_iteration_start(&self, _iteration: u32) {}
    /// Called with each assistant message the model returns.
    async fn on_assistant_message(&self, _message: &AssistantMessage) {}
    /// Called after each individual tool has been executed.
    async fn on_tool_result(&self, _request: &ToolInvocationRequest, _result: &ToolInvocationResult) {}
    /// Called once after the loop terminates.
    async fn on_loop_complete(&self, _outcome: &LoopOutcome) {}
}

/// Default no-op callback.
pub struct NoOpCallback;

#[async_trait]
impl LoopCallback for NoOpCallback {}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Everything a finished run leaves behind.
#[derive(Debug, Clone)]
pub struct LoopReport {
    pub outcome: LoopOutcome,
    /// The full conversation at the end of the run
    pub turns: Vec<ConversationTurn>,
    /// Model round-trips that returned a response, including the final one
    pub iterations: u32,
}

// ---------------------------------------------------------------------------
// Core loop implementation
// ---------------------------------------------------------------------------

/// Drives one model against one tool session.
pub struct AgentLoop<'a> {
    model: &'a dyn ChatModel,
    session: &'a dyn ToolSession,
    callback: &'a dyn LoopCallback,
    extractor: ToolCallExtractor,
    tool_timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl<'a> AgentLoop<'a> {
    pub fn new(model: &'a dyn ChatModel, session: &'a dyn ToolSession) -> Self {
        AgentLoop {
            model,
            session,
            callback: &NoOpCallback,
            extractor: ToolCallExtractor::new(),
            tool_timeout: None,
            cancel: None,
        }
    }

    /// Report progress to `callback`
    pub fn with_callback(mut self, callback: &'a dyn LoopCallback) -> Self {
        self.callback = callback;
        self
    }

    /// Fail tool calls running longer than `timeout`
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Honor `token` at the model and tool suspension points
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run the loop for `question`, returning only the outcome
    pub async fn run(&self, question: &str, max_iterations: u32) -> LoopOutcome {
        self.run_detailed(question, max_iterations).await.outcome
    }

    /// Run the loop for `question`, returning the outcome and the conversation
    pub async fn run_detailed(&self, question: &str, max_iterations: u32) -> LoopReport {
        let mut state = ConversationState::new(question);
        let mut iteration: u32 = 0;
        let mut round_trips: u32 = 0;

        let outcome = loop {
            if iteration >= max_iterations {
                warn!("Agent loop reached max iterations ({})", max_iterations);
                break LoopOutcome::IterationLimitReached;
            }

            info!("Agent loop iteration {}/{}", iteration + 1, max_iterations);
            self.callback.on_iteration_start(iteration).await;

            let response = match self.call_model(state.snapshot()).await {
                Ok(response) => response,
                Err(outcome) => break outcome,
            };
            round_trips += 1;

            let message = match response.last_turn() {
                None => {
                    warn!("Model response carried no messages, stopping");
                    break LoopOutcome::FinalAnswer(String::new());
                }
                Some(ConversationTurn::Assistant(message)) => message.clone(),
                Some(other) => {
                    // Not an assistant turn: nothing to extract, its text is the answer
                    debug!("Model returned a {} turn as its last entry", other.role());
                    break LoopOutcome::FinalAnswer(other.text().to_string());
                }
            };

            self.callback.on_assistant_message(&message).await;
            state.append(ConversationTurn::Assistant(message.clone()));

            let requests = self.extractor.extract(&message);
            if requests.is_empty() {
                info!("Model returned content without tool calls, treating as final");
                break LoopOutcome::FinalAnswer(message.content);
            }

            info!("Model requested {} tool calls", requests.len());
            let invoker = self.invoker();
            for (index, mut request) in requests.into_iter().enumerate() {
                if request.call_id.is_empty() {
                    request.call_id = format!("call_{}_{}", iteration, index);
                }
                info!("Executing tool: {} ({})", request.name, request.call_id);
                debug!("Tool {} arguments: {:?}", request.name, request.arguments);

                let result = invoker.invoke(self.session, &request).await;
                self.callback.on_tool_result(&request, &result).await;
                state.append(ConversationTurn::observation(&result));
            }

            iteration += 1;
        };

        self.callback.on_loop_complete(&outcome).await;
        info!("Agentic loop finished: outcome={:?}, iterations={}", outcome, round_trips);

        LoopReport {
            outcome,
            turns: state.into_turns(),
            iterations: round_trips,
        }
    }

    /// One model round-trip; `Err` carries the terminal outcome
    async fn call_model(&self, turns: &[ConversationTurn]) -> Result<ModelResponse, LoopOutcome> {
        let call = self.model.invoke(turns);
        let result = match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    warn!("Agent loop cancelled during model call");
                    return Err(LoopOutcome::Cancelled);
                }
                result = call => result,
            },
            None => call.await,
        };

        result.map_err(|e| {
            warn!("Model call failed: {}", e);
            LoopOutcome::ModelFailed(e.to_string())
        })
    }

    fn invoker(&self) -> ToolInvoker {
        let mut invoker = ToolInvoker::new();
        if let Some(timeout) = self.tool_timeout {
            invoker = invoker.with_timeout(timeout);
        }
        if let Some(ref token) = self.cancel {
            invoker = invoker.with_cancellation(token.clone());
        }
        invoker
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
