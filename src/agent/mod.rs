//! Agent module - the tool-augmented conversation loop
//!
//! This module handles all model-facing functionality:
//! - Conversation state for one run
//! - Tool-call extraction from model replies (native and textual)
//! - Tool invocation through the MCP session
//! - The agentic loop and its run setup
//! - The Ollama chat client

mod agentic_loop;
mod client;
mod conversation;
mod extractor;
mod invoker;
mod runner;
mod types;

pub use agentic_loop::{
    AgentLoop, LoopCallback, LoopReport, NoOpCallback, DEFAULT_MAX_ITERATIONS,
};
pub use client::{ChatModel, OllamaClient};
pub use conversation::ConversationState;
pub use extractor::{
    BareJsonObject, ExtractionStrategy, FencedJsonBlocks, StructuredToolCalls, ToolCallExtractor,
};
pub use invoker::{ToolInvoker, ToolSession};
pub use runner::{connect_server, run_question, run_question_with_cancellation};
pub use types::*;
