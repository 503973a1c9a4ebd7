pub mod openai_responses;

pub use openai_responses::OpenAIResponsesRunner;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::agent::definition::AgentTool;
use crate::agent::message::ConversationTurn;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("OpenAI API key is not configured")]
    MissingApiKey,
    #[error("request to agent service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("agent service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("agent run failed: {0}")]
    Run(String),
    #[error("agent run produced no text output")]
    EmptyOutput,
}

/// One fully-resolved remote execution
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest {
    pub model: String,
    pub instructions: String,
    pub input: Vec<ConversationTurn>,
    pub tools: Vec<AgentTool>,
    pub store: bool,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub id: Option<String>,
    pub final_output: String,
}

/// Executes a run against the remote agent service
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, request: RunRequest) -> Result<RunResult, AgentError>;
}
