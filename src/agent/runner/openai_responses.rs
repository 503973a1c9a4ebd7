use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{AgentError, AgentRunner, RunRequest, RunResult};
use crate::config::OpenAIConfig;

/// Runs agents through the hosted Responses API. Tools are hosted, so one
/// request covers the whole run.
#[derive(Debug, Clone)]
pub struct OpenAIResponsesRunner {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    organization_id: Option<String>,
    project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum OutputItem {
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        content: Vec<OutputContent>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum OutputContent {
    #[serde(rename = "output_text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl OpenAIResponsesRunner {
    pub fn new(config: &OpenAIConfig) -> Self {
        info!("Initialized OpenAIResponsesRunner: base_url={}", config.base_url);
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            organization_id: config.organization_id.clone(),
            project_id: config.project_id.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url)
    }
}

/// Turn a raw Responses API body into the run's final text
fn parse_response(body: ResponseBody) -> Result<RunResult, AgentError> {
    if let Some(error) = body.error {
        return Err(AgentError::Run(error.message));
    }
    if body.status.as_deref() == Some("failed") {
        return Err(AgentError::Run("response status is failed".to_string()));
    }

    let final_output = body
        .output
        .iter()
        .rev()
        .find_map(|item| match item {
            OutputItem::Message { content } => Some(
                content
                    .iter()
                    .filter_map(|part| match part {
                        OutputContent::Text { text } => Some(text.as_str()),
                        OutputContent::Other => None,
                    })
                    .collect::<String>(),
            ),
            OutputItem::Other => None,
        })
        .filter(|text| !text.is_empty())
        .ok_or(AgentError::EmptyOutput)?;

    Ok(RunResult {
        id: body.id,
        final_output,
    })
}

#[async_trait]
impl AgentRunner for OpenAIResponsesRunner {
    async fn run(&self, request: RunRequest) -> Result<RunResult, AgentError> {
        let api_key = self.api_key.as_deref().ok_or(AgentError::MissingApiKey)?;

        let mut builder = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request);
        if let Some(org) = &self.organization_id {
            builder = builder.header("OpenAI-Organization", org);
        }
        if let Some(project) = &self.project_id {
            builder = builder.header("OpenAI-Project", project);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ResponseBody = response.json().await?;
        parse_response(body)
    }
}
