use std::sync::Arc;

use crate::agent::{AgentDefinition, AgentFacade, AgentRunner, OpenAIResponsesRunner};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub agent: Arc<AgentFacade>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        if config.openai.api_key.as_deref().map_or(true, str::is_empty) {
            tracing::warn!("OPENAI_API_KEY is not set; chat requests will fail");
        }
        let runner = Arc::new(OpenAIResponsesRunner::new(&config.openai));
        Self::with_runner(config, runner)
    }

    /// Build state around any runner implementation
    pub fn with_runner(config: Config, runner: Arc<dyn AgentRunner>) -> Self {
        let definition = Arc::new(AgentDefinition::from_settings(&config.agent));
        Self {
            agent: Arc::new(AgentFacade::new(definition, runner)),
            config: Arc::new(config),
        }
    }
}
