use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::agent::definition::{AgentContext, AgentDefinition};
use crate::agent::message::ConversationTurn;
use crate::agent::runner::{AgentError, AgentRunner, RunRequest};

/// Translates one assembled user turn into a remote agent run.
/// Holds only read-only state, so it is shared across requests as-is.
pub struct AgentFacade {
    definition: Arc<AgentDefinition>,
    runner: Arc<dyn AgentRunner>,
}

impl AgentFacade {
    pub fn new(definition: Arc<AgentDefinition>, runner: Arc<dyn AgentRunner>) -> Self {
        info!(
            "Agent '{}' ready: model={}, tools={}",
            definition.name,
            definition.model,
            definition.tools.len()
        );
        Self { definition, runner }
    }

    /// Build the run request for a turn. The input holds exactly this one turn.
    pub fn build_request(&self, turn: ConversationTurn, context: &AgentContext) -> RunRequest {
        let run_config = &self.definition.run_config;
        let mut metadata = BTreeMap::new();
        metadata.insert("__trace_source__".to_string(), run_config.trace_source.clone());
        metadata.insert("workflow_id".to_string(), run_config.workflow_id.clone());

        RunRequest {
            model: self.definition.model.clone(),
            instructions: self.definition.render_instructions(context),
            input: vec![turn],
            tools: self.definition.tools.clone(),
            store: self.definition.model_settings.store,
            metadata,
        }
    }

    /// Run the agent once and return its final text. No retry, no timeout.
    pub async fn execute(
        &self,
        turn: ConversationTurn,
        context: AgentContext,
    ) -> Result<String, AgentError> {
        let run_config = &self.definition.run_config;
        let span = info_span!(
            "agent_run",
            trace = %run_config.trace_name,
            workflow_id = %run_config.workflow_id,
        );

        let request = self.build_request(turn, &context);
        let result = self.runner.run(request).instrument(span.clone()).await?;
        span.in_scope(|| {
            info!(
                "Run {} completed",
                result.id.as_deref().unwrap_or("<unknown>")
            )
        });
        Ok(result.final_output)
    }
}
