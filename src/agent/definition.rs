use serde::{Deserialize, Serialize};

use crate::config::AgentSettings;

/// Amount of web context the search tool may pull in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UserLocation {
    Approximate { country: String },
}

/// Hosted capabilities available to the agent, fixed at construction time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentTool {
    /// Lookup over the pre-indexed family documents
    #[serde(rename = "file_search")]
    FileSearch { vector_store_ids: Vec<String> },
    #[serde(rename = "web_search_preview")]
    WebSearchPreview {
        search_context_size: SearchContextSize,
        user_location: UserLocation,
    },
}

/// Request-scoped context handed to the instructions generator
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub workflow_input_as_text: String,
}

pub type InstructionsFn = fn(&AgentContext) -> String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    pub store: bool,
}

/// Metadata attached to every run for tracing on the remote side
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub trace_name: String,
    pub trace_source: String,
    pub workflow_id: String,
}

/// Immutable agent definition, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    pub name: String,
    pub instructions: InstructionsFn,
    pub model: String,
    pub tools: Vec<AgentTool>,
    pub model_settings: ModelSettings,
    pub run_config: RunConfig,
}

impl AgentDefinition {
    pub fn from_settings(settings: &AgentSettings) -> Self {
        Self {
            name: settings.name.clone(),
            instructions: family_instructions,
            model: settings.model.clone(),
            tools: vec![
                AgentTool::FileSearch {
                    vector_store_ids: vec![settings.vector_store_id.clone()],
                },
                AgentTool::WebSearchPreview {
                    search_context_size: settings.search_context_size,
                    user_location: UserLocation::Approximate {
                        country: settings.country.clone(),
                    },
                },
            ],
            model_settings: ModelSettings {
                store: settings.store,
            },
            run_config: RunConfig {
                trace_name: settings.trace_name.clone(),
                trace_source: settings.trace_source.clone(),
                workflow_id: settings.workflow_id.clone(),
            },
        }
    }

    pub fn render_instructions(&self, context: &AgentContext) -> String {
        (self.instructions)(context)
    }
}

/// Catalan system prompt for the family assistant persona
pub fn family_instructions(context: &AgentContext) -> String {
    format!(
        "Ets un agent que dona suport i informació respecte la informació familiar com ara, aniversaris, llocs de naixement, parelles etcétera. \n\
         \n\
         A la pregunta:\n {}\n\
         \n\
         Vas a buscar la informació a la tool Arbre Familiar. En la respuesta no des la referencia de donde has obtenido la información.\n\
         També pots buscar informació a la web i analitzar imatges o PDFs que t'enviïn.\n\
         A la resposta no indiquis la referència origen.\n\
         Respon sempre en català i intenta ser breu.",
        context.workflow_input_as_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_two_tools() {
        let definition = AgentDefinition::from_settings(&AgentSettings::default());
        assert_eq!(definition.tools.len(), 2);
        assert_eq!(
            serde_json::to_value(&definition.tools).unwrap(),
            serde_json::json!([
                {
                    "type": "file_search",
                    "vector_store_ids": ["vs_6963e0d893648191981088fde3bb184f"]
                },
                {
                    "type": "web_search_preview",
                    "search_context_size": "medium",
                    "user_location": {"type": "approximate", "country": "ES"}
                }
            ])
        );
        assert!(definition.model_settings.store);
    }

    #[test]
    fn instructions_embed_the_question() {
        let definition = AgentDefinition::from_settings(&AgentSettings::default());
        let context = AgentContext {
            workflow_input_as_text: "Quan va néixer la iaia?".to_string(),
        };
        let rendered = definition.render_instructions(&context);
        assert!(rendered.contains("A la pregunta:\n Quan va néixer la iaia?\n"));
        assert!(rendered.starts_with("Ets un agent"));
        assert!(rendered.ends_with("Respon sempre en català i intenta ser breu."));
    }

    #[test]
    fn instructions_are_pure() {
        let context = AgentContext {
            workflow_input_as_text: "x".to_string(),
        };
        assert_eq!(family_instructions(&context), family_instructions(&context));
    }
}
