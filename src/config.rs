use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::agent::definition::SearchContextSize;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub openai: OpenAIConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Attachments travel base64-encoded inside the JSON body, so the
    /// framework's 2 MB default is far too small.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Static definition of the family assistant agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Knowledge store holding the family tree documents
    #[serde(default = "default_vector_store_id")]
    pub vector_store_id: String,
    #[serde(default)]
    pub search_context_size: SearchContextSize,
    /// ISO country used as the approximate web-search location
    #[serde(default = "default_country")]
    pub country: String,
    /// Persist runs on the remote side
    #[serde(default = "default_true")]
    pub store: bool,
    #[serde(default = "default_trace_name")]
    pub trace_name: String,
    #[serde(default = "default_trace_source")]
    pub trace_source: String,
    #[serde(default = "default_workflow_id")]
    pub workflow_id: String,
}

fn default_agent_name() -> String {
    "Gestor familiar".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_vector_store_id() -> String {
    "vs_6963e0d893648191981088fde3bb184f".to_string()
}

fn default_country() -> String {
    "ES".to_string()
}

fn default_true() -> bool {
    true
}

fn default_trace_name() -> String {
    "agent familiar".to_string()
}

fn default_trace_source() -> String {
    "agent-builder".to_string()
}

fn default_workflow_id() -> String {
    "wf_69678af259b88190b90406b5dee162630cb508e02a638d96".to_string()
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            model: default_model(),
            vector_store_id: default_vector_store_id(),
            search_context_size: SearchContextSize::default(),
            country: default_country(),
            store: default_true(),
            trace_name: default_trace_name(),
            trace_source: default_trace_source(),
            workflow_id: default_workflow_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            organization_id: None,
            project_id: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML or JSON file, substituting `${VAR}`
    /// references with environment values first.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }
        let content = substitute_env_vars(&fs::read_to_string(path)?);

        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Find a configuration file, fall back to defaults, then apply
    /// environment overrides.
    pub fn resolve() -> Result<Self> {
        let candidates: Vec<String> = vec![
            std::env::var("CONFIG_PATH").ok(),
            Some("conf.yaml".to_string()),
            Some("conf.json".to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut config = None;
        for path in &candidates {
            match Config::load(path) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from: {}", path);
                    config = Some(cfg);
                    break;
                }
                Err(e) => debug!("Failed to load config from {}: {}", path, e),
            }
        }

        let mut config = config.unwrap_or_else(|| {
            tracing::info!("No configuration file found, using defaults");
            Config::default()
        });
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides. The lookup is injected so tests don't
    /// have to mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", port, e))?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(org) = lookup("OPENAI_ORG_ID") {
            self.openai.organization_id = Some(org);
        }
        if let Some(project) = lookup("OPENAI_PROJECT_ID") {
            self.openai.project_id = Some(project);
        }
        Ok(())
    }
}

/// Replace `${VAR_NAME}` with the variable's value, leaving unknown
/// references untouched.
fn substitute_env_vars(content: &str) -> String {
    substitute_with(content, |name| std::env::var(name).ok())
}

fn substitute_with<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("static pattern");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
