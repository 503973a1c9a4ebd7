pub mod input_types;
pub mod output_types;
pub mod attachments;
pub mod message;
pub mod definition;
pub mod facade;

pub mod runner;

pub use input_types::*;
pub use output_types::*;
pub use definition::{AgentContext, AgentDefinition};
pub use facade::AgentFacade;
pub use message::{assemble_turn, ContentItem, ConversationTurn};
pub use runner::{AgentError, AgentRunner, OpenAIResponsesRunner};
