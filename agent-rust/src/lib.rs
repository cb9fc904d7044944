mod agent;
pub mod config;
mod errors;
pub mod history;
pub mod hooks;
mod opentelemetry;
mod params;
mod schema;
mod structured;
mod system_prompt;
mod tool;
mod tool_interface;

pub use agent::BaseAgent;
pub use errors::{AgentError, BoxedError};
pub use history::{ChatHistory, HistoryMessage, Role};
pub use hooks::{HookEvent, HookId, HookPayload, Hooks, ParseErrorInfo};
pub use params::BaseAgentConfig;
pub use schema::{schema_description, BaseAgentInput, BaseAgentOutput, IoSchema};
pub use structured::{StructuredClient, DEFAULT_MAX_RETRIES};
pub use system_prompt::{ContextProvider, SystemPromptGenerator};
pub use tool::{BaseTool, ConfiguredTool, ToolConfig};
pub use tool_interface::{ToolInterfaceAgent, ToolInterfaceAgentConfig};
