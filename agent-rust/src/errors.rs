use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Language model error: {0}")]
    LanguageModel(#[from] agentkit_sdk::LanguageModelError),
    /// The model output could not be turned into the requested response model
    /// within the allowed attempts. Holds the last validation error.
    #[error("Response validation failed after {attempts} attempt(s): {message}")]
    Validation { attempts: usize, message: String },
    #[error("Tool execution error: {0}")]
    ToolExecution(#[source] BoxedError),
    #[error("Unknown hook event: {0}")]
    UnknownHookEvent(String),
    #[error("Turn {0} not found in chat history")]
    TurnNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invariant: {0}")]
    Invariant(String),
}

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;
