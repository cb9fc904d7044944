use crate::{structured::DEFAULT_MAX_RETRIES, ChatHistory, SystemPromptGenerator};
use agentkit_sdk::LanguageModel;
use std::sync::Arc;

/// Parameters required to create a new agent.
/// # Default Values
/// - `name`: `"agent"`
/// - `history`: empty, unbounded
/// - `system_prompt_generator`: no background, steps or context providers
/// - `max_retries`: 3
/// - `max_tokens`: `None`
/// - `temperature`: `None`
/// - `top_p`: `None`
/// - `presence_penalty`: `None`
/// - `frequency_penalty`: `None`
/// - `seed`: `None`
#[derive(Clone)]
pub struct BaseAgentConfig {
    pub name: String,
    /// The language model the agent sends completions to.
    pub model: Arc<dyn LanguageModel + Send + Sync>,
    /// The conversation history the agent starts with. Resetting the agent
    /// restores this history.
    pub history: ChatHistory,
    pub system_prompt_generator: SystemPromptGenerator,
    /// How many times the model is re-asked when its output fails
    /// validation.
    pub max_retries: usize,
    /// The maximum number of tokens that can be generated per completion.
    pub max_tokens: Option<u32>,
    /// Amount of randomness injected into the response. Ranges from 0.0 to 1.0
    pub temperature: Option<f64>,
    /// An alternative to sampling with temperature, called nucleus sampling,
    /// where the model considers the results of the tokens with `top_p`
    /// probability mass. Ranges from 0.0 to 1.0
    pub top_p: Option<f64>,
    /// Positive values penalize new tokens based on whether they appear in the
    /// text so far, increasing the model's likelihood to talk about new
    /// topics.
    pub presence_penalty: Option<f64>,
    /// Positive values penalize new tokens based on their existing frequency in
    /// the text so far, decreasing the model's likelihood to repeat the
    /// same line verbatim.
    pub frequency_penalty: Option<f64>,
    /// The seed, if supported by the model, to enable deterministic results.
    pub seed: Option<i64>,
}

impl BaseAgentConfig {
    pub fn new(model: Arc<dyn LanguageModel + Send + Sync>) -> Self {
        Self {
            name: "agent".to_string(),
            model,
            history: ChatHistory::default(),
            system_prompt_generator: SystemPromptGenerator::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            max_tokens: None,
            temperature: None,
            top_p: None,
            presence_penalty: None,
            frequency_penalty: None,
            seed: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn history(mut self, history: ChatHistory) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn system_prompt_generator(mut self, generator: SystemPromptGenerator) -> Self {
        self.system_prompt_generator = generator;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the `top_p` for nucleus sampling
    #[must_use]
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    #[must_use]
    pub fn presence_penalty(mut self, presence_penalty: f64) -> Self {
        self.presence_penalty = Some(presence_penalty);
        self
    }

    #[must_use]
    pub fn frequency_penalty(mut self, frequency_penalty: f64) -> Self {
        self.frequency_penalty = Some(frequency_penalty);
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }
}
