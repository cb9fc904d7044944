use crate::{
    history::Role,
    hooks::{HookEvent, HookId, HookPayload},
    opentelemetry, AgentError, BaseAgentConfig, BaseAgentInput, BaseAgentOutput, ChatHistory,
    ContextProvider, IoSchema, StructuredClient, SystemPromptGenerator,
};
use agentkit_sdk::LanguageModelInput;
use std::{marker::PhantomData, sync::Arc};

/// An agent that answers inputs of type `I` with outputs of type `O`.
///
/// Each call sends the generated system prompt followed by the chat history
/// to the model and parses the reply into the response model through a
/// [`StructuredClient`].
pub struct BaseAgent<I = BaseAgentInput, O = BaseAgentOutput> {
    pub name: String,
    client: StructuredClient,
    history: ChatHistory,
    initial_history: ChatHistory,
    system_prompt_generator: SystemPromptGenerator,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    presence_penalty: Option<f64>,
    frequency_penalty: Option<f64>,
    seed: Option<i64>,
    _schemas: PhantomData<fn(I) -> O>,
}

impl<I, O> BaseAgent<I, O>
where
    I: IoSchema,
    O: IoSchema,
{
    #[must_use]
    pub fn new(config: BaseAgentConfig) -> Self {
        let client = StructuredClient::new(config.model, crate::Hooks::new())
            .with_max_retries(config.max_retries);

        Self {
            name: config.name,
            client,
            initial_history: config.history.clone(),
            history: config.history,
            system_prompt_generator: config.system_prompt_generator,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
            seed: config.seed,
            _schemas: PhantomData,
        }
    }

    /// Record the input as a new turn, get a response and record it.
    pub async fn run(&mut self, input: I) -> Result<O, AgentError> {
        self.history.initialize_turn();
        self.history.add_message(Role::User, &input)?;

        let response: O = self.get_response().await?;
        self.history.add_message(Role::Assistant, &response)?;

        Ok(response)
    }

    /// Get a response for the current history without recording anything.
    /// The response model `R` is usually the agent's output type but can be
    /// any schema.
    pub async fn get_response<R: IoSchema>(&self) -> Result<R, AgentError> {
        let schema_name = <R as schemars::JsonSchema>::schema_name();
        tracing::debug!(agent = %self.name, response_model = %schema_name, "getting response");

        opentelemetry::trace_get_response(
            &self.name,
            &schema_name,
            self.client.create::<R>(self.model_input()),
        )
        .await
    }

    fn model_input(&self) -> LanguageModelInput {
        LanguageModelInput {
            system_prompt: Some(self.system_prompt_generator.generate()),
            messages: self.history.history(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
            seed: self.seed,
            ..Default::default()
        }
    }

    /// Restore the history the agent was created with.
    pub fn reset_history(&mut self) {
        self.history = self.initial_history.clone();
    }

    #[must_use]
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut ChatHistory {
        &mut self.history
    }

    #[must_use]
    pub fn system_prompt_generator(&self) -> &SystemPromptGenerator {
        &self.system_prompt_generator
    }

    pub fn system_prompt_generator_mut(&mut self) -> &mut SystemPromptGenerator {
        &mut self.system_prompt_generator
    }

    #[must_use]
    pub fn client(&self) -> &StructuredClient {
        &self.client
    }

    #[must_use]
    pub fn context_provider(&self, name: &str) -> Option<Arc<dyn ContextProvider>> {
        self.system_prompt_generator.context_provider(name)
    }

    pub fn register_context_provider(
        &mut self,
        name: impl Into<String>,
        provider: Arc<dyn ContextProvider>,
    ) {
        self.system_prompt_generator
            .register_context_provider(name, provider);
    }

    pub fn unregister_context_provider(&mut self, name: &str) -> Option<Arc<dyn ContextProvider>> {
        self.system_prompt_generator.unregister_context_provider(name)
    }

    /// Register a handler for one of the completion lifecycle events.
    pub fn register_hook<F>(&self, event: HookEvent, handler: F) -> HookId
    where
        F: Fn(&HookPayload<'_>) + Send + Sync + 'static,
    {
        self.client.hooks().on(event, handler)
    }

    pub fn unregister_hook(&self, event: HookEvent, id: HookId) -> bool {
        self.client.hooks().off(event, id)
    }

    /// Remove the handlers of one event, or all handlers when `None`.
    pub fn clear_hooks(&self, event: Option<HookEvent>) {
        self.client.hooks().clear(event);
    }

    pub fn enable_hooks(&self) {
        self.client.hooks().enable();
    }

    pub fn disable_hooks(&self) {
        self.client.hooks().disable();
    }

    #[must_use]
    pub fn hooks_enabled(&self) -> bool {
        self.client.hooks().is_enabled()
    }
}
