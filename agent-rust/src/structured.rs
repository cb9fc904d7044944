use crate::{
    hooks::{HookPayload, Hooks, ParseErrorInfo},
    AgentError, IoSchema,
};
use agentkit_sdk::{LanguageModel, LanguageModelInput, Message};
use serde_json::Value;
use std::sync::Arc;

/// Default number of re-asks after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// A completion client that returns validated, typed responses.
///
/// Each call asks the model for JSON matching the response model's schema.
/// When the output does not deserialize or fails [`IoSchema::validate`], the
/// model's output and the error are appended to the conversation and the
/// model is asked again, up to `max_retries` times. Errors from the model
/// itself are returned immediately.
#[derive(Clone)]
pub struct StructuredClient {
    model: Arc<dyn LanguageModel + Send + Sync>,
    hooks: Hooks,
    max_retries: usize,
}

impl StructuredClient {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel + Send + Sync>, hooks: Hooks) -> Self {
        Self {
            model,
            hooks,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    #[must_use]
    pub fn model(&self) -> &Arc<dyn LanguageModel + Send + Sync> {
        &self.model
    }

    #[must_use]
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Request a completion and parse it into `R`. Any response format set on
    /// `input` is replaced by the schema of `R`.
    pub async fn create<R: IoSchema>(&self, mut input: LanguageModelInput) -> Result<R, AgentError> {
        input.response_format = Some(R::response_format());
        let max_attempts = self.max_retries.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            let kwargs = self.completion_kwargs(&input)?;
            self.hooks.emit(&HookPayload::CompletionKwargs(&kwargs));

            tracing::debug!(
                attempt,
                max_attempts,
                model = %self.model.model_id(),
                "requesting structured completion"
            );

            let response = match self.model.generate(input.clone()).await {
                Ok(response) => response,
                Err(error) => {
                    self.hooks.emit(&HookPayload::CompletionError(&error));
                    return Err(error.into());
                }
            };
            self.hooks.emit(&HookPayload::CompletionResponse(&response));

            let raw = response.text();
            match parse_response::<R>(raw.as_deref()) {
                Ok(value) => return Ok(value),
                Err(message) => {
                    tracing::warn!(attempt, max_attempts, error = %message, "model output failed validation");
                    self.hooks.emit(&HookPayload::ParseError(&ParseErrorInfo {
                        attempt,
                        message: message.clone(),
                        raw: raw.clone(),
                    }));

                    if let Some(raw) = raw {
                        input.messages.push(Message::assistant(raw));
                    }
                    input.messages.push(Message::user(reask_message(&message)));
                    last_error = message;
                }
            }
        }

        Err(AgentError::Validation {
            attempts: max_attempts,
            message: last_error,
        })
    }

    fn completion_kwargs(&self, input: &LanguageModelInput) -> Result<Value, AgentError> {
        let mut kwargs = serde_json::to_value(input)?;
        if let Value::Object(map) = &mut kwargs {
            map.insert("model".to_string(), Value::String(self.model.model_id()));
        }
        Ok(kwargs)
    }
}

fn reask_message(error: &str) -> String {
    format!("Recall the function correctly, fix the errors and exceptions found\n{error}")
}

fn parse_response<R: IoSchema>(raw: Option<&str>) -> Result<R, String> {
    let raw = raw.ok_or_else(|| "the response did not contain any text".to_string())?;
    let value: R = serde_json::from_str(extract_json(raw)).map_err(|error| error.to_string())?;
    value.validate()?;
    Ok(value)
}

/// Strip a Markdown code fence around the JSON body, if there is one.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(body) = rest.trim_end().strip_suffix("```") {
            return body.trim();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BaseAgentOutput;

    #[test]
    fn extract_json_strips_fences() {
        assert_eq!(extract_json("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(extract_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("```\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(extract_json("```json {\"a\":1}"), "```json {\"a\":1}");
    }

    #[test]
    fn parse_response_runs_validation() {
        let parsed = parse_response::<BaseAgentOutput>(Some(r#"{"chat_message":"hi"}"#));
        assert_eq!(parsed.unwrap(), BaseAgentOutput::new("hi"));

        let blank = parse_response::<BaseAgentOutput>(Some(r#"{"chat_message":" "}"#));
        assert_eq!(blank.unwrap_err(), "chat_message must not be empty");

        assert!(parse_response::<BaseAgentOutput>(None).is_err());
        assert!(parse_response::<BaseAgentOutput>(Some("{}")).is_err());
    }
}
