use agentkit_sdk::{ResponseFormatJson, ResponseFormatOption};
use schemars::{JsonSchema, Schema};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// A structured record exchanged with the model or a tool.
///
/// The JSON schema derived with `schemars` is sent to the model as the
/// response format, and doc comments on the type and its fields become the
/// schema descriptions the model sees. After deserialization, `validate` is
/// run; returning an error makes the structured client re-ask the model with
/// the error message.
pub trait IoSchema: JsonSchema + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Checks that go beyond what the JSON schema can express.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// The response format asking the model for this schema.
    #[must_use]
    fn response_format() -> ResponseFormatOption
    where
        Self: Sized,
    {
        let schema = schemars::schema_for!(Self);
        let description = description_of(&schema);

        ResponseFormatOption::Json(ResponseFormatJson {
            name: response_format_name(&Self::schema_name()),
            description,
            schema: Some(schema.into()),
        })
    }
}

/// The top-level description of a schema, taken from the type's doc comment.
#[must_use]
pub fn schema_description<T: JsonSchema>() -> Option<String> {
    description_of(&schemars::schema_for!(T))
}

fn description_of(schema: &Schema) -> Option<String> {
    schema
        .as_object()
        .and_then(|object| object.get("description"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Response format names may only contain a-z, A-Z, 0-9, underscores and
/// dashes, up to 64 characters.
fn response_format_name(schema_name: &str) -> String {
    let name: String = schema_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect();
    if name.is_empty() {
        "response".to_string()
    } else {
        name
    }
}

/// Input from the user to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BaseAgentInput {
    /// The chat message sent by the user to the assistant.
    pub chat_message: String,
}

impl BaseAgentInput {
    pub fn new(chat_message: impl Into<String>) -> Self {
        Self {
            chat_message: chat_message.into(),
        }
    }
}

impl IoSchema for BaseAgentInput {}

/// The response generated by the chat agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BaseAgentOutput {
    /// The chat message exchanged between the user and the chat agent. This
    /// contains the markdown-enabled response generated by the chat agent.
    pub chat_message: String,
}

impl BaseAgentOutput {
    pub fn new(chat_message: impl Into<String>) -> Self {
        Self {
            chat_message: chat_message.into(),
        }
    }
}

impl IoSchema for BaseAgentOutput {
    fn validate(&self) -> Result<(), String> {
        if self.chat_message.trim().is_empty() {
            return Err("chat_message must not be empty".to_string());
        }
        Ok(())
    }
}
