use crate::{errors::BoxedError, schema::schema_description, IoSchema};
use agentkit_sdk::JSONSchema;
use async_trait::async_trait;
use serde::Serialize;

/**
 * A callable with a typed input schema and a serializable output. Tools are
 * run by a `ToolInterfaceAgent` after the model has filled in the input.
 *
 * By default the tool is named after its input schema and described by the
 * input type's doc comment.
 */
#[async_trait]
pub trait BaseTool: Send + Sync {
    type Input: IoSchema;
    type Output: Serialize + Send + Sync;

    /// Name of the tool.
    fn name(&self) -> String {
        <Self::Input as schemars::JsonSchema>::schema_name().into_owned()
    }

    /// A description of the tool to instruct the model how and when to use it.
    fn description(&self) -> String {
        schema_description::<Self::Input>().unwrap_or_default()
    }

    /// The JSON schema of the input the tool accepts.
    fn input_schema(&self) -> JSONSchema {
        schemars::schema_for!(Self::Input).into()
    }

    /// Execute the tool. An error interrupts the agent and is propagated as
    /// `AgentError::ToolExecution`.
    async fn run(&self, input: Self::Input) -> Result<Self::Output, BoxedError>;
}

/// Overrides for the name and description a tool reports.
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A tool wrapped with a [`ToolConfig`].
#[derive(Debug, Clone)]
pub struct ConfiguredTool<T> {
    tool: T,
    config: ToolConfig,
}

impl<T: BaseTool> ConfiguredTool<T> {
    pub fn new(tool: T, config: ToolConfig) -> Self {
        Self { tool, config }
    }

    pub fn inner(&self) -> &T {
        &self.tool
    }
}

#[async_trait]
impl<T: BaseTool> BaseTool for ConfiguredTool<T> {
    type Input = T::Input;
    type Output = T::Output;

    fn name(&self) -> String {
        self.config
            .title
            .clone()
            .unwrap_or_else(|| self.tool.name())
    }

    fn description(&self) -> String {
        self.config
            .description
            .clone()
            .unwrap_or_else(|| self.tool.description())
    }

    fn input_schema(&self) -> JSONSchema {
        self.tool.input_schema()
    }

    async fn run(&self, input: Self::Input) -> Result<Self::Output, BoxedError> {
        self.tool.run(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    /// Adds two integers.
    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct AddInput {
        a: i64,
        b: i64,
    }

    impl IoSchema for AddInput {}

    struct AddTool;

    #[async_trait]
    impl BaseTool for AddTool {
        type Input = AddInput;
        type Output = i64;

        async fn run(&self, input: AddInput) -> Result<i64, BoxedError> {
            Ok(input.a + input.b)
        }
    }

    #[test]
    fn defaults_come_from_the_input_schema() {
        assert_eq!(AddTool.name(), "AddInput");
        assert_eq!(AddTool.description(), "Adds two integers.");
        assert_eq!(AddTool.input_schema()["properties"]["a"]["type"], "integer");
    }

    #[tokio::test]
    async fn configured_tool_overrides_name_and_description() {
        let tool = ConfiguredTool::new(
            AddTool,
            ToolConfig {
                title: Some("adder".to_string()),
                description: None,
            },
        );

        assert_eq!(tool.name(), "adder");
        assert_eq!(tool.description(), "Adds two integers.");
        assert_eq!(tool.run(AddInput { a: 2, b: 3 }).await.unwrap(), 5);
    }
}
