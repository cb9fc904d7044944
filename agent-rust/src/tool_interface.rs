use crate::{
    history::Role, opentelemetry, AgentError, BaseAgent, BaseAgentConfig, BaseAgentInput,
    BaseAgentOutput, BaseTool, IoSchema,
};

/// Configuration of a [`ToolInterfaceAgent`].
pub struct ToolInterfaceAgentConfig<T> {
    pub agent: BaseAgentConfig,
    /// The tool the agent calls.
    pub tool: T,
    /// Return the tool output as the chat message instead of having the model
    /// answer from it.
    pub return_raw_output: bool,
}

impl<T> ToolInterfaceAgentConfig<T> {
    pub fn new(agent: BaseAgentConfig, tool: T) -> Self {
        Self {
            agent,
            tool,
            return_raw_output: false,
        }
    }

    #[must_use]
    pub fn return_raw_output(mut self, return_raw_output: bool) -> Self {
        self.return_raw_output = return_raw_output;
        self
    }
}

/// An agent that answers the user by calling a single tool.
///
/// The model first turns the conversation into the tool's input, the tool is
/// run, and then the model answers from the tool output. With
/// `return_raw_output` the tool output is returned directly as JSON.
pub struct ToolInterfaceAgent<T: BaseTool> {
    agent: BaseAgent<BaseAgentInput, BaseAgentOutput>,
    tool: T,
    return_raw_output: bool,
}

impl<T: BaseTool> ToolInterfaceAgent<T> {
    #[must_use]
    pub fn new(config: ToolInterfaceAgentConfig<T>) -> Self {
        let ToolInterfaceAgentConfig {
            mut agent,
            tool,
            return_raw_output,
        } = config;

        let tool_name = tool.name();
        let output_instructions = [
            "Make sure the tool call will maximize the utility of the tool in the context of the user input.",
            if return_raw_output {
                "The output of the tool is returned to the user as-is."
            } else {
                "Process the output of the tool into a human readable format and/or use it to respond to the user input."
            },
        ];

        // context providers registered on the config are kept
        let generator = agent.system_prompt_generator;
        agent.system_prompt_generator = generator
            .background([
                format!("This AI agent is designed to interact with the {tool_name} tool."),
                format!("Tool description: {}", tool.description()),
            ])
            .steps([
                "Get the user input.",
                "Convert the input to the proper parameters to call the tool.",
                "Call the tool with the parameters.",
                "Respond to the user",
            ])
            .output_instructions(output_instructions);

        Self {
            agent: BaseAgent::new(agent),
            tool,
            return_raw_output,
        }
    }

    #[must_use]
    pub fn tool(&self) -> &T {
        &self.tool
    }

    #[must_use]
    pub fn return_raw_output(&self) -> bool {
        self.return_raw_output
    }

    /// The underlying agent, for history, context provider and hook access.
    #[must_use]
    pub fn agent(&self) -> &BaseAgent<BaseAgentInput, BaseAgentOutput> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut BaseAgent<BaseAgentInput, BaseAgentOutput> {
        &mut self.agent
    }

    /// Record the input as a new turn, get a response and record it.
    pub async fn run(&mut self, input: BaseAgentInput) -> Result<BaseAgentOutput, AgentError> {
        self.agent.history_mut().initialize_turn();
        self.agent.history_mut().add_message(Role::User, &input)?;

        let response = self.get_response().await?;
        self.agent
            .history_mut()
            .add_message(Role::Assistant, &response)?;

        Ok(response)
    }

    /// Ask the model for the tool input, run the tool and respond.
    pub async fn get_response(&mut self) -> Result<BaseAgentOutput, AgentError> {
        self.get_response_with::<BaseAgentOutput>().await
    }

    /// Like [`ToolInterfaceAgent::get_response`], but the answer built from
    /// the tool output is parsed into the response model `R`. With
    /// `return_raw_output` there is no second completion and the raw output
    /// is converted from a [`BaseAgentOutput`].
    pub async fn get_response_with<R>(&mut self) -> Result<R, AgentError>
    where
        R: IoSchema + From<BaseAgentOutput>,
    {
        let tool_input: T::Input = self.agent.get_response().await?;
        let tool_call = serde_json::to_string(&tool_input)?;

        let tool_name = self.tool.name();
        tracing::info!(tool = %tool_name, input = %tool_call, "calling tool");
        let output = opentelemetry::trace_tool_run(
            &tool_name,
            &self.tool.description(),
            self.tool.run(tool_input),
        )
        .await
        .map_err(AgentError::ToolExecution)?;
        let tool_output = serde_json::to_string(&output)?;

        if self.return_raw_output {
            return Ok(BaseAgentOutput::new(tool_output).into());
        }

        let snapshot = self.agent.history().clone();
        let history = self.agent.history_mut();
        history.add_message(Role::Assistant, &format!("TOOL CALL: {tool_call}"))?;
        history.add_message(Role::Assistant, &format!("TOOL RESPONSE: {tool_output}"))?;
        history.add_message(
            Role::Assistant,
            "I will now formulate a response for the user based on the tool output.",
        )?;

        let response = self.agent.get_response::<R>().await;
        if response.is_err() {
            // the tool exchange only stays when it produced an answer
            *self.agent.history_mut() = snapshot;
        }
        response
    }
}
