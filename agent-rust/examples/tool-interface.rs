use agentkit::{
    config::{load_dotenv, Settings},
    BaseAgentInput, BaseTool, BoxedError, IoSchema, ToolInterfaceAgent, ToolInterfaceAgentConfig,
};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

/// Apply an arithmetic operation to two numbers.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Calculation {
    operation: Operation,
    /// Left operand.
    a: f64,
    /// Right operand.
    b: f64,
}

impl IoSchema for Calculation {
    fn validate(&self) -> Result<(), String> {
        if !self.a.is_finite() || !self.b.is_finite() {
            return Err("operands must be finite numbers".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CalculationResult {
    value: f64,
}

struct Calculator;

#[async_trait]
impl BaseTool for Calculator {
    type Input = Calculation;
    type Output = CalculationResult;

    fn name(&self) -> String {
        "calculator".to_string()
    }

    async fn run(&self, input: Calculation) -> Result<CalculationResult, BoxedError> {
        let Calculation { operation, a, b } = input;
        let value = match operation {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide if b == 0.0 => return Err("division by zero".into()),
            Operation::Divide => a / b,
            Operation::Power => a.powf(b),
        };
        Ok(CalculationResult { value })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    load_dotenv();
    let settings = Settings::from_env()?;

    let mut processed = ToolInterfaceAgent::new(ToolInterfaceAgentConfig::new(
        settings.agent_config().name("calculator"),
        Calculator,
    ));
    let mut raw = ToolInterfaceAgent::new(
        ToolInterfaceAgentConfig::new(settings.agent_config().name("calculator-raw"), Calculator)
            .return_raw_output(true),
    );

    let question = "What is 2 to the power of 10, divided by 4?";
    println!("Question: {question}");

    let response = raw.run(BaseAgentInput::new(question)).await?;
    println!("Raw tool output: {}", response.chat_message);

    let response = processed.run(BaseAgentInput::new(question)).await?;
    println!("Answer: {}", response.chat_message);

    Ok(())
}
