use agentkit::{
    config::{load_dotenv, Settings},
    BaseAgent, BaseAgentInput, HookEvent, HookPayload, IoSchema, Role,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    sync::{Arc, Mutex},
    time::Instant,
};
use tracing_subscriber::EnvFilter;

/// Information about a person mentioned in the text.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct UserInfo {
    /// Full name of the person.
    name: String,
    /// Age in years.
    age: u32,
    /// Email address, if one was given.
    email: Option<String>,
}

impl IoSchema for UserInfo {
    fn validate(&self) -> Result<(), String> {
        if self.age > 150 {
            return Err(format!("age {} is not realistic", self.age));
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(format!("{email:?} is not a valid email address"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Metrics {
    requests: usize,
    responses: usize,
    completion_errors: usize,
    parse_errors: usize,
    started_at: Option<Instant>,
    response_times_ms: Vec<u128>,
}

impl Metrics {
    fn report(&self) {
        let average = if self.response_times_ms.is_empty() {
            0
        } else {
            self.response_times_ms.iter().sum::<u128>() / self.response_times_ms.len() as u128
        };
        println!("--- metrics ---");
        println!("requests:          {}", self.requests);
        println!("responses:         {}", self.responses);
        println!("completion errors: {}", self.completion_errors);
        println!("parse errors:      {}", self.parse_errors);
        println!("avg response time: {average} ms");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    load_dotenv();
    let settings = Settings::from_env()?;

    let mut agent: BaseAgent = BaseAgent::new(settings.agent_config().name("extractor"));
    let metrics = Arc::new(Mutex::new(Metrics::default()));

    let m = metrics.clone();
    agent.register_hook(HookEvent::CompletionKwargs, move |_| {
        let mut metrics = m.lock().unwrap();
        metrics.requests += 1;
        metrics.started_at = Some(Instant::now());
    });

    let m = metrics.clone();
    agent.register_hook(HookEvent::CompletionResponse, move |payload| {
        let mut metrics = m.lock().unwrap();
        metrics.responses += 1;
        if let Some(started_at) = metrics.started_at.take() {
            metrics.response_times_ms.push(started_at.elapsed().as_millis());
        }
        if let HookPayload::CompletionResponse(response) = payload {
            if let Some(usage) = &response.usage {
                println!(
                    "[hook] tokens: {} in, {} out",
                    usage.input_tokens, usage.output_tokens
                );
            }
        }
    });

    let m = metrics.clone();
    agent.register_hook(HookEvent::CompletionError, move |payload| {
        m.lock().unwrap().completion_errors += 1;
        if let HookPayload::CompletionError(error) = payload {
            println!("[hook] completion failed: {error}");
        }
    });

    let m = metrics.clone();
    agent.register_hook(HookEvent::ParseError, move |payload| {
        m.lock().unwrap().parse_errors += 1;
        if let HookPayload::ParseError(info) = payload {
            println!("[hook] attempt {} rejected: {}", info.attempt, info.message);
        }
    });

    let texts = [
        "Hi, I'm John Smith, 29 years old, reach me at john@example.com.",
        "Jane Doe is 210 years old and her email is jane-at-example.com.",
    ];

    for text in texts {
        agent.reset_history();
        agent
            .history_mut()
            .add_message(Role::User, &BaseAgentInput::new(text))?;

        match agent.get_response::<UserInfo>().await {
            Ok(info) => println!("extracted: {info:?}"),
            Err(error) => println!("extraction failed: {error}"),
        }
    }

    metrics.lock().unwrap().report();
    Ok(())
}
