use crate::{errors::BoxedError, AgentError};
use opentelemetry::trace::Status;
use std::{error::Error, future::Future};
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

fn record_error(span: &Span, error: &(dyn Error + 'static)) {
    span.set_attribute("exception.message", error.to_string());
    span.set_status(Status::error(error.to_string()));
}

pub async fn trace_get_response<Fut, T>(
    agent_name: &str,
    response_model: &str,
    future: Fut,
) -> Result<T, AgentError>
where
    Fut: Future<Output = Result<T, AgentError>> + Send,
{
    let span = info_span!("agentkit.get_response");
    span.set_attribute("gen_ai.operation.name", "invoke_agent");
    span.set_attribute("gen_ai.agent.name", agent_name.to_string());
    span.set_attribute("agentkit.response_model", response_model.to_string());

    let result = future.instrument(span.clone()).await;
    if let Err(error) = &result {
        record_error(&span, error);
    }
    result
}

pub async fn trace_tool_run<Fut, T>(
    tool_name: &str,
    tool_description: &str,
    future: Fut,
) -> Result<T, BoxedError>
where
    Fut: Future<Output = Result<T, BoxedError>> + Send,
{
    let span = info_span!("agentkit.tool");
    span.set_attribute("gen_ai.operation.name", "execute_tool");
    span.set_attribute("gen_ai.tool.name", tool_name.to_string());
    span.set_attribute("gen_ai.tool.description", tool_description.to_string());
    span.set_attribute("gen_ai.tool.type", "function");

    let result = future.instrument(span.clone()).await;
    if let Err(error) = &result {
        record_error(&span, error.as_ref());
    }
    result
}
