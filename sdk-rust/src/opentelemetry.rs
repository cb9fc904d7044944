use crate::{LanguageModelInput, LanguageModelResult, ModelResponse, ModelUsage};
use opentelemetry::trace::Status;
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Span covering a single `generate` call against a provider.
pub struct GenerateSpan {
    span: Span,
    usage: Option<ModelUsage>,
    start_time: Instant,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    seed: Option<i64>,
}

impl GenerateSpan {
    pub fn new(provider: &str, model_id: &str, input: &LanguageModelInput) -> Self {
        let span = info_span!("agentkit_sdk.generate");
        span.set_attribute("gen_ai.operation.name", "generate_content");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("gen_ai.request.model", model_id.to_string());

        Self {
            span,
            usage: None,
            start_time: Instant::now(),
            max_tokens: input.max_tokens,
            temperature: input.temperature,
            top_p: input.top_p,
            seed: input.seed,
        }
    }

    pub fn on_response(&mut self, response: &ModelResponse) {
        self.usage.clone_from(&response.usage);
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if let Some(usage) = &self.usage {
            self.span
                .set_attribute("gen_ai.usage.input_tokens", i64::from(usage.input_tokens));
            self.span
                .set_attribute("gen_ai.usage.output_tokens", i64::from(usage.output_tokens));
        }
        if let Some(max_tokens) = self.max_tokens {
            self.span
                .set_attribute("gen_ai.request.max_tokens", i64::from(max_tokens));
        }
        if let Some(temperature) = self.temperature {
            self.span
                .set_attribute("gen_ai.request.temperature", temperature);
        }
        if let Some(top_p) = self.top_p {
            self.span.set_attribute("gen_ai.request.top_p", top_p);
        }
        if let Some(seed) = self.seed {
            self.span.set_attribute("gen_ai.request.seed", seed);
        }
        self.span.set_attribute(
            "agentkit_sdk.duration_seconds",
            self.start_time.elapsed().as_secs_f64(),
        );
    }
}

pub async fn trace_generate<F, Fut>(
    provider: &str,
    model_id: &str,
    input: LanguageModelInput,
    f: F,
) -> LanguageModelResult<ModelResponse>
where
    F: FnOnce(LanguageModelInput) -> Fut,
    Fut: std::future::Future<Output = LanguageModelResult<ModelResponse>>,
{
    let mut span = GenerateSpan::new(provider, model_id, &input);
    let result = f(input).instrument(span.span.clone()).await;

    match &result {
        Ok(response) => span.on_response(response),
        Err(error) => {
            tracing::debug!(provider, model_id, %error, "generate failed");
            span.on_error(error);
        }
    }

    span.on_end();
    result
}
