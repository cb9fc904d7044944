use super::chat_api::{
    ChatCompletionRequestMessage, ChatCompletionTextMessage, CompletionUsage,
    CreateChatCompletionRequest, CreateChatCompletionResponse, ResponseFormat,
    ResponseFormatJSONSchema, ResponseFormatJSONSchemaJSONSchema,
};
use crate::{
    client_utils, LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult,
    Message, ModelResponse, ModelUsage, Part, ResponseFormatOption,
};
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::collections::HashMap;

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIChatModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct OpenAIChatModelOptions {
    pub base_url: Option<String>,
    pub api_key: String,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl OpenAIChatModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: OpenAIChatModelOptions) -> Self {
        let OpenAIChatModelOptions {
            base_url,
            api_key,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client: client.unwrap_or_default(),
            headers: headers.unwrap_or_default(),
        }
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut auth_header =
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid OpenAI API key header value: {error}"
                ))
            })?;
        auth_header.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_header);

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid OpenAI header name '{key}': {error}"
                ))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid OpenAI header value for '{key}': {error}"
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for OpenAIChatModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        crate::opentelemetry::trace_generate(
            self.provider(),
            &self.model_id,
            input,
            |input| async move {
                let request = convert_to_openai_create_params(input, &self.model_id);
                let headers = self.request_headers()?;

                let response: CreateChatCompletionResponse = client_utils::send_json(
                    &self.client,
                    &format!("{}/chat/completions", self.base_url),
                    &request,
                    headers,
                )
                .await?;

                let choice = response.choices.into_iter().next().ok_or_else(|| {
                    LanguageModelError::Invariant(PROVIDER, "No choices in response".to_string())
                })?;

                let message = choice.message;

                if let Some(refusal) = message.refusal {
                    if !refusal.is_empty() {
                        return Err(LanguageModelError::Refusal(refusal));
                    }
                }

                let content = message
                    .content
                    .filter(|text| !text.is_empty())
                    .map(|text| vec![Part::text(text)])
                    .unwrap_or_default();

                Ok(ModelResponse {
                    content,
                    usage: response.usage.map(map_openai_usage),
                })
            },
        )
        .await
    }
}

fn convert_to_openai_create_params(
    input: LanguageModelInput,
    model_id: &str,
) -> CreateChatCompletionRequest {
    CreateChatCompletionRequest {
        model: model_id.to_string(),
        messages: convert_to_openai_messages(input.messages, input.system_prompt),
        response_format: input
            .response_format
            .map(convert_to_openai_response_format),
        max_completion_tokens: input.max_tokens,
        temperature: input.temperature,
        top_p: input.top_p,
        presence_penalty: input.presence_penalty,
        frequency_penalty: input.frequency_penalty,
        seed: input.seed,
    }
}

fn convert_to_openai_messages(
    messages: Vec<Message>,
    system_prompt: Option<String>,
) -> Vec<ChatCompletionRequestMessage> {
    let mut openai_messages = Vec::with_capacity(messages.len() + 1);

    if let Some(prompt) = system_prompt {
        openai_messages.push(ChatCompletionRequestMessage::System(
            ChatCompletionTextMessage { content: prompt },
        ));
    }

    for message in messages {
        let content = join_text(message.content());
        openai_messages.push(match message {
            Message::User(_) => {
                ChatCompletionRequestMessage::User(ChatCompletionTextMessage { content })
            }
            Message::Assistant(_) => {
                ChatCompletionRequestMessage::Assistant(ChatCompletionTextMessage { content })
            }
        });
    }

    openai_messages
}

fn join_text(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(Part::as_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_to_openai_response_format(response_format: ResponseFormatOption) -> ResponseFormat {
    match response_format {
        ResponseFormatOption::Text => ResponseFormat::Text,
        ResponseFormatOption::Json(json) => ResponseFormat::JsonSchema(ResponseFormatJSONSchema {
            json_schema: ResponseFormatJSONSchemaJSONSchema {
                name: json.name,
                description: json.description,
                schema: json.schema,
                strict: Some(false),
            },
        }),
    }
}

fn map_openai_usage(usage: CompletionUsage) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
    }
}
