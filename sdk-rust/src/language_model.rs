use crate::{LanguageModelInput, LanguageModelResult, ModelResponse};

/// A chat completion model. Implementations map `LanguageModelInput` to a
/// provider request and the provider reply back to a `ModelResponse`.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> &'static str;
    fn model_id(&self) -> String;
    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse>;
}
