use crate::{structured::DEFAULT_MAX_RETRIES, AgentError, BaseAgentConfig};
use agentkit_sdk::{
    openai::{OpenAIChatModel, OpenAIChatModelOptions},
    LanguageModel,
};
use std::{env, sync::Arc};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Upper bound accepted for `AGENTKIT_MAX_RETRIES`.
pub const MAX_RETRIES_LIMIT: usize = 100;

/// Settings read from the environment.
///
/// | variable               | required | default        |
/// |------------------------|----------|----------------|
/// | `OPENAI_API_KEY`       | yes      |                |
/// | `OPENAI_BASE_URL`      | no       | `OpenAI` API   |
/// | `AGENTKIT_MODEL`       | no       | `gpt-4o-mini`  |
/// | `AGENTKIT_MAX_RETRIES` | no       | 3              |
/// | `YOUTUBE_API_KEY`      | no       |                |
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub model: String,
    pub max_retries: usize,
    /// Key for tools that call the `YouTube` Data API.
    pub youtube_api_key: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let openai_api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| AgentError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let max_retries = match get("AGENTKIT_MAX_RETRIES") {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|retries| *retries <= MAX_RETRIES_LIMIT)
                .ok_or_else(|| {
                    AgentError::Config(format!(
                        "AGENTKIT_MAX_RETRIES must be an integer from 0 to {MAX_RETRIES_LIMIT}, got {value:?}"
                    ))
                })?,
            None => DEFAULT_MAX_RETRIES,
        };

        Ok(Self {
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL"),
            model: get("AGENTKIT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_retries,
            youtube_api_key: get("YOUTUBE_API_KEY"),
        })
    }

    /// The `OpenAI` chat model these settings describe.
    #[must_use]
    pub fn openai_model(&self) -> Arc<dyn LanguageModel + Send + Sync> {
        Arc::new(OpenAIChatModel::new(
            self.model.clone(),
            OpenAIChatModelOptions {
                api_key: self.openai_api_key.clone(),
                base_url: self.openai_base_url.clone(),
                ..Default::default()
            },
        ))
    }

    /// An agent configuration using the configured model and retry budget.
    #[must_use]
    pub fn agent_config(&self) -> BaseAgentConfig {
        BaseAgentConfig::new(self.openai_model()).max_retries(self.max_retries)
    }

    /// The `YouTube` API key, or a configuration error naming the variable.
    pub fn require_youtube_api_key(&self) -> Result<&str, AgentError> {
        self.youtube_api_key
            .as_deref()
            .ok_or_else(|| AgentError::Config("YOUTUBE_API_KEY is not set".to_string()))
    }
}

/// Load variables from a `.env` file in the current directory or its
/// parents. A missing file is not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(error) if error.not_found() => {}
        Err(error) => tracing::warn!(%error, "failed to load .env file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_api_key_is_set() {
        let settings = Settings::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(settings.openai_api_key, "sk-test");
        assert_eq!(settings.openai_base_url, None);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(settings.youtube_api_key, None);
        assert!(settings.require_youtube_api_key().is_err());
    }

    #[test]
    fn reads_all_variables() {
        let settings = Settings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("AGENTKIT_MODEL", "gpt-4o"),
            ("AGENTKIT_MAX_RETRIES", "5"),
            ("YOUTUBE_API_KEY", "yt-key"),
        ]))
        .unwrap();

        assert_eq!(
            settings.openai_base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.require_youtube_api_key().unwrap(), "yt-key");
        assert_eq!(settings.openai_model().model_id(), "gpt-4o");
    }

    #[test]
    fn missing_or_blank_api_key_is_an_error() {
        for vars in [vec![], vec![("OPENAI_API_KEY", "   ")]] {
            let error = Settings::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(error, AgentError::Config(ref message) if message.contains("OPENAI_API_KEY")));
        }
    }

    #[test]
    fn invalid_max_retries_is_an_error() {
        let error = Settings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("AGENTKIT_MAX_RETRIES", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(error, AgentError::Config(_)));
    }

    #[test]
    fn max_retries_above_limit_is_an_error() {
        for value in ["101", "18446744073709551615"] {
            let error = Settings::from_lookup(lookup(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("AGENTKIT_MAX_RETRIES", value),
            ]))
            .unwrap_err();
            assert!(matches!(error, AgentError::Config(ref message) if message.contains("0 to 100")));
        }

        let settings = Settings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("AGENTKIT_MAX_RETRIES", "100"),
        ]))
        .unwrap();
        assert_eq!(settings.max_retries, MAX_RETRIES_LIMIT);
    }

    #[test]
    fn debug_redacts_keys() {
        let settings = Settings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-secret"),
            ("YOUTUBE_API_KEY", "yt-secret"),
        ]))
        .unwrap();
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("yt-secret"));
    }
}
