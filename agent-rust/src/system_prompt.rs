use std::{fmt::Debug, sync::Arc};

/// Supplies dynamic information that is rendered into the system prompt each
/// time it is generated.
pub trait ContextProvider: Send + Sync {
    /// Heading of the section in the system prompt.
    fn title(&self) -> String;
    /// Body of the section, computed at prompt generation time.
    fn info(&self) -> String;
}

impl Debug for dyn ContextProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextProvider")
            .field("title", &self.title())
            .finish_non_exhaustive()
    }
}

const DEFAULT_OUTPUT_INSTRUCTIONS: [&str; 2] = [
    "Always respond using the proper JSON schema.",
    "Always use the available additional information and context to enhance the response.",
];

/// Builds the system prompt from static sections and registered context
/// providers.
#[derive(Debug, Clone, Default)]
pub struct SystemPromptGenerator {
    pub background: Vec<String>,
    pub steps: Vec<String>,
    pub output_instructions: Vec<String>,
    context_providers: Vec<(String, Arc<dyn ContextProvider>)>,
}

impl SystemPromptGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn background<I, S>(mut self, background: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.background = background.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = steps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn output_instructions<I, S>(mut self, output_instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_instructions = output_instructions.into_iter().map(Into::into).collect();
        self
    }

    /// Register a context provider under a name. A provider already
    /// registered under the same name is replaced in place.
    pub fn register_context_provider(
        &mut self,
        name: impl Into<String>,
        provider: Arc<dyn ContextProvider>,
    ) {
        let name = name.into();
        if let Some(slot) = self
            .context_providers
            .iter_mut()
            .find(|(existing, _)| *existing == name)
        {
            slot.1 = provider;
        } else {
            self.context_providers.push((name, provider));
        }
    }

    /// Remove a context provider. Returns it if it was registered.
    pub fn unregister_context_provider(&mut self, name: &str) -> Option<Arc<dyn ContextProvider>> {
        let index = self
            .context_providers
            .iter()
            .position(|(existing, _)| existing == name)?;
        Some(self.context_providers.remove(index).1)
    }

    #[must_use]
    pub fn context_provider(&self, name: &str) -> Option<Arc<dyn ContextProvider>> {
        self.context_providers
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, provider)| provider.clone())
    }

    /// Render the prompt as Markdown sections. Empty sections are left out.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output_instructions = self.output_instructions.clone();
        output_instructions.extend(DEFAULT_OUTPUT_INSTRUCTIONS.iter().map(ToString::to_string));

        let sections = [
            ("IDENTITY and PURPOSE", &self.background),
            ("INTERNAL ASSISTANT STEPS", &self.steps),
            ("OUTPUT INSTRUCTIONS", &output_instructions),
        ];

        let mut lines: Vec<String> = Vec::new();
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            lines.push(format!("# {title}"));
            lines.extend(items.iter().map(|item| format!("- {item}")));
            lines.push(String::new());
        }

        if !self.context_providers.is_empty() {
            lines.push("# EXTRA INFORMATION AND CONTEXT".to_string());
            for (_, provider) in &self.context_providers {
                lines.push(format!("## {}", provider.title()));
                lines.push(provider.info());
                lines.push(String::new());
            }
        }

        lines.join("\n").trim().to_string()
    }
}
