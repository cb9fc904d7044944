use crate::{AssistantMessage, Message, ModelResponse, ModelUsage, Part, TextPart, UserMessage};

impl TextPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for TextPart {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TextPart {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextPart::new(text))
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(part) => Some(&part.text),
        }
    }
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User(UserMessage {
            content: vec![Part::text(text)],
        })
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant(AssistantMessage {
            content: vec![Part::text(text)],
        })
    }

    #[must_use]
    pub fn content(&self) -> &[Part] {
        match self {
            Self::User(message) => &message.content,
            Self::Assistant(message) => &message.content,
        }
    }
}

impl ModelResponse {
    /// Concatenate all text parts of the response.
    /// Returns `None` when the response carries no text.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self.content.iter().filter_map(Part::as_text).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

impl ModelUsage {
    pub fn add(&mut self, other: &Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_concatenates_parts() {
        let response = ModelResponse {
            content: vec![Part::text("{\"a\":"), Part::text("1}")],
            usage: None,
        };
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn response_text_is_none_without_parts() {
        assert_eq!(ModelResponse::default().text(), None);
    }

    #[test]
    fn usage_add_sums_tokens() {
        let mut usage = ModelUsage {
            input_tokens: 3,
            output_tokens: 4,
        };
        usage.add(&ModelUsage {
            input_tokens: 10,
            output_tokens: 1,
        });
        assert_eq!(usage.input_tokens, 13);
        assert_eq!(usage.output_tokens, 5);
    }
}
