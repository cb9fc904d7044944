use crate::AgentError;
use agentkit_sdk::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message stored in the chat history.
///
/// `content` is either a plain string or a structured record serialized from
/// an `IoSchema` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
}

impl HistoryMessage {
    /// The text sent to the model for this message. Strings are sent as-is,
    /// structured content as compact JSON.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    #[must_use]
    pub fn to_message(&self) -> Message {
        match self.role {
            Role::User => Message::user(self.text()),
            Role::Assistant => Message::assistant(self.text()),
        }
    }
}

/// Conversation memory of an agent.
///
/// Messages are grouped into turns: [`ChatHistory::initialize_turn`] starts a
/// new turn and every message added afterwards carries its id. When
/// `max_messages` is set, the oldest messages are evicted first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatHistory {
    messages: Vec<HistoryMessage>,
    max_messages: Option<usize>,
    current_turn_id: Option<String>,
}

impl ChatHistory {
    #[must_use]
    pub fn new(max_messages: Option<usize>) -> Self {
        Self {
            messages: Vec::new(),
            max_messages,
            current_turn_id: None,
        }
    }

    /// Start a new turn and return its id.
    pub fn initialize_turn(&mut self) -> String {
        let turn_id = Uuid::new_v4().to_string();
        self.current_turn_id = Some(turn_id.clone());
        turn_id
    }

    #[must_use]
    pub fn current_turn_id(&self) -> Option<&str> {
        self.current_turn_id.as_deref()
    }

    /// Append a message tagged with the current turn id.
    pub fn add_message<T: Serialize + ?Sized>(
        &mut self,
        role: Role,
        content: &T,
    ) -> Result<(), AgentError> {
        if self.current_turn_id.is_none() {
            self.initialize_turn();
        }
        self.messages.push(HistoryMessage {
            role,
            content: serde_json::to_value(content)?,
            turn_id: self.current_turn_id.clone(),
        });
        self.manage_overflow();
        Ok(())
    }

    fn manage_overflow(&mut self) {
        if let Some(max_messages) = self.max_messages {
            if self.messages.len() > max_messages {
                let excess = self.messages.len() - max_messages;
                self.messages.drain(..excess);
            }
        }
    }

    /// Messages in the form sent to the model.
    #[must_use]
    pub fn history(&self) -> Vec<Message> {
        self.messages.iter().map(HistoryMessage::to_message).collect()
    }

    #[must_use]
    pub fn messages(&self) -> &[HistoryMessage] {
        &self.messages
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn max_messages(&self) -> Option<usize> {
        self.max_messages
    }

    /// Remove every message of a turn. If it is the current turn, the next
    /// message starts a fresh one.
    pub fn delete_turn(&mut self, turn_id: &str) -> Result<(), AgentError> {
        let before = self.messages.len();
        self.messages
            .retain(|message| message.turn_id.as_deref() != Some(turn_id));
        if self.messages.len() == before {
            return Err(AgentError::TurnNotFound(turn_id.to_string()));
        }
        if self.current_turn_id.as_deref() == Some(turn_id) {
            self.current_turn_id = None;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.current_turn_id = None;
    }

    /// Serialize the history, including the turn state, to JSON.
    pub fn dump(&self) -> Result<String, AgentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Replace this history with one produced by [`ChatHistory::dump`].
    pub fn load(&mut self, serialized: &str) -> Result<(), AgentError> {
        *self = serde_json::from_str(serialized)?;
        Ok(())
    }
}
