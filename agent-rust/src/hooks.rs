use crate::AgentError;
use agentkit_sdk::{LanguageModelError, ModelResponse};
use serde_json::Value;
use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};

/// Lifecycle events of a structured completion that handlers can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// Emitted before each request with the serialized request arguments.
    CompletionKwargs,
    /// Emitted with the raw model response of each successful request.
    CompletionResponse,
    /// Emitted when the request to the model fails.
    CompletionError,
    /// Emitted when the model output fails to parse or validate.
    ParseError,
}

impl HookEvent {
    pub const ALL: [Self; 4] = [
        Self::CompletionKwargs,
        Self::CompletionResponse,
        Self::CompletionError,
        Self::ParseError,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompletionKwargs => "completion:kwargs",
            Self::CompletionResponse => "completion:response",
            Self::CompletionError => "completion:error",
            Self::ParseError => "parse:error",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| AgentError::UnknownHookEvent(s.to_string()))
    }
}

/// Details of a failed attempt to turn model output into the response model.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrorInfo {
    /// 1-based attempt number.
    pub attempt: usize,
    pub message: String,
    /// The text the model returned, if any.
    pub raw: Option<String>,
}

/// The data handed to a hook handler. Which variant is passed depends on the
/// event the handler was registered for.
#[derive(Debug)]
pub enum HookPayload<'a> {
    CompletionKwargs(&'a Value),
    CompletionResponse(&'a ModelResponse),
    CompletionError(&'a LanguageModelError),
    ParseError(&'a ParseErrorInfo),
}

impl HookPayload<'_> {
    #[must_use]
    pub fn event(&self) -> HookEvent {
        match self {
            Self::CompletionKwargs(_) => HookEvent::CompletionKwargs,
            Self::CompletionResponse(_) => HookEvent::CompletionResponse,
            Self::CompletionError(_) => HookEvent::CompletionError,
            Self::ParseError(_) => HookEvent::ParseError,
        }
    }
}

pub type HookHandler = Arc<dyn Fn(&HookPayload<'_>) + Send + Sync>;

/// Identifies a registered handler so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

struct HooksInner {
    enabled: bool,
    next_id: u64,
    handlers: Vec<(HookEvent, HookId, HookHandler)>,
}

/// A shared registry of hook handlers.
///
/// Cloning a `Hooks` yields a handle to the same registry, so handlers
/// registered through an agent are seen by the structured client it owns.
#[derive(Clone)]
pub struct Hooks {
    inner: Arc<Mutex<HooksInner>>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HooksInner {
                enabled: true,
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }
}

impl Hooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HooksInner> {
        // handlers run after the guard is dropped
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a handler for an event. Handlers run in registration order.
    pub fn on<F>(&self, event: HookEvent, handler: F) -> HookId
    where
        F: Fn(&HookPayload<'_>) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = HookId(inner.next_id);
        inner.next_id += 1;
        inner.handlers.push((event, id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns whether it was registered for the event.
    pub fn off(&self, event: HookEvent, id: HookId) -> bool {
        let mut inner = self.lock();
        let before = inner.handlers.len();
        inner
            .handlers
            .retain(|(handler_event, handler_id, _)| {
                !(*handler_event == event && *handler_id == id)
            });
        inner.handlers.len() != before
    }

    /// Remove all handlers of one event, or of every event when `None`.
    pub fn clear(&self, event: Option<HookEvent>) {
        let mut inner = self.lock();
        match event {
            Some(event) => inner
                .handlers
                .retain(|(handler_event, _, _)| *handler_event != event),
            None => inner.handlers.clear(),
        }
    }

    pub fn enable(&self) {
        self.lock().enabled = true;
    }

    pub fn disable(&self) {
        self.lock().enabled = false;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    #[must_use]
    pub fn handler_count(&self, event: HookEvent) -> usize {
        self.lock()
            .handlers
            .iter()
            .filter(|(handler_event, _, _)| *handler_event == event)
            .count()
    }

    /// Call every handler registered for the payload's event.
    pub fn emit(&self, payload: &HookPayload<'_>) {
        let event = payload.event();
        let handlers: Vec<HookHandler> = {
            let inner = self.lock();
            if !inner.enabled {
                return;
            }
            inner
                .handlers
                .iter()
                .filter(|(handler_event, _, _)| *handler_event == event)
                .map(|(_, _, handler)| handler.clone())
                .collect()
        };

        tracing::trace!(%event, handlers = handlers.len(), "emitting hook");
        for handler in handlers {
            handler(payload);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Hooks")
            .field("enabled", &inner.enabled)
            .field("handlers", &inner.handlers.len())
            .finish()
    }
}
