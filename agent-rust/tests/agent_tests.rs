use agentkit::{
    AgentError, BaseAgent, BaseAgentConfig, BaseAgentInput, BaseAgentOutput, ChatHistory,
    ContextProvider, HookEvent, HookPayload, IoSchema, Role, SystemPromptGenerator,
};
use agentkit_sdk::{
    sdk_test::{MockGenerateResult, MockLanguageModel},
    LanguageModelError, Message, ResponseFormatOption,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

fn agent(model: &Arc<MockLanguageModel>) -> BaseAgent {
    BaseAgent::new(
        BaseAgentConfig::new(model.clone()).system_prompt_generator(
            SystemPromptGenerator::new().background(["You are a helpful assistant."]),
        ),
    )
}

#[tokio::test]
async fn run_records_turn_and_returns_output() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_text(r#"{"chat_message":"Hi there!"}"#);

    let mut agent = agent(&model);
    let response = agent
        .run(BaseAgentInput::new("Hello"))
        .await
        .expect("agent run succeeds");

    assert_eq!(response, BaseAgentOutput::new("Hi there!"));

    let messages = agent.history().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[0].turn_id, messages[1].turn_id);
    assert_eq!(
        messages[0].turn_id.as_deref(),
        agent.history().current_turn_id()
    );

    let inputs = model.tracked_generate_inputs();
    assert_eq!(inputs.len(), 1);
    let input = &inputs[0];
    assert!(input
        .system_prompt
        .as_deref()
        .unwrap()
        .starts_with("# IDENTITY and PURPOSE\n- You are a helpful assistant."));
    assert_eq!(input.messages, vec![Message::user(r#"{"chat_message":"Hello"}"#)]);
    match &input.response_format {
        Some(ResponseFormatOption::Json(format)) => assert_eq!(format.name, "BaseAgentOutput"),
        other => panic!("unexpected response format: {other:?}"),
    }
}

#[tokio::test]
async fn consecutive_runs_send_the_whole_history() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_text(r#"{"chat_message":"first"}"#)
        .enqueue_text(r#"{"chat_message":"second"}"#);

    let mut agent = agent(&model);
    agent.run(BaseAgentInput::new("one")).await.unwrap();
    agent.run(BaseAgentInput::new("two")).await.unwrap();

    let inputs = model.tracked_generate_inputs();
    assert_eq!(
        inputs[1].messages,
        vec![
            Message::user(r#"{"chat_message":"one"}"#),
            Message::assistant(r#"{"chat_message":"first"}"#),
            Message::user(r#"{"chat_message":"two"}"#),
        ]
    );

    let turns: Vec<_> = agent
        .history()
        .messages()
        .iter()
        .map(|message| message.turn_id.clone())
        .collect();
    assert_eq!(turns[0], turns[1]);
    assert_eq!(turns[2], turns[3]);
    assert_ne!(turns[0], turns[2]);
}

#[tokio::test]
async fn invalid_output_is_retried_with_the_error() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_text("Sure! Here is my answer.")
        .enqueue_text("```json\n{\"chat_message\":\"Fixed\"}\n```");

    let agent = agent(&model);
    let parse_errors = Arc::new(Mutex::new(Vec::<agentkit::ParseErrorInfo>::new()));
    let recorded = parse_errors.clone();
    agent.register_hook(HookEvent::ParseError, move |payload| {
        if let HookPayload::ParseError(info) = payload {
            recorded.lock().unwrap().push((*info).clone());
        }
    });

    let response: BaseAgentOutput = agent.get_response().await.expect("second attempt parses");
    assert_eq!(response, BaseAgentOutput::new("Fixed"));

    let parse_errors = parse_errors.lock().unwrap();
    assert_eq!(parse_errors.len(), 1);
    assert_eq!(parse_errors[0].attempt, 1);
    assert_eq!(parse_errors[0].raw.as_deref(), Some("Sure! Here is my answer."));

    let inputs = model.tracked_generate_inputs();
    assert_eq!(inputs.len(), 2);
    let retry_messages = &inputs[1].messages;
    assert_eq!(retry_messages.len(), 2);
    assert_eq!(retry_messages[0], Message::assistant("Sure! Here is my answer."));
    let Message::User(reask) = &retry_messages[1] else {
        panic!("expected a user message asking to fix the errors");
    };
    assert!(reask.content[0]
        .as_text()
        .unwrap()
        .starts_with("Recall the function correctly, fix the errors"));
}

#[tokio::test]
async fn completion_hooks_fire_on_every_attempt() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_text("not json")
        .enqueue_text(r#"{"chat_message":"fixed"}"#);

    let agent = agent(&model);
    let kwargs = Arc::new(Mutex::new(Vec::<Value>::new()));
    let responses = Arc::new(Mutex::new(Vec::new()));

    let recorded = kwargs.clone();
    agent.register_hook(HookEvent::CompletionKwargs, move |payload| {
        if let HookPayload::CompletionKwargs(value) = payload {
            recorded.lock().unwrap().push((*value).clone());
        }
    });
    let recorded = responses.clone();
    agent.register_hook(HookEvent::CompletionResponse, move |payload| {
        if let HookPayload::CompletionResponse(response) = payload {
            recorded.lock().unwrap().push(response.text());
        }
    });

    let response: BaseAgentOutput = agent.get_response().await.unwrap();
    assert_eq!(response, BaseAgentOutput::new("fixed"));

    let kwargs = kwargs.lock().unwrap();
    assert_eq!(kwargs.len(), 2);
    assert_eq!(kwargs[0]["messages"].as_array().unwrap().len(), 0);

    let retry_messages = kwargs[1]["messages"].as_array().unwrap();
    assert_eq!(retry_messages.len(), 2);
    assert_eq!(retry_messages[0]["role"], "assistant");
    assert_eq!(retry_messages[0]["content"][0]["text"], "not json");
    assert_eq!(retry_messages[1]["role"], "user");
    assert!(retry_messages[1]["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("Recall the function correctly, fix the errors"));

    assert_eq!(
        *responses.lock().unwrap(),
        vec![
            Some("not json".to_string()),
            Some(r#"{"chat_message":"fixed"}"#.to_string()),
        ]
    );
}

#[tokio::test]
async fn unbounded_retry_budget_does_not_overflow() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_text(r#"{"chat_message":"ok"}"#);

    let agent: BaseAgent =
        BaseAgent::new(BaseAgentConfig::new(model.clone()).max_retries(usize::MAX));
    let response: BaseAgentOutput = agent.get_response().await.unwrap();

    assert_eq!(response, BaseAgentOutput::new("ok"));
    assert_eq!(agent.client().max_retries(), usize::MAX);
}

#[tokio::test]
async fn validation_failure_after_all_retries() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_text(r#"{"chat_message":""}"#)
        .enqueue_text(r#"{"chat_message":"   "}"#);

    let agent: BaseAgent = BaseAgent::new(BaseAgentConfig::new(model.clone()).max_retries(1));
    let error = agent
        .get_response::<BaseAgentOutput>()
        .await
        .expect_err("both attempts are blank");

    match error {
        AgentError::Validation { attempts, message } => {
            assert_eq!(attempts, 2);
            assert_eq!(message, "chat_message must not be empty");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(model.pending_results(), 0);
}

#[tokio::test]
async fn model_errors_are_not_retried() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_generate(MockGenerateResult::error(LanguageModelError::Refusal(
            "no".to_string(),
        )))
        .enqueue_text(r#"{"chat_message":"unused"}"#);

    let agent = agent(&model);
    let completion_errors = Arc::new(Mutex::new(Vec::new()));
    let recorded = completion_errors.clone();
    agent.register_hook(HookEvent::CompletionError, move |payload| {
        if let HookPayload::CompletionError(error) = payload {
            recorded.lock().unwrap().push(error.to_string());
        }
    });

    let error = agent
        .get_response::<BaseAgentOutput>()
        .await
        .expect_err("refusal propagates");

    assert!(matches!(
        error,
        AgentError::LanguageModel(LanguageModelError::Refusal(_))
    ));
    assert_eq!(*completion_errors.lock().unwrap(), vec!["Refusal: no"]);
    assert_eq!(model.pending_results(), 1);
}

#[tokio::test]
async fn completion_hooks_receive_kwargs_and_response() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_text(r#"{"chat_message":"ok"}"#);

    let agent = agent(&model);
    let kwargs = Arc::new(Mutex::new(Vec::<Value>::new()));
    let responses = Arc::new(Mutex::new(Vec::new()));

    let recorded = kwargs.clone();
    agent.register_hook(HookEvent::CompletionKwargs, move |payload| {
        if let HookPayload::CompletionKwargs(value) = payload {
            recorded.lock().unwrap().push((*value).clone());
        }
    });
    let recorded = responses.clone();
    agent.register_hook(HookEvent::CompletionResponse, move |payload| {
        if let HookPayload::CompletionResponse(response) = payload {
            recorded.lock().unwrap().push(response.text());
        }
    });

    let _: BaseAgentOutput = agent.get_response().await.unwrap();

    let kwargs = kwargs.lock().unwrap();
    assert_eq!(kwargs.len(), 1);
    assert_eq!(kwargs[0]["model"], "mock-model");
    assert_eq!(kwargs[0]["response_format"]["name"], "BaseAgentOutput");
    assert_eq!(
        *responses.lock().unwrap(),
        vec![Some(r#"{"chat_message":"ok"}"#.to_string())]
    );
}

#[tokio::test]
async fn disabled_and_unregistered_hooks_are_silent() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_text(r#"{"chat_message":"one"}"#)
        .enqueue_text(r#"{"chat_message":"two"}"#)
        .enqueue_text(r#"{"chat_message":"three"}"#);

    let agent = agent(&model);
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    let id = agent.register_hook(HookEvent::CompletionResponse, move |_| {
        *counter.lock().unwrap() += 1;
    });

    agent.disable_hooks();
    assert!(!agent.hooks_enabled());
    let _: BaseAgentOutput = agent.get_response().await.unwrap();
    assert_eq!(*calls.lock().unwrap(), 0);

    agent.enable_hooks();
    let _: BaseAgentOutput = agent.get_response().await.unwrap();
    assert_eq!(*calls.lock().unwrap(), 1);

    assert!(agent.unregister_hook(HookEvent::CompletionResponse, id));
    let _: BaseAgentOutput = agent.get_response().await.unwrap();
    assert_eq!(*calls.lock().unwrap(), 1);
}

/// A short title for the conversation.
#[derive(Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
struct ConversationTitle {
    /// At most five words.
    title: String,
}

impl IoSchema for ConversationTitle {
    fn validate(&self) -> Result<(), String> {
        if self.title.split_whitespace().count() > 5 {
            return Err("title must have at most five words".to_string());
        }
        Ok(())
    }
}

#[tokio::test]
async fn get_response_accepts_another_response_model() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_text(r#"{"title":"A very long title for a short chat"}"#)
        .enqueue_text(r#"{"title":"Greetings"}"#);

    let agent = agent(&model);
    let title: ConversationTitle = agent.get_response().await.unwrap();
    assert_eq!(
        title,
        ConversationTitle {
            title: "Greetings".to_string()
        }
    );

    let inputs = model.tracked_generate_inputs();
    match &inputs[0].response_format {
        Some(ResponseFormatOption::Json(format)) => {
            assert_eq!(format.name, "ConversationTitle");
            assert_eq!(
                format.description.as_deref(),
                Some("A short title for the conversation.")
            );
        }
        other => panic!("unexpected response format: {other:?}"),
    }
}

#[tokio::test]
async fn reset_history_restores_initial_history() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_text(r#"{"chat_message":"Hi"}"#);

    let mut initial = ChatHistory::new(Some(20));
    initial
        .add_message(Role::Assistant, &BaseAgentOutput::new("How can I help?"))
        .unwrap();

    let mut agent: BaseAgent =
        BaseAgent::new(BaseAgentConfig::new(model.clone()).history(initial.clone()));
    agent.run(BaseAgentInput::new("Hello")).await.unwrap();
    assert_eq!(agent.history().message_count(), 3);

    agent.reset_history();
    assert_eq!(agent.history(), &initial);
}

struct SessionInfo;

impl ContextProvider for SessionInfo {
    fn title(&self) -> String {
        "Session".to_string()
    }

    fn info(&self) -> String {
        "The user is logged in as ada.".to_string()
    }
}

#[tokio::test]
async fn context_providers_are_rendered_into_the_prompt() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_text(r#"{"chat_message":"one"}"#)
        .enqueue_text(r#"{"chat_message":"two"}"#);

    let mut agent = agent(&model);
    agent.register_context_provider("session", Arc::new(SessionInfo));
    assert!(agent.context_provider("session").is_some());

    let _: BaseAgentOutput = agent.get_response().await.unwrap();
    assert!(agent.unregister_context_provider("session").is_some());
    let _: BaseAgentOutput = agent.get_response().await.unwrap();

    let inputs = model.tracked_generate_inputs();
    let with_provider = inputs[0].system_prompt.as_deref().unwrap();
    assert!(with_provider
        .ends_with("# EXTRA INFORMATION AND CONTEXT\n## Session\nThe user is logged in as ada."));
    assert!(!inputs[1]
        .system_prompt
        .as_deref()
        .unwrap()
        .contains("## Session"));
}
