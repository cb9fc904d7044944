use agentkit_sdk::{
    sdk_test::{MockGenerateResult, MockLanguageModel},
    LanguageModel, LanguageModelError, LanguageModelInput, Message, Part,
};

#[tokio::test]
async fn mock_model_yields_results_in_order_and_tracks_inputs() {
    let model = MockLanguageModel::new();
    model
        .enqueue_text("first")
        .enqueue_generate(MockGenerateResult::error(LanguageModelError::Refusal(
            "no".to_string(),
        )));

    let first = model
        .generate(LanguageModelInput {
            messages: vec![Message::user("one")],
            ..Default::default()
        })
        .await
        .expect("first result");
    assert_eq!(first.content, vec![Part::text("first")]);

    let second = model
        .generate(LanguageModelInput {
            messages: vec![Message::user("two")],
            ..Default::default()
        })
        .await;
    assert!(matches!(second, Err(LanguageModelError::Refusal(_))));

    let inputs = model.tracked_generate_inputs();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[1].messages, vec![Message::user("two")]);
    assert_eq!(model.pending_results(), 0);
}

#[tokio::test]
async fn mock_model_errors_when_queue_is_empty() {
    let model = MockLanguageModel::new();
    let result = model.generate(LanguageModelInput::default()).await;
    assert!(matches!(result, Err(LanguageModelError::Invariant("mock", _))));
}
