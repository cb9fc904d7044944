use agentkit_sdk::{
    openai::{OpenAIChatModel, OpenAIChatModelOptions},
    LanguageModel, LanguageModelInput, Message,
};
use std::{env, error::Error};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let api_key = env::var("OPENAI_API_KEY").map_err(|_| "OPENAI_API_KEY is not set")?;
    let model = OpenAIChatModel::new(
        "gpt-4o-mini",
        OpenAIChatModelOptions {
            api_key,
            base_url: env::var("OPENAI_BASE_URL").ok(),
            ..Default::default()
        },
    );

    let response = model
        .generate(LanguageModelInput {
            system_prompt: Some("You are a storyteller. Keep it under 100 words.".to_string()),
            messages: vec![
                Message::user("Tell me a story."),
                Message::assistant("Sure! What kind of story would you like to hear?"),
                Message::user("a fairy tale"),
            ],
            ..Default::default()
        })
        .await?;

    println!("{}", response.text().unwrap_or_default());
    if let Some(usage) = response.usage {
        println!(
            "({} input tokens, {} output tokens)",
            usage.input_tokens, usage.output_tokens
        );
    }
    Ok(())
}
