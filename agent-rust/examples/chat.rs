use agentkit::{
    config::{load_dotenv, Settings},
    BaseAgent, BaseAgentInput, BaseAgentOutput, ChatHistory, ContextProvider, Role,
    SystemPromptGenerator,
};
use std::{
    error::Error,
    io::{self, BufRead, Write},
    sync::{Arc, Mutex},
};

/// Notes the user pinned with `/note`, shown to the model on every call.
#[derive(Default)]
struct Notes(Mutex<Vec<String>>);

impl ContextProvider for Notes {
    fn title(&self) -> String {
        "Pinned notes".to_string()
    }

    fn info(&self) -> String {
        let notes = self.0.lock().unwrap();
        if notes.is_empty() {
            return "No notes yet.".to_string();
        }
        notes
            .iter()
            .enumerate()
            .map(|(i, note)| format!("{}. {note}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    load_dotenv();
    let settings = Settings::from_env()?;

    let mut history = ChatHistory::new(Some(50));
    history.add_message(
        Role::Assistant,
        &BaseAgentOutput::new("Hello! How can I assist you today?"),
    )?;

    let generator = SystemPromptGenerator::new()
        .background([
            "You are a friendly assistant that keeps answers short.",
            "You pay attention to the notes the user pinned.",
        ])
        .steps([
            "Read the user's message and the pinned notes.",
            "Answer the question in at most three sentences.",
        ]);

    let notes = Arc::new(Notes::default());
    let mut agent: BaseAgent = BaseAgent::new(
        settings
            .agent_config()
            .name("chat")
            .history(history)
            .system_prompt_generator(generator),
    );
    agent.register_context_provider("notes", notes.clone());

    println!("Agent: Hello! How can I assist you today?");
    println!("(type /note <text> to pin a note, /reset to start over, /exit to quit)");

    let stdin = io::stdin();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            "/exit" => break,
            "/reset" => {
                agent.reset_history();
                println!("(history cleared)");
                continue;
            }
            _ => {}
        }

        if let Some(note) = line.strip_prefix("/note ") {
            notes.0.lock().unwrap().push(note.to_string());
            println!("(note pinned)");
            continue;
        }

        let response = agent.run(BaseAgentInput::new(line)).await?;
        println!("Agent: {}", response.chat_message);
    }

    Ok(())
}
