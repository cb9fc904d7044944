use agentkit::{
    config::{load_dotenv, Settings},
    BaseAgentInput, BaseTool, BoxedError, IoSchema, ToolInterfaceAgent, ToolInterfaceAgentConfig,
};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::error::Error;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Search YouTube for videos matching a query.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct YouTubeSearchInput {
    /// Search terms, e.g. "rust async tutorial".
    query: String,
    /// Number of videos to return, between 1 and 10.
    max_results: u8,
}

impl IoSchema for YouTubeSearchInput {
    fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("query must not be empty".to_string());
        }
        if !(1..=10).contains(&self.max_results) {
            return Err(format!(
                "max_results must be between 1 and 10, got {}",
                self.max_results
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct VideoResult {
    title: String,
    channel: String,
    published_at: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct YouTubeSearchOutput {
    query: String,
    videos: Vec<VideoResult>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    published_at: String,
}

struct YouTubeSearchTool {
    api_key: String,
    client: reqwest::Client,
}

#[async_trait]
impl BaseTool for YouTubeSearchTool {
    type Input = YouTubeSearchInput;
    type Output = YouTubeSearchOutput;

    fn name(&self) -> String {
        "youtube_search".to_string()
    }

    async fn run(&self, input: YouTubeSearchInput) -> Result<YouTubeSearchOutput, BoxedError> {
        let max_results = input.max_results.to_string();
        let response: SearchResponse = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("q", input.query.as_str()),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let videos = response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(VideoResult {
                    title: item.snippet.title,
                    channel: item.snippet.channel_title,
                    published_at: item.snippet.published_at,
                    url: format!("https://www.youtube.com/watch?v={video_id}"),
                })
            })
            .collect();

        Ok(YouTubeSearchOutput {
            query: input.query,
            videos,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    load_dotenv();
    let settings = Settings::from_env()?;

    let tool = YouTubeSearchTool {
        api_key: settings.require_youtube_api_key()?.to_string(),
        client: reqwest::Client::new(),
    };
    let mut agent = ToolInterfaceAgent::new(ToolInterfaceAgentConfig::new(
        settings.agent_config().name("youtube"),
        tool,
    ));

    let request = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Find me three recent talks about Rust async runtimes".to_string());
    println!("You: {request}");

    let response = agent.run(BaseAgentInput::new(request)).await?;
    println!("Agent: {}", response.chat_message);

    Ok(())
}
