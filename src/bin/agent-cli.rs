use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use resume_agent::identity::AgentCard;

#[derive(Parser)]
#[command(name = "agent-cli")]
#[command(about = "Talk to an A2A resume agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an agent's card from its well-known path
    Card {
        /// Base URL, e.g. https://agent.example
        url: String,
    },
    /// Send a question as an A2A message
    Ask {
        /// Base URL, e.g. http://localhost:8080
        url: String,
        question: String,
        /// Conversation context to continue
        #[arg(long)]
        context_id: Option<String>,
    },
}

/// Non-2xx answers fail the command so scripts see a non-zero exit.
fn ensure_success(status: StatusCode, what: &str) -> Result<(), String> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("{} returned status {}", what, status))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Card { url } => {
            let res = client
                .get(format!("{}/.well-known/agent.json", url.trim_end_matches('/')))
                .send()
                .await?;
            let status = res.status();
            let body = res.bytes().await?;
            ensure_success(status, "agent card request")?;
            let card = AgentCard::from_json(&body)?;
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        Commands::Ask {
            url,
            question,
            context_id,
        } => {
            let params = json!({
                "message": {
                    "role": "user",
                    "messageId": Uuid::new_v4().to_string(),
                    "contextId": context_id,
                    "parts": [{ "kind": "text", "text": question }],
                }
            });
            let res = client
                .post(format!("{}/a2a/ask", url.trim_end_matches('/')))
                .json(&params)
                .send()
                .await?;

            for (name, value) in res.headers() {
                let name = name.as_str();
                if name.starts_with("x-ratelimit-") || name == "retry-after" {
                    eprintln!("{}: {}", name, value.to_str().unwrap_or("?"));
                }
            }

            let status = res.status();
            let body: Value = res.json().await?;
            if !status.is_success() {
                eprintln!("{}", serde_json::to_string_pretty(&body)?);
            }
            ensure_success(status, "agent")?;

            let text = body["parts"]
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n");
            println!("{}", text);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statuses_fail_the_command() {
        assert!(ensure_success(StatusCode::OK, "agent").is_ok());

        let err = ensure_success(StatusCode::TOO_MANY_REQUESTS, "agent").unwrap_err();
        assert_eq!(err, "agent returned status 429 Too Many Requests");
        assert!(ensure_success(StatusCode::NOT_FOUND, "agent card request").is_err());
    }
}
