//! A2A endpoints: agent card, message ask, edge ask, health.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::http::server::AppState;
use crate::identity::{AgentCard, RequestContext};

pub const UNKNOWN_CALLER: &str = "Unknown Agent";
pub const EMPTY_REQUEST_REPLY: &str = "Error: Empty request";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Message {
    /// First text part, if any.
    pub fn question(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            Part::Text { text } => Some(text.as_str()),
            Part::Unsupported => None,
        })
    }

    fn agent_reply(context_id: Option<String>, text: String) -> Self {
        Self {
            role: Role::Agent,
            message_id: Uuid::new_v4().to_string(),
            context_id,
            parts: vec![Part::Text { text }],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageSendParams {
    pub message: Message,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// System prompt for a question relayed by another agent.
pub fn a2a_system_prompt(base: &str, caller: &str) -> String {
    format!(
        "{base}\nNOTE: This request is from another AI agent ({caller}) in an A2A \
         (Application-to-Application) context. Provide a clear, direct response suitable \
         for agent-to-agent communication."
    )
}

/// Stand-in for the model call.
fn answer(_system_prompt: &str, question: &str) -> String {
    format!("Echo: {question}")
}

/// `GET /.well-known/agent.json`
pub async fn agent_card(State(state): State<AppState>, ctx: RequestContext) -> Json<AgentCard> {
    let profile = &state.config.agent;
    let url = profile
        .url
        .clone()
        .or_else(|| ctx.host_uri())
        .unwrap_or_default();

    tracing::info!(url = %url, "Providing agent card");

    Json(AgentCard::text_agent(
        &profile.name,
        &profile.description,
        &profile.version,
        &url,
    ))
}

/// `POST /a2a/ask`
pub async fn ask(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(params): Json<MessageSendParams>,
) -> Json<Message> {
    let context_id = params.message.context_id.clone();

    let question = match params.message.question().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            tracing::warn!(remote_ip = ?ctx.remote_ip, "A2A request without a question");
            return Json(Message::agent_reply(context_id, EMPTY_REQUEST_REPLY.to_string()));
        }
    };

    let caller = if state.config.identity.enabled {
        state
            .identity
            .resolve_caller_identity(&ctx, &state.cancel.child_token())
            .await
            .map(|card| card.name)
    } else {
        None
    };
    let caller = caller.as_deref().unwrap_or(UNKNOWN_CALLER);

    let system_prompt = a2a_system_prompt(&state.config.agent.system_prompt, caller);
    let response = answer(&system_prompt, &question);

    tracing::info!(caller = %caller, question = %question, response = %response, "A2A interaction");

    Json(Message::agent_reply(context_id, response))
}

/// `POST /api/a2a/ask`
pub async fn edge_ask(Json(request): Json<AskRequest>) -> Json<AskResponse> {
    Json(AskResponse {
        answer: format!("Echo: {}", request.question),
    })
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
