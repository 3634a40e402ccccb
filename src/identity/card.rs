//! Agent card: the self-description an agent publishes at a well-known path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const UNKNOWN_NAME: &str = "unknown";
pub const NO_DESCRIPTION: &str = "No description provided";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    #[serde(default)]
    pub streaming: bool,
}

/// A resolved agent card. `name` and `description` are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub capabilities: AgentCapabilities,

    #[serde(default)]
    pub default_input_modes: Vec<String>,

    #[serde(default)]
    pub default_output_modes: Vec<String>,

    /// Any other fields the peer published, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Card as fetched off the wire, before normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAgentCard {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    capabilities: Option<AgentCapabilities>,
    #[serde(default)]
    default_input_modes: Option<Vec<String>>,
    #[serde(default)]
    default_output_modes: Option<Vec<String>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawAgentCard> for AgentCard {
    fn from(raw: RawAgentCard) -> Self {
        Self {
            name: raw.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            description: raw.description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            url: raw.url,
            version: raw.version,
            capabilities: raw.capabilities.unwrap_or_default(),
            default_input_modes: raw.default_input_modes.unwrap_or_default(),
            default_output_modes: raw.default_output_modes.unwrap_or_default(),
            extra: raw.extra,
        }
    }
}

impl AgentCard {
    /// Parse a card document, filling in missing name and description.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawAgentCard = serde_json::from_slice(bytes)?;
        Ok(raw.into())
    }

    /// Card describing a text-in, text-out agent.
    pub fn text_agent(name: &str, description: &str, version: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            url: Some(url.to_string()),
            version: Some(version.to_string()),
            capabilities: AgentCapabilities { streaming: true },
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_normalized() {
        let card = AgentCard::from_json(br#"{"url":"https://peer.example"}"#).unwrap();
        assert_eq!(card.name, UNKNOWN_NAME);
        assert_eq!(card.description, NO_DESCRIPTION);
        assert_eq!(card.url.as_deref(), Some("https://peer.example"));
    }

    #[test]
    fn test_null_fields_normalized() {
        let card = AgentCard::from_json(br#"{"name":null,"description":null}"#).unwrap();
        assert_eq!(card.name, UNKNOWN_NAME);
        assert_eq!(card.description, NO_DESCRIPTION);
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let card = AgentCard::from_json(
            br#"{"name":"Scout","description":"Finds things","skills":[{"id":"search"}],"capabilities":{"streaming":true}}"#,
        )
        .unwrap();
        assert_eq!(card.name, "Scout");
        assert!(card.capabilities.streaming);
        assert!(card.extra.contains_key("skills"));

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["skills"][0]["id"], "search");
    }

    #[test]
    fn test_text_agent_serializes_camel_case() {
        let card = AgentCard::text_agent("Resume Agent", "About me", "1.0.0", "http://me");
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["defaultInputModes"][0], "text");
        assert_eq!(json["capabilities"]["streaming"], true);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(AgentCard::from_json(b"[1,2,3]").is_err());
    }
}
