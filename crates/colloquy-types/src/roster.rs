//! Agent identity types for the conversation roster.
//!
//! Agents are created and owned by the simulation server; the viewer only
//! ever receives them inside a [`StateSnapshot`](crate::snapshot::StateSnapshot).
//! Their identifiers are opaque server-issued strings and are never minted
//! locally.

use serde::{Deserialize, Serialize};

/// Role of an agent within the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A participant persona submitted by the user.
    User,
    /// A built-in mediator persona that steers the conversation.
    Mediator,
}

/// One participant in the simulated conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Opaque server-issued identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form persona description the agent speaks from.
    pub persona_text: String,
    /// Exactly three behavioral quirks (enforced server-side).
    pub quirks: Vec<String>,
    /// Current one-sentence stance on the topic.
    pub stance: String,
    /// Conversational energy in `0.0..=1.0`.
    pub energy: f64,
    /// Whether this is a user persona or a mediator.
    pub role: Role,
    /// Optional personality-type tag (e.g. an MBTI code).
    #[serde(default)]
    pub mbti_type: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Mediator).unwrap(), "\"mediator\"");
    }

    #[test]
    fn agent_decodes_without_personality_tag() {
        let agent: Agent = serde_json::from_value(serde_json::json!({
            "id": "u_maya_0a1b2c3d4e",
            "name": "Maya",
            "persona_text": "A curious field biologist.",
            "quirks": ["hums while thinking", "collects leaves", "quotes Darwin"],
            "stance": "Maya approaches the topic constructively.",
            "energy": 0.6,
            "role": "user"
        }))
        .unwrap();
        assert_eq!(agent.role, Role::User);
        assert!(agent.mbti_type.is_none());
    }
}
