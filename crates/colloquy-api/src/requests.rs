//! Request and response payloads for the command/query operations.
//!
//! Field limits mirror what the server enforces, so a payload that passes
//! local validation will not bounce off the server's own checks.

use colloquy_types::{Agent, RoundResult, StateSnapshot};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Set the conversation topic.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct TopicRequest {
    /// The new topic.
    #[validate(length(min = 1, max = 240))]
    pub topic: String,
}

/// One user-submitted persona.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UserAgentInput {
    /// Display name.
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    /// Free-form persona description.
    #[validate(length(min = 1, max = 500))]
    pub persona_text: String,
    /// Conversational energy in `0.0..=1.0`.
    #[validate(range(min = 0.0, max = 1.0))]
    pub energy: f64,
    /// Optional personality-type tag (e.g. an MBTI code).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 4))]
    pub mbti_type: Option<String>,
}

impl UserAgentInput {
    /// A persona with the server's default energy and no personality tag.
    pub fn new(name: impl Into<String>, persona_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persona_text: persona_text.into(),
            energy: 0.6,
            mbti_type: None,
        }
    }
}

/// Add one or more user personas to the roster.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct AddAgentsRequest {
    /// The personas to add.
    #[validate(length(min = 1, max = 25), nested)]
    pub user_agents: Vec<UserAgentInput>,
}

/// Run a batch of simulation rounds.
#[derive(Debug, Clone, Copy, Serialize, Validate)]
pub struct RunRequest {
    /// Number of rounds to run.
    #[validate(range(min = 1, max = 50))]
    pub rounds: u64,
}

/// Reset the conversation, optionally seeding a new topic.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ResetRequest {
    /// Topic for the fresh conversation; the server default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 240))]
    pub topic: Option<String>,
}

/// Submit a human intervention message.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct InterveneRequest {
    /// The message text.
    #[validate(length(min = 1, max = 500))]
    pub message: String,
}

/// One prior message in a draft-persona test chat.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageInput {
    /// `"user"` or `"assistant"`.
    pub role: String,
    /// The message text.
    pub content: String,
}

/// Run one draft-persona test chat turn.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ChatRequest {
    /// Draft persona's name.
    #[validate(length(min = 1, max = 80))]
    pub agent_name: String,
    /// Draft persona's description.
    #[validate(length(min = 1, max = 500))]
    pub agent_persona: String,
    /// Optional personality-type tag.
    #[validate(length(max = 4))]
    pub mbti_type: String,
    /// Prior conversation, oldest first.
    pub messages: Vec<ChatMessageInput>,
    /// The user's new message.
    #[validate(length(min = 1, max = 500))]
    pub user_message: String,
}

/// Synthesize speech audio for a line of text.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct TtsRequest {
    /// The text to speak.
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    /// Voice preset name.
    pub voice: String,
}

impl TtsRequest {
    /// A request using the server's default voice.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: "alloy".to_owned(),
        }
    }
}

/// Response to roster-changing operations.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentsAdded {
    /// The agents that were created.
    pub added: Vec<Agent>,
    /// The post-change snapshot.
    pub state: StateSnapshot,
}

/// Response to a run-rounds operation.
#[derive(Debug, Clone, Deserialize)]
pub struct RunOutcome {
    /// The finalized rounds, in order.
    pub results: Vec<RoundResult>,
    /// The post-run snapshot.
    pub state: StateSnapshot,
}

/// Envelope used by operations that answer with just a snapshot.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StateEnvelope {
    /// The snapshot.
    pub state: StateSnapshot,
}

/// Envelope for the test-chat reply.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatReply {
    /// The persona's reply text.
    pub reply: String,
}
