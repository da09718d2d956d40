//! The typed HTTP client.
//!
//! One thin method per boundary operation. Every method validates its
//! payload locally, posts JSON, checks the status, and decodes the typed
//! response. Errors are mapped into [`ApiError`] with enough body text to
//! be diagnosable from a log line.

use colloquy_types::StateSnapshot;
use tracing::debug;
use url::Url;
use validator::Validate;

use crate::error::ApiError;
use crate::requests::{
    AddAgentsRequest, AgentsAdded, ChatReply, ChatRequest, InterveneRequest, ResetRequest,
    RunOutcome, RunRequest, StateEnvelope, TopicRequest, TtsRequest,
};

/// Header carrying the optional admin credential.
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Client for the simulation server's command/query endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    admin_token: Option<String>,
}

impl ApiClient {
    /// Create a client for the given HTTP(S) base address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBase`] if the address does not parse.
    pub fn new(base: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base).map_err(|e| ApiError::InvalidBase {
            base: base.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            admin_token: None,
        })
    }

    /// Attach an admin credential to every subsequent request.
    #[must_use]
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    /// Fetch the current authoritative snapshot.
    pub async fn state(&self) -> Result<StateSnapshot, ApiError> {
        let response = self.get("state").send().await.map_err(http_error)?;
        decode(expect_success(response).await?).await
    }

    /// Set the conversation topic.
    pub async fn set_topic(&self, request: &TopicRequest) -> Result<StateSnapshot, ApiError> {
        request.validate()?;
        self.post_for_state("topic", request).await
    }

    /// Add user personas to the roster.
    pub async fn add_agents(&self, request: &AddAgentsRequest) -> Result<AgentsAdded, ApiError> {
        request.validate()?;
        let response = self
            .post("agents")
            .json(request)
            .send()
            .await
            .map_err(http_error)?;
        decode(expect_success(response).await?).await
    }

    /// Run a batch of simulation rounds.
    ///
    /// The interesting output arrives on the event stream; the returned
    /// value only mirrors what the server reported synchronously.
    pub async fn run_rounds(&self, request: &RunRequest) -> Result<RunOutcome, ApiError> {
        request.validate()?;
        let response = self
            .post("run")
            .json(request)
            .send()
            .await
            .map_err(http_error)?;
        decode(expect_success(response).await?).await
    }

    /// Reset the conversation.
    ///
    /// The caller owns funneling the matching `reset()` into the sync
    /// engine; this only triggers the server side.
    pub async fn reset(&self, request: &ResetRequest) -> Result<StateSnapshot, ApiError> {
        request.validate()?;
        self.post_for_state("reset", request).await
    }

    /// Load the conversational demo scenario.
    pub async fn load_demo(&self) -> Result<AgentsAdded, ApiError> {
        let response = self.post("demo").send().await.map_err(http_error)?;
        decode(expect_success(response).await?).await
    }

    /// Load the dataset-driven demo scenario.
    pub async fn load_dataset_demo(&self) -> Result<AgentsAdded, ApiError> {
        let response = self.post("demo/dataset").send().await.map_err(http_error)?;
        decode(expect_success(response).await?).await
    }

    /// Upload a dataset file for the agents to discuss.
    pub async fn upload_dataset(
        &self,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<StateSnapshot, ApiError> {
        let part = reqwest::multipart::Part::bytes(contents).file_name(filename.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .post("dataset")
            .multipart(form)
            .send()
            .await
            .map_err(http_error)?;
        let envelope: StateEnvelope = decode(expect_success(response).await?).await?;
        Ok(envelope.state)
    }

    /// Submit a human intervention message.
    ///
    /// The local display merge happens in the sync engine, not here; this
    /// call only hands the message to the server for rebroadcast.
    pub async fn intervene(&self, request: &InterveneRequest) -> Result<(), ApiError> {
        request.validate()?;
        let response = self
            .post("intervene")
            .json(request)
            .send()
            .await
            .map_err(http_error)?;
        let _ = expect_success(response).await?;
        Ok(())
    }

    /// Run one draft-persona test chat turn and return the reply text.
    pub async fn test_chat(&self, request: &ChatRequest) -> Result<String, ApiError> {
        request.validate()?;
        let response = self
            .post("chat")
            .json(request)
            .send()
            .await
            .map_err(http_error)?;
        let reply: ChatReply = decode(expect_success(response).await?).await?;
        Ok(reply.reply)
    }

    /// Synthesize speech audio for a line of text. Returns encoded audio
    /// bytes, forwarded untouched to the playback layer.
    pub async fn synthesize_speech(&self, request: &TtsRequest) -> Result<Vec<u8>, ApiError> {
        request.validate()?;
        let response = self
            .post("tts")
            .json(request)
            .send()
            .await
            .map_err(http_error)?;
        let response = expect_success(response).await?;
        let bytes = response.bytes().await.map_err(http_error)?;
        Ok(bytes.to_vec())
    }

    /// POST an endpoint that answers with a `{"state": ...}` envelope.
    async fn post_for_state<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<StateSnapshot, ApiError> {
        let response = self
            .post(path)
            .json(body)
            .send()
            .await
            .map_err(http_error)?;
        let envelope: StateEnvelope = decode(expect_success(response).await?).await?;
        Ok(envelope.state)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorized(self.http.get(self.endpoint(path)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorized(self.http.post(self.endpoint(path)))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.admin_token {
            Some(token) => builder.header(ADMIN_TOKEN_HEADER, token),
            None => builder,
        }
    }

    /// Resolve an endpoint against the base address.
    ///
    /// `Url::join` cannot fail for the fixed relative paths used here, so
    /// a (theoretical) failure falls back to the base itself.
    fn endpoint(&self, path: &str) -> Url {
        debug!(path = path, "issuing command/query request");
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }
}

/// Map a non-success status to [`ApiError::Status`] with the body text.
async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Decode a JSON response body.
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map a transport-level reqwest failure.
fn http_error(error: reqwest::Error) -> ApiError {
    ApiError::Http(error.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_address_must_parse() {
        assert!(ApiClient::new("http://127.0.0.1:8000").is_ok());
        assert!(matches!(
            ApiClient::new("not an address"),
            Err(ApiError::InvalidBase { .. })
        ));
    }

    #[test]
    fn endpoints_resolve_against_the_base() {
        let client = ApiClient::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(client.endpoint("state").as_str(), "http://127.0.0.1:8000/state");
        assert_eq!(
            client.endpoint("demo/dataset").as_str(),
            "http://127.0.0.1:8000/demo/dataset"
        );
    }

    #[tokio::test]
    async fn invalid_payloads_fail_before_any_io() {
        // The address is unroutable; reaching it would hang or error with
        // an Http variant. Validation must short-circuit first.
        let client = ApiClient::new("http://192.0.2.1:1").unwrap();
        let result = client.run_rounds(&RunRequest { rounds: 0 }).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    // Tests below require a live simulation server; run them explicitly
    // with `cargo test -- --ignored` when one is up.
    #[tokio::test]
    #[ignore]
    async fn fetches_live_state() {
        let client = ApiClient::new("http://127.0.0.1:8000").unwrap();
        let snapshot = client.state().await.unwrap();
        assert!(!snapshot.topic.is_empty());
    }
}
