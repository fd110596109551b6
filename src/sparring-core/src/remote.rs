//! Best-effort round-start notification to the hosted backend.
//!
//! The call is fire-and-forget: the controller never waits on it, and any
//! transport or parse failure is logged and dropped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SparringError;
use crate::session::Session;

/// What is sent when a round starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStartRequest {
    pub topic: String,
    pub stance: String,
    pub language: String,
    pub gender: String,
    pub session_id: String,
}

impl RoundStartRequest {
    pub fn from_session(session: &Session, session_id: &str) -> Self {
        Self {
            topic: session.topic.clone(),
            stance: session.stance.display_name().to_string(),
            language: session.language.display_name().to_string(),
            gender: session.voice.display_name().to_string(),
            session_id: session_id.to_string(),
        }
    }
}

/// The backend's answer to a round start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReply {
    pub status: String,
    pub timer: String,
}

#[derive(Serialize)]
struct CallBody<'a> {
    data: [&'a str; 5],
}

#[derive(Deserialize)]
struct CallResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Positional arguments of the `on_start_round` call.
fn call_body(request: &RoundStartRequest) -> CallBody<'_> {
    CallBody {
        data: [
            request.topic.as_str(),
            request.stance.as_str(),
            request.language.as_str(),
            request.gender.as_str(),
            request.session_id.as_str(),
        ],
    }
}

/// Something to tell about round starts.
#[async_trait]
pub trait RoundNotifier: Send + Sync {
    async fn announce(&self, request: &RoundStartRequest) -> Result<RemoteReply, SparringError>;
}

/// Posts round starts to the backend's `on_start_round` call.
pub struct HttpNotifier {
    client: reqwest::Client,
    api_url: String,
}

impl HttpNotifier {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, SparringError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                SparringError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/call/on_start_round", self.api_url)
    }
}

#[async_trait]
impl RoundNotifier for HttpNotifier {
    async fn announce(&self, request: &RoundStartRequest) -> Result<RemoteReply, SparringError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&call_body(request))
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        parse_reply(&text)
    }
}

/// Extract `{status, timer}` from a `{"data": [status, timer, ...]}` body.
pub fn parse_reply(body: &str) -> Result<RemoteReply, SparringError> {
    let parsed: CallResponse = serde_json::from_str(body)
        .map_err(|e| SparringError::RemoteReply(format!("invalid JSON: {}", e)))?;

    let mut fields = parsed.data.into_iter();
    let status = match fields.next() {
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => return Err(SparringError::RemoteReply("empty data array".to_string())),
    };
    let timer = match fields.next() {
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    };

    Ok(RemoteReply {
        status: sanitize_status(&status),
        timer: timer.trim().to_string(),
    })
}

/// Strip markup from backend status text for plain-terminal display.
///
/// Removes HTML-like tags and markdown emphasis, then collapses whitespace
/// within each line while keeping line breaks.
pub fn sanitize_status(text: &str) -> String {
    let mut result = text.to_string();

    if let Ok(tag_re) = regex::Regex::new(r"</?[A-Za-z][^>]*>") {
        result = tag_re.replace_all(&result, "").to_string();
    }

    result = result.replace("**", "").replace('*', "");

    if let Ok(ws_re) = regex::Regex::new(r"[ \t]+") {
        result = ws_re.replace_all(&result, " ").to_string();
    }

    result
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Language, Stance, VoiceGender};

    #[test]
    fn test_parse_reply() {
        let reply = parse_reply(r#"{"data": ["Round 1 started", "05:00"]}"#).unwrap();
        assert_eq!(reply.status, "Round 1 started");
        assert_eq!(reply.timer, "05:00");
    }

    #[test]
    fn test_parse_reply_without_timer() {
        let reply = parse_reply(r#"{"data": ["ok"]}"#).unwrap();
        assert_eq!(reply.status, "ok");
        assert_eq!(reply.timer, "");
    }

    #[test]
    fn test_parse_reply_rejects_empty_and_garbage() {
        assert!(matches!(
            parse_reply(r#"{"data": []}"#),
            Err(SparringError::RemoteReply(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"event_id": "abc"}"#),
            Err(SparringError::RemoteReply(_))
        ));
        assert!(matches!(parse_reply("<html>"), Err(SparringError::RemoteReply(_))));
    }

    #[test]
    fn test_sanitize_status_strips_markup() {
        let input = "<b>**Round 1**</b>   started\n  <i>good luck</i>  ";
        assert_eq!(sanitize_status(input), "Round 1 started\ngood luck");
    }

    #[test]
    fn test_sanitize_status_plain_text_unchanged() {
        assert_eq!(sanitize_status("No markup here."), "No markup here.");
    }

    #[test]
    fn test_request_from_session() {
        let session = Session::default();
        let request = RoundStartRequest::from_session(&session, "session_1");
        assert_eq!(request.stance, "For");
        assert_eq!(request.language, "English");
        assert_eq!(request.gender, "Male");
        assert_eq!(request.session_id, "session_1");
    }

    #[test]
    fn test_call_body_field_order() {
        let mut session = Session::default();
        session.topic = "Remote work boosts productivity".to_string();
        session.stance = Stance::Against;
        session.language = Language::Igbo;
        session.voice = VoiceGender::Female;
        let request = RoundStartRequest::from_session(&session, "session_42");

        let body = serde_json::to_value(call_body(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "data": [
                    "Remote work boosts productivity",
                    "Against",
                    "Igbo",
                    "Female",
                    "session_42"
                ]
            })
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let notifier = HttpNotifier::new("http://localhost:7860/", Duration::from_secs(1)).unwrap();
        assert_eq!(notifier.endpoint(), "http://localhost:7860/call/on_start_round");
    }
}
