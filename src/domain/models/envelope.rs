#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;

use serde::de;
use serde::Deserializer;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::ChatMessage;
use super::PageCursor;

/// Payload written to the session channel for every chat message the user
/// sends.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

impl OutboundEnvelope {
    pub fn new(message: &str, profile_picture_url: &str) -> OutboundEnvelope {
        let mut envelope = OutboundEnvelope {
            message: message.to_string(),
            profile_picture_url: None,
        };

        if !profile_picture_url.is_empty() {
            envelope.profile_picture_url = Some(profile_picture_url.to_string());
        }

        return envelope;
    }
}

/// Payload broadcast by the server to every member of a session. Older
/// servers only send `message`, so every field is optional on the wire.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEnvelope {
    pub message: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub datetime: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub profile_picture_url: String,
}

impl From<InboundEnvelope> for ChatMessage {
    fn from(envelope: InboundEnvelope) -> ChatMessage {
        return ChatMessage::new(
            &envelope.sender,
            &envelope.message,
            &envelope.datetime,
            &envelope.profile_picture_url,
        );
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sender: String,
    pub message_content: String,
    #[serde(default)]
    pub datetime: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub profile_picture_url: String,
}

impl From<HistoryEntry> for ChatMessage {
    fn from(entry: HistoryEntry) -> ChatMessage {
        return ChatMessage::new(
            &entry.sender,
            &entry.message_content,
            &entry.datetime,
            &entry.profile_picture_url,
        );
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub messages: Vec<HistoryEntry>,
    pub has_next_messages_page: bool,
    #[serde(default, deserialize_with = "cursor_from_any")]
    pub next_messages_page: Option<PageCursor>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCodeResponse {
    pub study_session_code: String,
}

/// Application level failure. The server returns these with a 200 status.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let val: Option<String> = de::Deserialize::deserialize(deserializer)?;
    return Ok(val.unwrap_or_default());
}

// Page numbers arrive as JSON numbers from paginated views, but the cursor is
// opaque to the client.
fn cursor_from_any<'de, D>(deserializer: D) -> Result<Option<PageCursor>, D::Error>
where
    D: Deserializer<'de>,
{
    let val: Option<serde_json::Value> = de::Deserialize::deserialize(deserializer)?;
    let cursor = match val {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(PageCursor::new(&text)),
        Some(serde_json::Value::Number(num)) => Some(PageCursor::new(&num.to_string())),
        Some(other) => {
            return Err(de::Error::custom(format!(
                "invalid messages page cursor: {other}"
            )));
        }
    };

    return Ok(cursor);
}
