#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::FixedOffset;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Normal,
    Error,
}

/// A single chat message in a study session, either received live over the
/// session channel or loaded from history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub content: String,
    pub datetime: String,
    pub profile_picture_url: String,
    mtype: MessageType,
}

impl ChatMessage {
    pub fn new(
        sender: &str,
        content: &str,
        datetime: &str,
        profile_picture_url: &str,
    ) -> ChatMessage {
        return ChatMessage {
            sender: sender.to_string(),
            content: content.to_string().replace('\t', "  "),
            datetime: datetime.to_string(),
            profile_picture_url: profile_picture_url.to_string(),
            mtype: MessageType::Normal,
        };
    }

    /// Messages produced by the client itself, such as failures reported by
    /// the server. These stand in for the web app's alert dialogs.
    pub fn new_error(content: &str) -> ChatMessage {
        return ChatMessage {
            sender: "studysync".to_string(),
            content: content.to_string().replace('\t', "  "),
            datetime: "".to_string(),
            profile_picture_url: "".to_string(),
            mtype: MessageType::Error,
        };
    }

    pub fn message_type(&self) -> MessageType {
        return self.mtype;
    }

    /// Parsed send time. Accepts RFC 3339 as well as the naive ISO-8601
    /// timestamps servers emit when timezone support is off.
    pub fn sent_at(&self) -> Option<DateTime<FixedOffset>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.datetime) {
            return Some(parsed);
        }

        let utc = FixedOffset::east_opt(0)?;
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&self.datetime, format) {
                return Some(utc.from_utc_datetime(&naive));
            }
        }

        return None;
    }

    /// Whether both describe the same chat message, e.g. a live broadcast and
    /// its stored copy in a history page. Timestamps are compared as instants
    /// when both parse, so differing offsets or precision still match.
    pub fn is_same_as(&self, other: &ChatMessage) -> bool {
        if self.mtype != other.mtype || self.sender != other.sender || self.content != other.content
        {
            return false;
        }

        return match (self.sent_at(), other.sent_at()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => self.datetime == other.datetime,
        };
    }

    pub fn header(&self) -> String {
        let sender = if self.sender.is_empty() {
            "anonymous"
        } else {
            self.sender.as_str()
        };

        if let Some(sent_at) = self.sent_at() {
            return format!("{sender} · {}", sent_at.format("%Y-%m-%d %H:%M"));
        }

        return sender.to_string();
    }

    pub fn as_string_lines(&self, line_max_width: usize) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();

        for full_line in self.content.split('\n') {
            if full_line.trim().is_empty() {
                lines.push(" ".to_string());
                continue;
            }

            let mut char_count = 0;
            let mut current_lines: Vec<&str> = vec![];

            for word in full_line.split(' ') {
                if !current_lines.is_empty() && word.len() + char_count + 1 > line_max_width {
                    lines.push(current_lines.join(" ").trim_end().to_string());
                    current_lines = vec![word];
                    char_count = word.len() + 1;
                } else {
                    current_lines.push(word);
                    char_count += word.len() + 1;
                }
            }
            if !current_lines.is_empty() {
                lines.push(current_lines.join(" ").trim_end().to_string());
            }
        }

        return lines;
    }
}
