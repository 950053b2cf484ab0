#[cfg(test)]
#[path = "study_session_test.rs"]
mod tests;

use std::fmt;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

pub const MENU_PATH: &str = "main/collaborative-study-session-menu/";
pub const GENERATE_CODE_PATH: &str = "generate-study-session-code/";

/// Opaque token pointing at the next older page of a session's chat history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: &str) -> PageCursor {
        return PageCursor(token.to_string());
    }

    /// Cursor for the newest page, which the session page renders on load.
    pub fn first() -> PageCursor {
        return PageCursor::new("1");
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}

/// A collaborative study session, addressed by its code. All URLs the client
/// talks to are derived from the server base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudySession {
    pub code: String,
    server_url: String,
}

impl StudySession {
    pub fn new(server_url: &str, code: &str) -> Result<StudySession> {
        let code = code.trim();
        if code.is_empty() {
            bail!("A study session code is required");
        }
        if code.contains('/') || code.contains('?') || code.contains('#') {
            bail!(format!("Invalid study session code: {code}"));
        }

        let server_url = server_url.trim().trim_end_matches('/');
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            bail!(format!(
                "Server URL must start with http:// or https://, got '{server_url}'"
            ));
        }

        return Ok(StudySession {
            code: code.to_string(),
            server_url: server_url.to_string(),
        });
    }

    pub fn menu_url(server_url: &str) -> String {
        return format!("{}/{MENU_PATH}", server_url.trim_end_matches('/'));
    }

    pub fn generate_code_url(server_url: &str) -> String {
        return format!("{}/{GENERATE_CODE_PATH}", server_url.trim_end_matches('/'));
    }

    /// Page of the session, which also serves paginated history when asked
    /// with the `messages-page` query parameter.
    pub fn page_url(&self) -> String {
        return format!(
            "{}study-session/{}",
            StudySession::menu_url(&self.server_url),
            self.code
        );
    }

    pub fn channel_url(&self) -> String {
        let (scheme, host) = match self.server_url.split_once("://") {
            Some(("https", host)) => ("wss", host),
            Some((_, host)) => ("ws", host),
            None => ("ws", self.server_url.as_str()),
        };
        let host = host.split('/').next().unwrap_or(host);

        return format!("{scheme}://{host}/ws/study-session/{}/", self.code);
    }
}
