#[cfg(test)]
#[path = "api_test.rs"]
mod tests;


use anyhow::bail;
use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ErrorResponse;
use crate::domain::models::HistoryPage;
use crate::domain::models::PageCursor;
use crate::domain::models::SessionCodeResponse;
use crate::domain::models::StudySession;

const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// An `{"error": "..."}` payload returned by the server. Unlike transport
/// failures these are meant to be shown to the user.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ApplicationError(pub String);

/// Request/response calls against the web application's study session views.
#[derive(Clone)]
pub struct StudySessionApi {
    client: reqwest::Client,
    csrf_token: String,
    server_url: String,
}

impl Default for StudySessionApi {
    fn default() -> StudySessionApi {
        return StudySessionApi::new(
            &Config::get(ConfigKey::ServerURL),
            &Config::get(ConfigKey::CsrfToken),
        );
    }
}

/// Application failures come back as `{"error": "..."}` with a 200 status, so
/// the body is checked for one before decoding the expected payload.
async fn parse_response<T: DeserializeOwned>(res: reqwest::Response, request: &str) -> Result<T> {
    let status = res.status();
    let body = res.text().await?;

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
        tracing::error!(request, error = %err.error, "Server returned an error");
        return Err(ApplicationError(err.error).into());
    }

    if !status.is_success() {
        tracing::error!(request, status = status.as_u16(), "Request failed");
        bail!(format!("{request} failed with status {}", status.as_u16()));
    }

    return Ok(serde_json::from_str::<T>(&body)?);
}

impl StudySessionApi {
    pub fn new(server_url: &str, csrf_token: &str) -> StudySessionApi {
        return StudySessionApi {
            client: reqwest::Client::new(),
            csrf_token: csrf_token.to_string(),
            server_url: server_url.trim_end_matches('/').to_string(),
        };
    }

    pub fn session(&self, code: &str) -> Result<StudySession> {
        return StudySession::new(&self.server_url, code);
    }

    /// Asks the server for a fresh session code.
    pub async fn generate_session_code(&self) -> Result<String> {
        let res = self
            .client
            .post(StudySession::generate_code_url(&self.server_url))
            .header("X-CSRFToken", &self.csrf_token)
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let body: SessionCodeResponse = parse_response(res, "Generate session code").await?;
        if body.study_session_code.is_empty() {
            bail!("The server returned an empty session code");
        }

        tracing::debug!(code = %body.study_session_code, "Generated session code");
        return Ok(body.study_session_code);
    }

    pub async fn fetch_history_page(
        &self,
        session: &StudySession,
        cursor: &PageCursor,
    ) -> Result<HistoryPage> {
        let res = self
            .client
            .get(session.page_url())
            .query(&[("messages-page", cursor.as_str())])
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .send()
            .await?;

        let page: HistoryPage = parse_response(res, "Fetch history page").await?;
        return Ok(page);
    }
}
