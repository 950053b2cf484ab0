#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

use super::PomodoroTimer;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::PageCursor;
use crate::domain::models::StudySession;
use crate::infrastructure::api::ApplicationError;
use crate::infrastructure::api::StudySessionApi;
use crate::infrastructure::channel::SessionChannel;

/// Owns everything that talks to the outside world: the session channel,
/// the history endpoint and the Pomodoro tick source. The UI drives it with
/// `Action`s and hears back through `Event`s.
pub struct ActionsService {
    api: StudySessionApi,
    channel: Option<SessionChannel>,
    session: Option<StudySession>,
    timer: PomodoroTimer,
    tx: mpsc::UnboundedSender<Event>,
}

impl ActionsService {
    pub fn new(
        api: StudySessionApi,
        session: Option<StudySession>,
        tick_quantum: Duration,
        tx: mpsc::UnboundedSender<Event>,
    ) -> ActionsService {
        return ActionsService {
            api,
            channel: None,
            session,
            timer: PomodoroTimer::new(tick_quantum, tx.clone()),
            tx,
        };
    }

    /// Opens the session channel on its own task so actions keep flowing while
    /// the handshake is pending. The receiver resolves with the channel, or
    /// errors when there is no session or the connection failed.
    fn spawn_connect(&self, profile_picture_url: &str) -> oneshot::Receiver<SessionChannel> {
        let (channel_tx, channel_rx) = oneshot::channel();
        let session = match &self.session {
            Some(session) => session.clone(),
            None => return channel_rx,
        };

        let profile_picture_url = profile_picture_url.to_string();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match SessionChannel::connect(&session, &profile_picture_url, tx.clone()).await {
                Ok(channel) => {
                    let _ = channel_tx.send(channel);
                }
                Err(err) => {
                    tracing::error!(error = ?err, code = %session.code, "Failed to join study session");
                    let _ = tx.send(Event::NotifyError(format!(
                        "Could not connect to study session {}: {err}",
                        session.code
                    )));
                }
            }
        });

        return channel_rx;
    }

    fn load_history(&self, cursor: PageCursor) -> Result<()> {
        let session = match &self.session {
            Some(session) => session.clone(),
            None => {
                self.tx.send(Event::HistoryFailed(cursor))?;
                return Ok(());
            }
        };

        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match api.fetch_history_page(&session, &cursor).await {
                Ok(page) => {
                    let _ = tx.send(Event::HistoryPage(cursor, page));
                }
                Err(err) => {
                    tracing::error!(error = ?err, cursor = %cursor, "Failed to load older messages");
                    if let Some(app_err) = err.downcast_ref::<ApplicationError>() {
                        let _ = tx.send(Event::NotifyError(app_err.to_string()));
                    }
                    let _ = tx.send(Event::HistoryFailed(cursor));
                }
            }
        });

        return Ok(());
    }

    async fn send_message(&mut self, text: &str) {
        let channel = match &mut self.channel {
            Some(channel) if channel.is_open() => channel,
            _ => {
                tracing::warn!("Dropping message, the session channel is not open");
                return;
            }
        };

        if let Err(err) = channel.send(text).await {
            tracing::error!(error = ?err, "Failed to send chat message");
        }
    }

    pub async fn handle(&mut self, action: Action) -> Result<()> {
        match action {
            Action::LoadHistory(cursor) => {
                self.load_history(cursor)?;
            }
            Action::PomodoroReset() => {
                self.timer.stop();
            }
            Action::PomodoroStart(run) => {
                self.timer.start(run);
            }
            Action::PomodoroStop() => {
                self.timer.stop();
            }
            Action::SendMessage(text) => {
                self.send_message(&text).await;
            }
        }

        return Ok(());
    }

    pub async fn start(
        mut self,
        profile_picture_url: &str,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let mut connecting = self.spawn_connect(profile_picture_url);
        let mut connected = false;

        loop {
            tokio::select! {
                res = &mut connecting, if !connected => {
                    connected = true;
                    if let Ok(channel) = res {
                        self.channel = Some(channel);
                    }
                }
                action = rx.recv() => match action {
                    Some(action) => self.handle(action).await?,
                    None => return Ok(()),
                },
            }
        }
    }
}
