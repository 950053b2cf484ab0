#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;

use super::ChatLog;
use super::HistoryPaginator;
use super::Scroll;
use crate::domain::models::Action;
use crate::domain::models::ChatMessage;
use crate::domain::models::HistoryPage;
use crate::domain::models::PageCursor;
use crate::domain::models::PomodoroState;
use crate::domain::models::PomodoroTick;
use crate::domain::models::StudySession;

pub struct AppState {
    pub channel_closed: bool,
    pub chat_log: ChatLog,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub paginator: HistoryPaginator,
    pub pomodoro: PomodoroState,
    pub pomodoro_run: u64,
    pub pomodoro_running: bool,
    pub scroll: Scroll,
    pub session: Option<StudySession>,
}

impl AppState {
    pub fn new(session: Option<StudySession>) -> AppState {
        let mut paginator = HistoryPaginator::exhausted();
        if session.is_some() {
            paginator = HistoryPaginator::new(PageCursor::first());
        }

        return AppState {
            channel_closed: false,
            chat_log: ChatLog::new(),
            last_known_height: 0,
            last_known_width: 0,
            paginator,
            pomodoro: PomodoroState::default(),
            pomodoro_run: 0,
            pomodoro_running: false,
            scroll: Scroll::default(),
            session,
        };
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    pub fn chat_title(&self) -> String {
        let mut title = "Pomodoro".to_string();
        if let Some(session) = &self.session {
            title = format!("Study session {}", session.code);
            if self.channel_closed {
                title = format!("{title} (disconnected)");
            }
        }

        if self.paginator.is_loading() {
            return format!("{title} · loading older messages...");
        }
        if self.paginator.has_more() {
            return format!("{title} · CTRL+L for older messages");
        }

        return title;
    }

    /// Messages broadcast over the session channel, including the user's own.
    pub fn handle_channel_message(&mut self, message: ChatMessage) {
        self.chat_log.append(message);
        self.sync_dependants();
        self.scroll.last();
    }

    /// The channel does not come back, so this only changes the title.
    pub fn handle_channel_closed(&mut self) {
        self.channel_closed = true;
    }

    /// Client generated notices, shown at the bottom of the log.
    pub fn add_message(&mut self, message: ChatMessage) {
        self.handle_channel_message(message);
    }

    pub fn handle_history_page(&mut self, cursor: &PageCursor, page: HistoryPage) {
        let mut messages = match self.paginator.apply(cursor, page) {
            Some(messages) => messages,
            None => return,
        };

        // Messages broadcast live while the page was in flight can be in it too.
        let known = self.chat_log.messages();
        messages.retain(|message| {
            return !known.iter().any(|existing| return existing.is_same_as(message));
        });
        if messages.is_empty() {
            return;
        }

        let was_empty = self.chat_log.is_empty();
        let added = self.chat_log.prepend_page(messages);
        self.sync_dependants();

        if was_empty {
            self.scroll.last();
        } else {
            self.scroll.shift(u16::try_from(added).unwrap_or(u16::MAX));
        }
    }

    pub fn handle_history_failed(&mut self, cursor: &PageCursor) {
        self.paginator.fail(cursor);
    }

    /// Requests the next older page of history, if any is left.
    pub fn load_more(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if let Some(cursor) = self.paginator.begin_load() {
            tx.send(Action::LoadHistory(cursor))?;
        }

        return Ok(());
    }

    /// Hands the text to the session channel. Nothing is added to the log
    /// here; the message shows up once the server broadcasts it back.
    pub fn send_message(&mut self, text: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        if self.session.is_none() || text.trim().is_empty() {
            return Ok(false);
        }

        tx.send(Action::SendMessage(text.to_string()))?;
        return Ok(true);
    }

    pub fn toggle_pomodoro(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.pomodoro.is_finished() {
            return Ok(());
        }

        self.pomodoro_running = !self.pomodoro_running;
        if self.pomodoro_running {
            self.pomodoro_run += 1;
            tx.send(Action::PomodoroStart(self.pomodoro_run))?;
        } else {
            tx.send(Action::PomodoroStop())?;
        }

        return Ok(());
    }

    pub fn reset_pomodoro(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        self.pomodoro.reset();
        self.pomodoro_running = false;
        tx.send(Action::PomodoroReset())?;

        return Ok(());
    }

    pub fn handle_pomodoro_tick(
        &mut self,
        run: u64,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        // Ticks queued by a stopped or earlier run.
        if !self.pomodoro_running || run != self.pomodoro_run {
            return Ok(());
        }

        match self.pomodoro.tick() {
            PomodoroTick::Counting => (),
            PomodoroTick::Transitioned(mode) => {
                tracing::info!(mode = %mode, cycle = self.pomodoro.cycle, "Pomodoro mode changed");
            }
            PomodoroTick::Finished => {
                tracing::info!("Pomodoro cycles finished");
                self.pomodoro_running = false;
                tx.send(Action::PomodoroStop())?;
            }
        }

        return Ok(());
    }

    fn sync_dependants(&mut self) {
        self.chat_log
            .set_width(self.last_known_width.saturating_sub(2) as usize);

        // One row goes to the log's title border.
        self.scroll.set_state(
            u16::try_from(self.chat_log.len()).unwrap_or(u16::MAX),
            self.last_known_height.saturating_sub(1),
        );
    }
}
