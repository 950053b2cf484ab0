#[cfg(test)]
#[path = "paginator_test.rs"]
mod tests;

use crate::domain::models::ChatMessage;
use crate::domain::models::HistoryPage;
use crate::domain::models::PageCursor;

/// Tracks which page of a session's chat history comes next. The cursor is
/// only present while older messages exist; once the server reports the last
/// page it is dropped for good.
#[derive(Debug, Default)]
pub struct HistoryPaginator {
    cursor: Option<PageCursor>,
    in_flight: Option<PageCursor>,
}

/// Orders a page oldest first. Pages without parseable timestamps keep the
/// order the server sent them in.
fn oldest_first(mut messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let all_timed = messages.iter().all(|message| {
        return message.sent_at().is_some();
    });

    if all_timed {
        messages.sort_by_key(|message| {
            return message.sent_at();
        });
    }

    return messages;
}

impl HistoryPaginator {
    pub fn new(first: PageCursor) -> HistoryPaginator {
        return HistoryPaginator {
            cursor: Some(first),
            in_flight: None,
        };
    }

    /// A paginator with no history left, used when there is no session.
    pub fn exhausted() -> HistoryPaginator {
        return HistoryPaginator::default();
    }

    pub fn has_more(&self) -> bool {
        return self.cursor.is_some();
    }

    pub fn is_loading(&self) -> bool {
        return self.in_flight.is_some();
    }

    pub fn cursor(&self) -> Option<&PageCursor> {
        return self.cursor.as_ref();
    }

    /// Returns the cursor to request next, or `None` when history is
    /// exhausted or a page is already on its way.
    pub fn begin_load(&mut self) -> Option<PageCursor> {
        if self.in_flight.is_some() {
            return None;
        }

        let cursor = self.cursor.clone()?;
        self.in_flight = Some(cursor.clone());

        return Some(cursor);
    }

    /// Consumes a fetched page and returns its messages oldest first, ready to
    /// be placed before the oldest message in the log. Responses for a cursor
    /// that is not in flight are dropped.
    pub fn apply(&mut self, requested: &PageCursor, page: HistoryPage) -> Option<Vec<ChatMessage>> {
        if self.in_flight.as_ref() != Some(requested) {
            tracing::warn!(cursor = %requested, "Dropping stale history page");
            return None;
        }
        self.in_flight = None;

        self.cursor = None;
        if page.has_next_messages_page {
            if page.next_messages_page.is_none() {
                tracing::warn!(
                    cursor = %requested,
                    "History page reported more pages without a cursor"
                );
            }
            self.cursor = page.next_messages_page;
        }

        let messages = page
            .messages
            .into_iter()
            .map(ChatMessage::from)
            .collect::<Vec<ChatMessage>>();

        tracing::debug!(
            cursor = %requested,
            count = messages.len(),
            has_more = self.cursor.is_some(),
            "Loaded history page"
        );

        return Some(oldest_first(messages));
    }

    /// A failed fetch leaves the cursor where it was so the same page can be
    /// requested again.
    pub fn fail(&mut self, requested: &PageCursor) {
        if self.in_flight.as_ref() == Some(requested) {
            self.in_flight = None;
        }
    }
}
