use tui_textarea::Input;

use super::ChatMessage;
use super::HistoryPage;
use super::PageCursor;

pub enum Event {
    ChannelClosed(),
    ChannelMessage(ChatMessage),
    /// Carries the cursor the page was requested with so stale responses can
    /// be told apart from the current one.
    HistoryPage(PageCursor, HistoryPage),
    HistoryFailed(PageCursor),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardCTRLL(),
    KeyboardCTRLP(),
    KeyboardCTRLR(),
    KeyboardEnter(),
    KeyboardPaste(String),
    NotifyError(String),
    PomodoroTick(u64),
    UIScrollDown(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UIScrollUp(),
    UITick(),
}
