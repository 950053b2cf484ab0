use super::PageCursor;

pub enum Action {
    LoadHistory(PageCursor),
    PomodoroReset(),
    /// Carries the run number the resulting ticks are tagged with.
    PomodoroStart(u64),
    PomodoroStop(),
    SendMessage(String),
}
