pub mod actions;
mod app_state;
mod chat_log;
pub mod events;
mod paginator;
mod pomodoro_timer;
mod scroll;

pub use app_state::*;
pub use chat_log::*;
pub use paginator::*;
pub use pomodoro_timer::*;
pub use scroll::*;
