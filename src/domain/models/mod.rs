mod action;
mod envelope;
mod event;
mod message;
mod pomodoro;
mod study_session;
mod textarea;

pub use action::*;
pub use envelope::*;
pub use event::*;
pub use message::*;
pub use pomodoro::*;
pub use study_session::*;
pub use textarea::*;
