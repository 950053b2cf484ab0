pub mod api;
pub mod channel;
