pub mod channel;
pub mod event;
pub mod interpret;
pub mod log;
pub mod session;
