pub mod chat;
pub mod daemon;
pub mod onboard;
pub mod status;
