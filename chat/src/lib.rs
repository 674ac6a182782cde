pub mod command;
pub mod models;
pub mod relay_client;
pub mod session;

pub use command::Command;
pub use models::*;
pub use relay_client::RelayClient;
pub use session::{ChatSession, ChatState, SessionError, FALLBACK_REPLY};
