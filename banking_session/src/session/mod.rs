mod errors;
mod manager;
mod types;

pub use errors::SessionError;
pub use manager::SessionManager;
pub use types::{AccountCategory, Session, SessionStatus, UserId};
