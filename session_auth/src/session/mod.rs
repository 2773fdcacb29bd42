mod errors;
mod main;
mod token;
mod types;

pub use errors::SessionError;
pub use main::SessionManager;
pub use token::{derive_session_id, generate_session_token};
pub use types::{Session, SessionValidationResult, User};
