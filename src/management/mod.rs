mod auth;
mod cache;
mod session;

pub use auth::TokenManager;
pub use cache::TtlCache;
pub use session::{LOGIN_STATE_TTL, SESSION_TTL, SessionStore};
