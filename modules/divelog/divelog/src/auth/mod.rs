//! Session tokens, cookies, password hashing and session validation.

pub mod cookie;
pub mod password;
pub mod session;
pub mod token;

pub use cookie::{SECURE_SESSION_COOKIE, SESSION_COOKIE, SessionCookie, extract_session_token};
pub use session::{Rejection, SessionValidator, SessionVersionLookup};
pub use token::{SessionClaims, TokenError, TokenIssuer};
