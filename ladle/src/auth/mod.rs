//! Authentication: password hashing, JWT session tokens and the request
//! extractor that resolves the calling user.
//!
//! Two credential formats are accepted on protected routes:
//!
//! - `Authorization: Bearer <jwt>` - the token returned by `POST /user/token`
//! - the session cookie set alongside the token response (for browser clients)
//!
//! Both carry the same JWT, created by [`session::create_session_token`] and
//! verified by [`session::verify_session_token`]. The [`current_user`] module
//! provides the axum extractor that tries each method in order and rejects the
//! request with a 401 when neither yields a valid user.

pub mod current_user;
pub mod password;
pub mod session;
