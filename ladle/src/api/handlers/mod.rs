//! Axum route handlers for all API endpoints.
//!
//! Handlers resolve the calling user through the [`CurrentUser`] extractor,
//! translate wire models to database requests, and drive the repositories in
//! [`crate::db::handlers`]. Every tag/ingredient/recipe operation is scoped to
//! the authenticated owner.
//!
//! [`CurrentUser`]: crate::api::models::users::CurrentUser

pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;
