//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **User** (`/user/*`): Registration, token issuance, self management
//! - **Tags** (`/recipe/tags*`): Owner-scoped tag CRUD
//! - **Ingredients** (`/recipe/ingredients*`): Owner-scoped ingredient CRUD
//! - **Recipes** (`/recipe/recipes*`): Owner-scoped recipe CRUD and image upload
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
