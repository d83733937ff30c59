//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: User account management and authentication
//! - [`Tags`]: User-scoped recipe tags
//! - [`Ingredients`]: User-scoped recipe ingredients
//! - [`Recipes`]: Recipes and their tag/ingredient links
//!
//! The shared SQL for the two label tables (owner scoping, the assigned-only
//! DISTINCT filter, name-descending order) lives in [`labels`].

pub mod ingredients;
pub mod labels;
pub mod recipes;
pub mod repository;
pub mod tags;
pub mod users;

pub use ingredients::Ingredients;
pub use recipes::Recipes;
pub use repository::Repository;
pub use tags::Tags;
pub use users::Users;
