//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by repositories to return query results
//! and accept insertion/update data. They are distinct from API models so the
//! storage and wire representations can evolve independently.

pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;
