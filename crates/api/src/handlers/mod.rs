//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers delegate to the services held in [`crate::state::AppState`] and
//! map errors via [`crate::error::AppError`].

pub mod auth;
pub mod predict;
pub mod pricing;
