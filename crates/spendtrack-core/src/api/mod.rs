//! REST API client module for the expense backend.
//!
//! This module provides the `ApiClient` for authentication, settings,
//! category, icon, transaction, and limit endpoints.
//!
//! Authenticated endpoints use a JWT bearer token obtained from
//! `/auth/login` or `/auth/register`.

pub mod client;
pub mod error;

pub use client::{ApiClient, SettingsUpdateResponse};
pub use error::{ApiError, ApiResult};
