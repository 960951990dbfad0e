//! Core library for spendtrack.
//!
//! Provides the pieces a front end needs to talk to the expense backend:
//!
//! - `auth`: token storage, unverified claim decoding, and the session guard
//! - `api`: the HTTP client for every backend endpoint
//! - `settings`: the single-field settings update protocol
//! - `forms`: login/registration validation
//! - `summary`: month-over-month spending summary
//! - `config`: persisted configuration and base URL resolution

pub mod api;
pub mod auth;
pub mod cancel;
pub mod config;
pub mod forms;
pub mod models;
pub mod settings;
pub mod summary;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionGuard, TokenStore};
pub use cancel::{CancelScope, CancelSignal};
pub use config::Config;
pub use settings::{Notification, SettingsSession, SettingsUpdate, UpdateOutcome};
