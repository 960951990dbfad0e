//! Data models for the expense backend.
//!
//! - `UserProfile`, `SettingsSnapshot`: account settings
//! - `Category`, `NewCategory`, `Icon`: spending categories
//! - `Transaction`, `NewTransaction`: recorded expenses
//! - `PredefinedLimit`: spending limit presets

pub mod category;
pub mod limit;
pub mod settings;
pub mod transaction;

pub use category::{Category, Icon, NewCategory};
pub use limit::PredefinedLimit;
pub use settings::{SettingsSnapshot, UserProfile, DEFAULT_CURRENCY};
pub use transaction::{NewTransaction, Transaction};
