use serde::{Deserialize, Serialize};

/// Currency shown when the backend has none on record
pub const DEFAULT_CURRENCY: &str = "USD";

/// Locally cached view of the account, as shown on the settings page
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
}

/// Response of `GET /settings/populate`
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "primaryCurrency", default)]
    pub primary_currency: Option<String>,
}

impl SettingsSnapshot {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    pub fn currency(&self) -> &str {
        self.primary_currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }
}
