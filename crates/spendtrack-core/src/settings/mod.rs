//! Single-field account settings updates.
//!
//! One update changes the username, the email, or the password. A
//! successful update may carry a rotated token, which is written together
//! with the local profile change. See `SettingsSession::update_field`.

pub mod session;

use std::fmt;

use serde_json::{json, Value};

use crate::api::SettingsUpdateResponse;
use crate::models::UserProfile;
use crate::utils::capitalize;

pub use session::SettingsSession;

/// Account attribute that can be changed from the settings page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    Username,
    Email,
    Password,
}

impl SettingsField {
    pub const ALL: [SettingsField; 3] = [
        SettingsField::Username,
        SettingsField::Email,
        SettingsField::Password,
    ];

    /// Wire name, also the last path segment of `PUT /settings/{field}`
    pub fn as_str(self) -> &'static str {
        match self {
            SettingsField::Username => "username",
            SettingsField::Email => "email",
            SettingsField::Password => "password",
        }
    }

    /// Parse a wire name. Anything unknown is `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untyped value as collected by a form, before it is matched to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsValue {
    Text(String),
    Password {
        current_password: String,
        new_password: String,
    },
}

/// A requested change to exactly one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsUpdate {
    Username(String),
    Email(String),
    Password {
        current_password: String,
        new_password: String,
    },
}

impl SettingsUpdate {
    /// Pair a field name with a value. Unknown field names, and values of the
    /// wrong shape for the field, give `None`.
    pub fn from_parts(field: &str, value: SettingsValue) -> Option<Self> {
        match (SettingsField::parse(field)?, value) {
            (SettingsField::Username, SettingsValue::Text(v)) => Some(SettingsUpdate::Username(v)),
            (SettingsField::Email, SettingsValue::Text(v)) => Some(SettingsUpdate::Email(v)),
            (
                SettingsField::Password,
                SettingsValue::Password {
                    current_password,
                    new_password,
                },
            ) => Some(SettingsUpdate::Password {
                current_password,
                new_password,
            }),
            _ => None,
        }
    }

    pub fn field(&self) -> SettingsField {
        match self {
            SettingsUpdate::Username(_) => SettingsField::Username,
            SettingsUpdate::Email(_) => SettingsField::Email,
            SettingsUpdate::Password { .. } => SettingsField::Password,
        }
    }

    /// JSON body for `PUT /settings/{field}`
    pub fn request_body(&self) -> Value {
        match self {
            SettingsUpdate::Username(v) => json!({ "newUsername": v }),
            SettingsUpdate::Email(v) => json!({ "newEmail": v }),
            SettingsUpdate::Password {
                current_password,
                new_password,
            } => json!({
                "currentPassword": current_password,
                "newPassword": new_password,
            }),
        }
    }
}

/// Message for the user after an update finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    /// `"Email successfully updated!"`
    pub fn updated(field: SettingsField) -> Self {
        Notification::Success(format!("{} successfully updated!", capitalize(field.as_str())))
    }

    /// `"Error updating email: <detail>"`
    pub fn update_failed(field: SettingsField, detail: impl fmt::Display) -> Self {
        Notification::Error(format!("Error updating {}: {}", field, detail))
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::Success(m) | Notification::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// What became of one `update_field` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The request completed, successfully or not
    Notified(Notification),
    /// The caller went away; nothing was changed locally
    Cancelled,
    /// Unknown field or mismatched value; no request was made
    Ignored,
}

impl UpdateOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            UpdateOutcome::Notified(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UpdateOutcome::Notified(Notification::Success(_)))
    }
}

/// Profile after a confirmed update: the changed field takes the value that
/// was requested, not whatever the backend echoed back. Password changes
/// leave the profile as it was.
pub fn apply_update_result(
    profile: &UserProfile,
    update: &SettingsUpdate,
    _response: &SettingsUpdateResponse,
) -> UserProfile {
    let mut next = profile.clone();
    match update {
        SettingsUpdate::Username(v) => next.username = v.clone(),
        SettingsUpdate::Email(v) => next.email = v.clone(),
        SettingsUpdate::Password { .. } => {}
    }
    next
}
