//! Client-side validation for the login and registration forms.
//!
//! Each form reports the set of offending fields plus one aggregated
//! message. When several rules fail, the message is the last violation
//! checked (fields are checked in form order). The message is shown in an
//! `ErrorBanner` that hides itself ten seconds after it was raised.

use chrono::{DateTime, Duration, Utc};

/// How long a validation banner stays visible
pub const ERROR_DISPLAY_SECS: i64 = 10;

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Username,
    Email,
    Password,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub invalid: Vec<FormField>,
    pub message: Option<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    pub fn is_invalid(&self, field: FormField) -> bool {
        self.invalid.contains(&field)
    }

    fn reject(&mut self, field: FormField, message: &str) {
        if !self.invalid.contains(&field) {
            self.invalid.push(field);
        }
        self.message = Some(message.to_string());
    }

    /// Banner for this report, or `None` when the form is valid
    pub fn banner(&self, now: DateTime<Utc>) -> Option<ErrorBanner> {
        self.message.as_ref().map(|m| ErrorBanner::raise(m.clone(), now))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.username.is_empty() {
            report.reject(FormField::Username, "Username is required");
        }
        if self.password.is_empty() {
            report.reject(FormField::Password, "Password is required");
        }
        report
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.username.is_empty() {
            report.reject(FormField::Username, "Username is required");
        }

        if self.email.is_empty() {
            report.reject(FormField::Email, "Email is required");
        } else if !self.email.contains('@') {
            report.reject(FormField::Email, "Invalid email address");
        }

        if self.password.is_empty() {
            report.reject(FormField::Password, "Password is required");
        } else if password_length(&self.password) < MIN_PASSWORD_LENGTH {
            report.reject(FormField::Password, "Password must be at least 6 characters");
        }
        report
    }
}

/// Length in UTF-16 code units, the unit browsers count password length in.
/// A character outside the Basic Multilingual Plane counts twice.
fn password_length(password: &str) -> usize {
    password.encode_utf16().count()
}

/// Aggregated validation message with its auto-dismiss deadline.
/// Raising a new banner replaces the old one and restarts the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl ErrorBanner {
    pub fn raise(message: String, now: DateTime<Utc>) -> Self {
        Self {
            message,
            raised_at: now,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.raised_at + Duration::seconds(ERROR_DISPLAY_SECS)
    }

    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        let report = LoginForm::default().validate();
        assert!(report.is_invalid(FormField::Username));
        assert!(report.is_invalid(FormField::Password));
        assert_eq!(report.message.as_deref(), Some("Password is required"));

        let ok = LoginForm {
            username: "alice".to_string(),
            password: "x".to_string(),
        };
        assert!(ok.validate().is_valid());
    }

    #[test]
    fn test_register_email_and_password_rules() {
        let form = RegisterForm {
            username: "alice".to_string(),
            email: "alice.example.com".to_string(),
            password: "secret1".to_string(),
        };
        let report = form.validate();
        assert_eq!(report.invalid, vec![FormField::Email]);
        assert_eq!(report.message.as_deref(), Some("Invalid email address"));

        let short = RegisterForm {
            username: "alice".to_string(),
            email: "a@b.com".to_string(),
            password: "12345".to_string(),
        };
        assert_eq!(
            short.validate().message.as_deref(),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn test_password_length_counts_utf16_units() {
        let form = |password: &str| RegisterForm {
            username: "alice".to_string(),
            email: "a@b.com".to_string(),
            password: password.to_string(),
        };
        assert!(form("\u{1F600}\u{1F600}\u{1F600}").validate().is_valid());
        assert!(form("\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}").validate().is_invalid(FormField::Password));
    }

    #[test]
    fn test_register_message_is_last_violation() {
        let form = RegisterForm {
            username: String::new(),
            email: String::new(),
            password: "123456".to_string(),
        };
        let report = form.validate();
        assert_eq!(report.invalid, vec![FormField::Username, FormField::Email]);
        assert_eq!(report.message.as_deref(), Some("Email is required"));
    }

    #[test]
    fn test_banner_hides_after_ten_seconds() {
        let raised = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let banner = LoginForm::default().validate().banner(raised).unwrap();

        assert!(banner.is_visible_at(raised + Duration::seconds(9)));
        assert!(!banner.is_visible_at(raised + Duration::seconds(10)));
    }

    #[test]
    fn test_valid_form_has_no_banner() {
        let form = RegisterForm {
            username: "alice".to_string(),
            email: "a@b.com".to_string(),
            password: "123456".to_string(),
        };
        assert!(form.validate().banner(Utc::now()).is_none());
    }
}
