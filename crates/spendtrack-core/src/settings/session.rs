use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::auth::TokenStore;
use crate::cancel::CancelSignal;
use crate::models::{SettingsSnapshot, UserProfile};

use super::{apply_update_result, Notification, SettingsUpdate, SettingsValue, UpdateOutcome};

/// State behind a settings page: the cached profile plus access to the
/// shared token store.
///
/// Updates are serialized: a second `update_field` waits until the first
/// one has finished, so the update issued last is also applied last.
pub struct SettingsSession {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    profile: RwLock<UserProfile>,
    in_flight: Mutex<()>,
}

impl SettingsSession {
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            profile: RwLock::new(UserProfile::default()),
            in_flight: Mutex::new(()),
        }
    }

    /// Current cached profile
    pub fn profile(&self) -> UserProfile {
        self.profile
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Profile and stored token read together. Never shows a profile change
    /// without the token rotation that came with it, or the other way round.
    pub fn snapshot(&self) -> (UserProfile, Option<String>) {
        let profile = self.profile.read().unwrap_or_else(PoisonError::into_inner);
        let token = self.store.get().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read session token");
            None
        });
        (profile.clone(), token)
    }

    fn current_token(&self) -> String {
        match self.store.get() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No session token, sending empty bearer");
                String::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read session token, sending empty bearer");
                String::new()
            }
        }
    }

    /// Fill the profile cache from `GET /settings/populate`
    pub async fn populate(&self, cancel: &CancelSignal) -> ApiResult<Option<SettingsSnapshot>> {
        let api = self.api.with_token(self.current_token());
        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(None),
            result = api.fetch_settings() => result?,
        };
        if cancel.is_cancelled() {
            return Ok(None);
        }

        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = snapshot.profile();
        debug!(username = %snapshot.username, "Settings populated");
        Ok(Some(snapshot))
    }

    /// String-keyed entry point, as a form would call it. Unknown fields are
    /// ignored without contacting the backend.
    pub async fn update_field_named(
        &self,
        field: &str,
        value: SettingsValue,
        cancel: &CancelSignal,
    ) -> UpdateOutcome {
        match SettingsUpdate::from_parts(field, value) {
            Some(update) => self.update_field(update, cancel).await,
            None => {
                debug!(field, "Ignoring update for unknown field");
                UpdateOutcome::Ignored
            }
        }
    }

    /// Send one settings change and reconcile local state.
    ///
    /// On success the rotated token (if any) and the profile change are
    /// written under the profile lock. On any failure nothing local changes
    /// and the returned notification carries the reason. A cancelled call
    /// changes nothing and produces no notification.
    pub async fn update_field(&self, update: SettingsUpdate, cancel: &CancelSignal) -> UpdateOutcome {
        let _turn = self.in_flight.lock().await;
        if cancel.is_cancelled() {
            return UpdateOutcome::Cancelled;
        }

        let field = update.field();
        let api = self.api.with_token(self.current_token());

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%field, "Settings update cancelled in flight");
                return UpdateOutcome::Cancelled;
            }
            result = api.update_setting(&update) => result,
        };

        let response = match result {
            Ok(response) => response,
            Err(ApiError::Rejected { status, body }) => {
                warn!(%field, %status, "Backend rejected settings update");
                return UpdateOutcome::Notified(Notification::update_failed(field, body));
            }
            Err(e) => {
                error!(%field, error = %e, "Settings update failed");
                return UpdateOutcome::Notified(Notification::update_failed(field, e));
            }
        };

        if cancel.is_cancelled() {
            debug!(%field, "Settings update finished after cancel, discarding");
            return UpdateOutcome::Cancelled;
        }

        let mut profile = self.profile.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = response.rotated_token() {
            if let Err(e) = self.store.set(token) {
                error!(%field, error = %e, "Failed to store rotated token");
                return UpdateOutcome::Notified(Notification::update_failed(field, e));
            }
        }
        *profile = apply_update_result(&profile, &update, &response);
        drop(profile);

        info!(%field, rotated = response.rotated_token().is_some(), "Settings field updated");
        UpdateOutcome::Notified(Notification::updated(field))
    }
}
