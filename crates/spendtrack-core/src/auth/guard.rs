use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::{decode_claims, TokenStore};

/// Source of the current time for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Where the guard sends the user when the session is not usable.
/// Repeated calls must be harmless.
pub trait Navigator: Send + Sync {
    fn to_entry_point(&self);
}

/// Result of one guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Authenticated,
    /// No token in the store (or the store could not be read)
    Missing,
    /// Token's `exp` claim has passed; the token was evicted
    Expired,
    /// Token could not be decoded; the token was evicted
    Malformed,
}

impl GuardOutcome {
    pub fn is_authenticated(self) -> bool {
        matches!(self, GuardOutcome::Authenticated)
    }
}

/// Gate for views that need a logged-in user.
///
/// Fails closed: anything other than a decodable, unexpired token is
/// reported as unauthenticated and triggers navigation to the entry point.
pub struct SessionGuard {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run the check once. Recomputed on every call, nothing is cached.
    pub fn evaluate(&self) -> GuardOutcome {
        let token = match self.store.get() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No session token");
                self.navigator.to_entry_point();
                return GuardOutcome::Missing;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                self.navigator.to_entry_point();
                return GuardOutcome::Missing;
            }
        };

        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "Session token could not be decoded");
                self.evict();
                return GuardOutcome::Malformed;
            }
        };

        let now = self.clock.now();
        let now_secs = now.timestamp_millis() as f64 / 1000.0;
        if claims.is_expired_at(now_secs) {
            info!(exp = ?claims.exp, "Session token expired");
            self.evict();
            return GuardOutcome::Expired;
        }

        GuardOutcome::Authenticated
    }

    pub fn is_authenticated(&self) -> bool {
        self.evaluate().is_authenticated()
    }

    fn evict(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to remove session token");
        }
        self.navigator.to_entry_point();
    }
}
