//! Authentication module for holding and gating the session token.
//!
//! This module provides:
//! - `TokenStore`: the `{get, set, clear}` interface over the bearer token
//! - `MemoryTokenStore`, `FileTokenStore`, `KeychainTokenStore`: store backends
//! - `decode_claims`: unverified inspection of the token's `exp` claim
//! - `SessionGuard`: derives the authenticated status and evicts expired tokens
//!
//! The guard is a usability check only. The backend authorizes every request
//! on its own regardless of what the guard decides.

pub mod claims;
pub mod credentials;
pub mod guard;
pub mod session;
pub mod store;

pub use claims::{decode_claims, Claims, ClaimsError};
pub use credentials::KeychainTokenStore;
pub use guard::{Clock, GuardOutcome, ManualClock, Navigator, SessionGuard, SystemClock};
pub use session::FileTokenStore;
pub use store::{MemoryTokenStore, TokenStore};
