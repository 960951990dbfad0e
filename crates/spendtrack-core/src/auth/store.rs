use std::sync::{PoisonError, RwLock};

use anyhow::Result;

/// Holder of the single bearer token shared by the whole client.
///
/// Every component that needs the token receives the store explicitly,
/// usually as `Arc<dyn TokenStore>`. Writes are last-write-wins.
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when nobody is logged in
    fn get(&self) -> Result<Option<String>>;

    /// Replace the stored token wholesale
    fn set(&self, token: &str) -> Result<()>;

    /// Remove the token. Removing an absent token is a no-op.
    fn clear(&self) -> Result<()>;
}

/// Process-local token store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        Ok(())
    }
}
