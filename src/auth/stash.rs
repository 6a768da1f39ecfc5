use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{AuthError, Result};

/// Caller-owned key-value store bridging the authorization redirect.
///
/// Backed by whatever survives the round-trip to the provider: a session,
/// a cache entry, a database row. The dance only reads, writes and pops its
/// own scoped keys.
pub trait Stash: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: String) -> Result<()>;
    /// Read and remove in one step.
    fn pop(&self, key: &str) -> Result<Option<String>>;
}

/// Process-local stash, suitable for tests and single-process apps.
///
/// # Example
/// ```
/// use authdance::auth::{InMemoryStash, Stash};
///
/// let stash = InMemoryStash::new();
/// stash.set("oauth2_state_google", "nonce".to_string())?;
/// assert_eq!(stash.pop("oauth2_state_google")?.as_deref(), Some("nonce"));
/// assert_eq!(stash.pop("oauth2_state_google")?, None);
/// # Ok::<(), authdance::error::AuthError>(())
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStash {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Stash for InMemoryStash {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn pop(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.remove(key))
    }
}

impl InMemoryStash {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        lock_map(&self.entries)
    }
}

impl Stash for Mutex<HashMap<String, String>> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock_map(self)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        lock_map(self)?.insert(key.to_string(), value);
        Ok(())
    }

    fn pop(&self, key: &str) -> Result<Option<String>> {
        Ok(lock_map(self)?.remove(key))
    }
}

fn lock_map(
    map: &Mutex<HashMap<String, String>>,
) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
    map.lock()
        .map_err(|_| AuthError::Stash("stash lock poisoned".to_string()))
}

/// Scoped stash key: `{protocol}_{key}_{consumer name}`.
pub fn stash_key(protocol: &str, key: &str, consumer_name: &str) -> String {
    format!("{protocol}_{key}_{}", consumer_name.to_lowercase())
}
