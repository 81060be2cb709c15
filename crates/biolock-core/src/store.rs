//! Secure credential cache.
//!
//! The secure store is an opaque durable key-value store holding at most
//! three string values. [`KeyValueStore`] is the capability seam; the
//! [`CredentialCache`] layers the three composite operations the login flow
//! needs (load, save, clear) on top of it.
//!
//! Backends:
//! - [`MemoryStore`]: process-local, used in tests and ephemeral runs
//! - [`FileStore`]: JSON document under the biolock home, owner-only permissions

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::credentials::Credentials;
use crate::error::StoreError;

/// Value written to `isEnabled` when biometrics are turned on.
pub const ENABLED_FLAG: &str = "enabled";

/// The closed set of keys the login flow stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    Email,
    Password,
    IsEnabled,
}

impl StoreKey {
    pub const ALL: [StoreKey; 3] = [StoreKey::Email, StoreKey::Password, StoreKey::IsEnabled];

    /// Key name as persisted.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Email => "email",
            StoreKey::Password => "password",
            StoreKey::IsEnabled => "isEnabled",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, StoreKey::Password)
    }
}

/// Interprets a stored `isEnabled` value.
///
/// Both `"enabled"` (what we write) and `"true"` are accepted.
pub fn flag_is_enabled(value: Option<&str>) -> bool {
    matches!(value, Some(ENABLED_FLAG | "true"))
}

/// Secure key-value storage capability.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError>;

    /// Persists `value`. The write is durable once this returns `Ok`.
    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: StoreKey) -> Result<(), StoreError>;
}

/// Result of reading all three keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Raw `isEnabled` flag as stored.
    pub flag: bool,
}

impl StoreSnapshot {
    /// Cached credentials, with absent values read as empty strings.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.email.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }

    /// Whether biometric login is usable: the flag is set and a pair is saved.
    pub fn biometrics_enabled(&self) -> bool {
        self.flag && self.email.is_some() && self.password.is_some()
    }
}

/// Composite credential operations over a [`KeyValueStore`].
pub struct CredentialCache<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> CredentialCache<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<StoreSnapshot, StoreError> {
        let flag = flag_is_enabled(self.store.get(StoreKey::IsEnabled)?.as_deref());
        let email = self.store.get(StoreKey::Email)?;
        let password = self.store.get(StoreKey::Password)?;
        let snapshot = StoreSnapshot {
            email,
            password,
            flag,
        };
        if snapshot.flag && !snapshot.biometrics_enabled() {
            tracing::warn!("isEnabled is set but no saved credential pair was found");
        }
        tracing::debug!(
            flag = snapshot.flag,
            has_email = snapshot.email.is_some(),
            has_password = snapshot.password.is_some(),
            "loaded secure store"
        );
        Ok(snapshot)
    }

    /// Writes the pair first and the flag last, so a failure part-way never
    /// leaves the flag set without credentials.
    pub fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        self.store.set(StoreKey::Email, &credentials.email)?;
        self.store.set(StoreKey::Password, &credentials.password)?;
        self.store.set(StoreKey::IsEnabled, ENABLED_FLAG)?;
        tracing::info!("saved credentials for biometric login");
        Ok(())
    }

    /// Removes the flag first, then the pair. Stops at the first failure.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.delete(StoreKey::IsEnabled)?;
        self.store.delete(StoreKey::Email)?;
        self.store.delete(StoreKey::Password)?;
        tracing::info!("cleared saved credentials");
        Ok(())
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store with optional fault injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, String>>,
    fail_next: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (StoreKey, V)>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key, value.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
            fail_next: Mutex::new(None),
        }
    }

    /// Makes the next operation (of any kind) fail with `message`.
    pub fn fail_next_with(&self, message: impl Into<String>) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    /// Copy of the current contents.
    pub fn entries(&self) -> HashMap<StoreKey, String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn take_failure(&self) -> Result<(), StoreError> {
        match self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            Some(message) => Err(StoreError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        self.take_failure()?;
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned())
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        self.take_failure()?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.to_string());
        Ok(())
    }

    fn delete(&self, key: StoreKey) -> Result<(), StoreError> {
        self.take_failure()?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }
}

// ============================================================================
// FileStore
// ============================================================================

/// JSON-file backed store.
///
/// Every write replaces the whole document through a temp file in the same
/// directory, so readers never observe a partial file. On unix the temp file
/// (and therefore the persisted store) is created with mode `0600`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_err)?;

        let json = serde_json::to_string_pretty(map).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path)
            .map_err(|err| write_err(err.error))?;
        Ok(())
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        if f(&mut map) {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_map()?.remove(key.as_str()))
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        self.modify(|map| {
            map.insert(key.as_str().to_string(), value.to_string());
            true
        })
    }

    fn delete(&self, key: StoreKey) -> Result<(), StoreError> {
        self.modify(|map| map.remove(key.as_str()).is_some())
    }
}
