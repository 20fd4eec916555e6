//! Credentials cookie
//!
//! Persists the credentials record in a local "cookie" file that expires seven
//! days after the last write, the same lifetime the web client gave its
//! browser cookie.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::CredentialsRecord;

/// Lifetime of the credentials cookie
pub const COOKIE_MAX_AGE_DAYS: i64 = 7;

const COOKIE_FILE_NAME: &str = "credentials-cookie.json";

/// Cookie file permissions (Unix only): owner read/write
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Cookie directory permissions (Unix only): owner only
#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

/// Keyed slot holding the credentials record.
///
/// Reads never fail: a missing, expired or unreadable slot reads as the
/// default (empty) record.
pub trait CredentialStore: Send + Sync {
    /// Current persisted record
    fn read(&self) -> CredentialsRecord;

    /// Replace the persisted record
    fn write(&self, record: &CredentialsRecord) -> Result<(), StoreError>;

    /// Drop the persisted record
    fn clear(&self) -> Result<(), StoreError>;
}

/// Credentials store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cookie path not available")]
    PathNotAvailable,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk cookie entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieEntry {
    pub credentials: CredentialsRecord,
    /// When this entry was stored
    pub stored_at: DateTime<Utc>,
    /// When this entry stops being readable
    pub expires_at: DateTime<Utc>,
}

impl CookieEntry {
    pub fn new(credentials: CredentialsRecord, max_age: Duration) -> Self {
        let stored_at = Utc::now();
        Self {
            credentials,
            stored_at,
            expires_at: stored_at + max_age,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// File-backed credentials cookie
#[derive(Debug, Clone)]
pub struct CookieCredentialStore {
    file_path: Option<PathBuf>,
    max_age: Duration,
}

impl CookieCredentialStore {
    /// Create a store at the default path
    pub fn new() -> Self {
        Self {
            file_path: Self::default_path(),
            max_age: Duration::days(COOKIE_MAX_AGE_DAYS),
        }
    }

    /// Create a store with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file_path: Some(path),
            max_age: Duration::days(COOKIE_MAX_AGE_DAYS),
        }
    }

    /// Get the default cookie path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "Ouo")
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .or_else(|| dirs::home_dir().map(|home| home.join(".ouo")))
            .map(|dir| dir.join(COOKIE_FILE_NAME))
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Load the raw cookie entry, expired or not
    pub fn load_entry(&self) -> Result<Option<CookieEntry>, StoreError> {
        let path = self.file_path.as_ref().ok_or(StoreError::PathNotAvailable)?;
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }
}

impl Default for CookieCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for CookieCredentialStore {
    fn read(&self) -> CredentialsRecord {
        match self.load_entry() {
            Ok(Some(entry)) if entry.is_expired() => {
                tracing::debug!(expired_at = %entry.expires_at, "Credentials cookie expired");
                if let Err(e) = self.clear() {
                    tracing::warn!(error = %e, "Failed to remove expired credentials cookie");
                }
                CredentialsRecord::default()
            }
            Ok(Some(entry)) => entry.credentials,
            Ok(None) => CredentialsRecord::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read credentials cookie");
                CredentialsRecord::default()
            }
        }
    }

    fn write(&self, record: &CredentialsRecord) -> Result<(), StoreError> {
        let path = self.file_path.as_ref().ok_or(StoreError::PathNotAvailable)?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(parent, fs::Permissions::from_mode(DIR_MODE))?;
                }
            }
        }

        let entry = CookieEntry::new(record.clone(), self.max_age);
        let json = serde_json::to_string_pretty(&entry)?;

        // Write to a temp file, lock it down, then rename over the cookie
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&temp_path, fs::Permissions::from_mode(FILE_MODE)) {
                let _ = fs::remove_file(&temp_path);
                return Err(e.into());
            }
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!(
            path = %path.display(),
            expires_at = %entry.expires_at,
            has_openai_api_key = record.has_openai_api_key(),
            "Stored credentials cookie"
        );

        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let path = self.file_path.as_ref().ok_or(StoreError::PathNotAvailable)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    record: std::sync::RwLock<CredentialsRecord>,
    writes: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryCredentialStore {
    pub fn with_record(record: CredentialsRecord) -> Self {
        Self {
            record: std::sync::RwLock::new(record),
            writes: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl CredentialStore for MemoryCredentialStore {
    fn read(&self) -> CredentialsRecord {
        self.record.read().map(|r| r.clone()).unwrap_or_default()
    }

    fn write(&self, record: &CredentialsRecord) -> Result<(), StoreError> {
        let mut guard = self
            .record
            .write()
            .map_err(|_| std::io::Error::other("credentials lock poisoned"))?;
        *guard = record.clone();
        self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.write(&CredentialsRecord::default())
    }
}
