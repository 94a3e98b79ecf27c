mod config;
pub mod database;
mod memory;
pub mod persistence;

pub use config::{Config, LogConfig, NotificationsConfig, StorageConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use persistence::{Persistence, StoredTimer, SETTINGS_KEY, STATE_KEY};

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// Opaque key-value storage with optional per-entry expiry.
///
/// Timestamps are epoch milliseconds supplied by the caller, so stores stay
/// clock-agnostic.
pub trait KeyValueStore {
    /// Returns `None` for missing keys and for entries whose expiry is at or
    /// before `now_ms`.
    fn get(&self, key: &str, now_ms: i64) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str, expires_at_ms: Option<i64>) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str, now_ms: i64) -> Result<Option<String>> {
        (**self).get(key, now_ms)
    }

    fn set(&self, key: &str, value: &str, expires_at_ms: Option<i64>) -> Result<()> {
        (**self).set(key, value, expires_at_ms)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<T> {
    fn get(&self, key: &str, now_ms: i64) -> Result<Option<String>> {
        (**self).get(key, now_ms)
    }

    fn set(&self, key: &str, value: &str, expires_at_ms: Option<i64>) -> Result<()> {
        (**self).set(key, value, expires_at_ms)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `POMOTIMER_DATA_DIR` is used verbatim when set. Otherwise
/// `~/.config/pomotimer[-dev]/`, with `-dev` when `POMOTIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOTIMER_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POMOTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomotimer-dev")
            } else {
                base_dir.join("pomotimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
