//! Persisted unlock flag
//!
//! The flag survives power loss and is the only source of truth for which
//! power ceiling is in effect. Storage failures never surface: they
//! degrade to the locked ceiling.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::power::{PowerCeiling, PowerLevels};
use crate::storage::{KeyValueStore, StorageError, with_namespace};

/// Preferences namespace of the fixture
pub const NAMESPACE: &str = "led";
/// Key of the unlock flag
pub const UNLOCKED_KEY: &str = "unlocked";

/// Unlock flag backed by a [`KeyValueStore`]
#[derive(Debug)]
pub struct PersistedUnlockState<S> {
    store: S,
    levels: PowerLevels,
}

impl<S: KeyValueStore> PersistedUnlockState<S> {
    pub const fn new(store: S, levels: PowerLevels) -> Self {
        Self { store, levels }
    }

    pub const fn levels(&self) -> PowerLevels {
        self.levels
    }

    /// Read the persisted flag
    ///
    /// Empty or failing storage reads as locked.
    pub fn is_unlocked(&mut self) -> bool {
        match self.read() {
            Ok(unlocked) => unlocked,
            Err(_err) => {
                #[cfg(feature = "esp32-log")]
                println!("[PersistedUnlockState.is_unlocked] read failed: {:?}", _err);
                false
            }
        }
    }

    /// Ceiling matching the persisted flag
    pub fn ceiling(&mut self) -> PowerCeiling {
        let unlocked = self.is_unlocked();
        self.levels.ceiling(unlocked)
    }

    /// Persist the unlocked flag
    ///
    /// The write is read back before the unlocked ceiling is granted; any
    /// failure keeps the fixture locked.
    pub fn unlock(&mut self) -> PowerCeiling {
        match self.write(true) {
            Ok(()) => self.ceiling(),
            Err(_err) => {
                #[cfg(feature = "esp32-log")]
                println!("[PersistedUnlockState.unlock] write failed: {:?}", _err);
                self.levels.locked
            }
        }
    }

    /// Persist the locked flag
    ///
    /// Always returns the locked ceiling, even if the write failed.
    pub fn lock(&mut self) -> PowerCeiling {
        if let Err(_err) = self.write(false) {
            #[cfg(feature = "esp32-log")]
            println!("[PersistedUnlockState.lock] write failed: {:?}", _err);
        }
        self.levels.locked
    }

    /// Return to safe mode, same as [`Self::lock`]
    pub fn reset_to_safe_mode(&mut self) -> PowerCeiling {
        self.lock()
    }

    /// Borrow the backing store
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Release the backing store
    pub fn into_inner(self) -> S {
        self.store
    }

    fn read(&mut self) -> Result<bool, StorageError> {
        with_namespace(&mut self.store, NAMESPACE, |store| {
            Ok(store.get_bool(UNLOCKED_KEY)?.unwrap_or(false))
        })
    }

    fn write(&mut self, unlocked: bool) -> Result<(), StorageError> {
        with_namespace(&mut self.store, NAMESPACE, |store| {
            store.put_bool(UNLOCKED_KEY, unlocked)
        })
    }
}
