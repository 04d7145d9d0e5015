//! Key/value persistence seam
//!
//! Modelled after namespaced preference stores: a namespace is opened with
//! [`KeyValueStore::begin`], read or written, then closed with
//! [`KeyValueStore::end`]. [`with_namespace`] guarantees the close so no
//! handle outlives a single operation.

use heapless::{LinearMap, String};

#[cfg(feature = "esp32-log")]
use esp_println::println;

/// Longest `namespace/key` pair the in-RAM store accepts
pub const MAX_KEY_LEN: usize = 32;

/// Storage error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Backend could not be opened
    Unavailable,
    /// Access outside of `begin`/`end`
    Closed,
    /// No room left for a new key
    Full,
    /// Backend failed to read
    ReadFailed,
    /// Backend failed to write
    WriteFailed,
}

/// Namespaced boolean key/value store
pub trait KeyValueStore {
    /// Open a namespace
    fn begin(&mut self, namespace: &str) -> Result<(), StorageError>;

    /// Read a flag, `None` if it was never written
    fn get_bool(&mut self, key: &str) -> Result<Option<bool>, StorageError>;

    /// Write a flag
    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError>;

    /// Close the open namespace
    fn end(&mut self);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn begin(&mut self, namespace: &str) -> Result<(), StorageError> {
        (**self).begin(namespace)
    }

    fn get_bool(&mut self, key: &str) -> Result<Option<bool>, StorageError> {
        (**self).get_bool(key)
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        (**self).put_bool(key, value)
    }

    fn end(&mut self) {
        (**self).end();
    }
}

/// Open `namespace`, run `f`, and close it again whatever `f` returned
pub fn with_namespace<S, T, F>(store: &mut S, namespace: &str, f: F) -> Result<T, StorageError>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(&mut S) -> Result<T, StorageError>,
{
    store.begin(namespace)?;
    let result = f(store);
    store.end();
    #[cfg(feature = "esp32-log")]
    if let Err(err) = &result {
        println!("[storage.with_namespace] {}: {:?}", namespace, err);
    }
    result
}

/// Bounded in-RAM store
///
/// Holds up to `N` flags. Used by the preview and tests, and as a fallback
/// on boards without flash preferences.
#[derive(Debug, Default)]
pub struct MemoryStore<const N: usize> {
    entries: LinearMap<String<MAX_KEY_LEN>, bool, N>,
    namespace: Option<String<MAX_KEY_LEN>>,
}

impl<const N: usize> MemoryStore<N> {
    pub const fn new() -> Self {
        Self {
            entries: LinearMap::new(),
            namespace: None,
        }
    }

    /// Return true if a namespace is currently open
    pub const fn is_open(&self) -> bool {
        self.namespace.is_some()
    }

    /// Number of stored flags
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn full_key(&self, key: &str) -> Result<String<MAX_KEY_LEN>, StorageError> {
        let namespace = self.namespace.as_ref().ok_or(StorageError::Closed)?;
        let mut full = String::new();
        full.push_str(namespace).map_err(|()| StorageError::Full)?;
        full.push('/').map_err(|()| StorageError::Full)?;
        full.push_str(key).map_err(|()| StorageError::Full)?;
        Ok(full)
    }
}

impl<const N: usize> KeyValueStore for MemoryStore<N> {
    fn begin(&mut self, namespace: &str) -> Result<(), StorageError> {
        let mut name = String::new();
        name.push_str(namespace)
            .map_err(|()| StorageError::Unavailable)?;
        self.namespace = Some(name);
        Ok(())
    }

    fn get_bool(&mut self, key: &str) -> Result<Option<bool>, StorageError> {
        let key = self.full_key(key)?;
        Ok(self.entries.get(&key).copied())
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        let key = self.full_key(key)?;
        self.entries
            .insert(key, value)
            .map(|_| ())
            .map_err(|_| StorageError::Full)
    }

    fn end(&mut self) {
        self.namespace = None;
    }
}
