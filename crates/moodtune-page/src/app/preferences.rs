//! Browser `localStorage` backing for the theme preference.

use gloo::console;
use gloo::storage::{LocalStorage, Storage};

use crate::core::storage::KeyValueStore;
use crate::error::StorageError;

/// Raw-string view of `localStorage`.
///
/// Values are read and written verbatim (not JSON-encoded) so they stay
/// compatible with preferences written by the site's other scripts.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw().set_item(key, value).map_err(|err| {
            let detail = err
                .as_string()
                .unwrap_or_else(|| format!("{err:?}"));
            log_storage_error("set", key, &detail);
            StorageError::Write {
                key: key.to_string(),
                detail,
            }
        })
    }
}

fn log_storage_error(operation: &'static str, key: &str, detail: &str) {
    console::error!("storage operation failed", operation, key, detail);
}
