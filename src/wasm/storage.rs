use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomException, Storage, Window};

use crate::error::StorageError;
use crate::persist::KeyValueStore;

/// `window.localStorage`, when the browser grants it.
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub fn from_window(window: &Window) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                log::warn!("localStorage is not accessible: {}", describe(&err));
                None
            }
        };
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("localStorage".to_owned()))
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(to_storage_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(to_storage_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(to_storage_error)
    }
}

fn to_storage_error(err: JsValue) -> StorageError {
    match err.dyn_ref::<DomException>() {
        Some(exception) if exception.name() == "QuotaExceededError" => StorageError::QuotaExceeded,
        _ => StorageError::Backend(describe(&err)),
    }
}

fn describe(err: &JsValue) -> String {
    if let Some(exception) = err.dyn_ref::<DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
