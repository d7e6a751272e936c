use crate::dom;
use watio_access::{MemoryStore, PreferenceStore, StoreError};
use web_sys::Storage;

#[derive(Debug, thiserror::Error)]
pub enum WebStoreError {
    #[error("localStorage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Memory(#[from] StoreError),
}

/// `localStorage`, or process memory when it is unavailable (private
/// browsing, storage disabled, native builds).
#[derive(Debug, Clone)]
pub enum WebStore {
    Local(Storage),
    Memory(MemoryStore),
}

impl WebStore {
    #[must_use]
    pub fn open() -> Self {
        dom::local_storage().map_or_else(
            || {
                log::warn!("localStorage unavailable, preferences will not persist");
                Self::Memory(MemoryStore::default())
            },
            Self::Local,
        )
    }

    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

fn js_err(err: &wasm_bindgen::JsValue) -> WebStoreError {
    WebStoreError::Storage(dom::js_error_message(err))
}

impl PreferenceStore for WebStore {
    type Error = WebStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, WebStoreError> {
        match self {
            Self::Local(storage) => storage.get_item(key).map_err(|e| js_err(&e)),
            Self::Memory(memory) => Ok(memory.get(key)?),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WebStoreError> {
        match self {
            Self::Local(storage) => storage.set_item(key, value).map_err(|e| js_err(&e)),
            Self::Memory(memory) => Ok(memory.set(key, value)?),
        }
    }

    fn remove(&self, key: &str) -> Result<(), WebStoreError> {
        match self {
            Self::Local(storage) => storage.remove_item(key).map_err(|e| js_err(&e)),
            Self::Memory(memory) => Ok(memory.remove(key)?),
        }
    }
}
