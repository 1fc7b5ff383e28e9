use std::{
    error::Error,
    fs::{self, File},
    io::Read,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// String-keyed store of JSON values, one entry per widget.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), Box<dyn Error>>;
}

pub type SharedStore = Arc<Mutex<dyn KeyValueStore + Send>>;

pub fn shared<S: KeyValueStore + Send + 'static>(store: S) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Best-effort write: failures are logged and otherwise ignored.
pub fn persist<T: Serialize>(store: &SharedStore, key: &str, data: &T) {
    let value = match serde_json::to_value(data) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, %err, "could not serialize state");
            return;
        }
    };
    match store.lock() {
        Ok(mut store) => {
            if let Err(err) = store.set(key, value) {
                warn!(key, %err, "could not persist state");
            }
        }
        Err(_) => warn!(key, "store lock poisoned, state not persisted"),
    }
}

pub fn load(store: &SharedStore, key: &str) -> Option<Value> {
    store.lock().ok().and_then(|store| store.get(key))
}

/// Keeps every entry in one JSON object on disk, rewritten on each `set`.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    /// Opens the store. A missing or unreadable file starts out empty.
    pub fn open(path: &Path) -> Self {
        let entries = match read_json::<Value>(path) {
            Ok(Value::Object(entries)) => entries,
            Ok(_) => {
                warn!(path = %path.display(), "store is not a JSON object, starting empty");
                Map::new()
            }
            Err(err) => {
                debug!(path = %path.display(), %err, "no readable store, starting empty");
                Map::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            entries,
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), Box<dyn Error>> {
        self.entries.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_json(&self.path, &self.entries)
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, Value>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), Box<dyn Error>> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    let result: T = serde_json::from_str(&content)?;

    Ok(result)
}

pub fn write_json<T: Serialize>(path: &Path, data: T) -> Result<(), Box<dyn Error>> {
    let serialized = serde_json::to_string_pretty(&data)?;
    let mut file = File::create(path)?;
    file.write_all(serialized.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("spinboard-{}-{}", std::process::id(), name))
            .join("storage.json")
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.get("timer"), None);
        store.set("timer", json!({ "remainingSeconds": 42 })).unwrap();
        store.set("spinner", json!({ "result": null })).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(
            reopened.get("timer"),
            Some(json!({ "remainingSeconds": 42 }))
        );
        assert_eq!(reopened.get("spinner"), Some(json!({ "result": null })));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn garbage_file_starts_empty() {
        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("timer"), None);

        fs::write(&path, "[1, 2, 3]").unwrap();
        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("timer"), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn persist_writes_through_shared_handle() {
        let store = shared(MemoryStore::default());
        persist(&store, "spinner", &json!({ "choices": [] }));
        assert_eq!(load(&store, "spinner"), Some(json!({ "choices": [] })));
        assert_eq!(load(&store, "timer"), None);
    }
}
