//! Key-value storage backing the repositories.
//!
//! Every record is a JSON document stored under a well-known key
//! ([`EXPENSES_KEY`], [`BUDGET_KEY`], [`CATEGORIES_KEY`]). Stores are cheap
//! handles: clones share the same underlying data, so one store can back all
//! repositories of a [`Tracker`](crate::Tracker).

use std::{
    cell::RefCell,
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{EngineError, ResultEngine};

pub const EXPENSES_KEY: &str = "expenses";
pub const BUDGET_KEY: &str = "budget";
pub const CATEGORIES_KEY: &str = "categories";

/// When repository mutations reach the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    /// Every mutation rewrites the affected record right away.
    #[default]
    Immediate,
    /// Mutations stay in memory until `flush` is called.
    Deferred,
}

/// Synchronous string key-value store.
pub trait KeyValueStore {
    /// Returns the raw value under `key`, or `None` when the key is absent.
    fn get(&self, key: &str) -> ResultEngine<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> ResultEngine<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> ResultEngine<()>;
}

/// In-process store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ResultEngine<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ResultEngine<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ResultEngine<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Directory-backed store: each key lives in `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) the data directory.
    pub fn open(dir: impl AsRef<Path>) -> ResultEngine<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        tracing::debug!("file store opened at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> ResultEngine<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(EngineError::InvalidName(format!("invalid store key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ResultEngine<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> ResultEngine<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> ResultEngine<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Reads and decodes the JSON document under `key`.
///
/// Returns `Ok(None)` when the key is absent and
/// [`EngineError::MalformedPersistedData`] when the payload does not decode.
pub fn read_json<S, T>(store: &S, key: &str) -> ResultEngine<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| EngineError::MalformedPersistedData {
            key: key.to_string(),
            reason: err.to_string(),
        })
}

/// Like [`read_json`], but a malformed payload is logged and reported as
/// absent so callers can fall back to their default.
pub(crate) fn read_json_or_absent<S, T>(store: &S, key: &str) -> ResultEngine<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match read_json(store, key) {
        Err(EngineError::MalformedPersistedData { key, reason }) => {
            tracing::warn!("ignoring malformed data under \"{key}\": {reason}");
            Ok(None)
        }
        other => other,
    }
}

/// Encodes `value` as JSON and stores it under `key`.
pub fn write_json<S, T>(store: &S, key: &str, value: &T) -> ResultEngine<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string(value)?;
    store.set(key, &payload)
}
