//! Cached JSON document bound to one store key.
//!
//! Repositories keep their whole record in memory and rewrite it in full on
//! persistence. With [`Persistence::Immediate`] a change is written before it
//! becomes visible in memory, so a failed write leaves both sides untouched.

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    ResultEngine,
    store::{KeyValueStore, Persistence, read_json_or_absent, write_json},
};

/// A value that can be persisted as a single store entry.
pub(crate) trait Record: Clone + Serialize + DeserializeOwned {
    fn write_to<S: KeyValueStore + ?Sized>(&self, store: &S, key: &str) -> ResultEngine<()> {
        write_json(store, key, self)
    }
}

impl<T: Clone + Serialize + DeserializeOwned> Record for Vec<T> {}

/// Singletons: `None` removes the key instead of storing `null`.
impl<T: Clone + Serialize + DeserializeOwned> Record for Option<T> {
    fn write_to<S: KeyValueStore + ?Sized>(&self, store: &S, key: &str) -> ResultEngine<()> {
        match self {
            Some(value) => write_json(store, key, value),
            None => store.remove(key),
        }
    }
}

pub(crate) struct Document<S, T> {
    store: S,
    key: &'static str,
    persistence: Persistence,
    fallback: fn() -> T,
    value: T,
    dirty: bool,
}

impl<S, T> Document<S, T>
where
    S: KeyValueStore,
    T: Record,
{
    pub(crate) fn open(
        store: S,
        key: &'static str,
        persistence: Persistence,
        fallback: fn() -> T,
    ) -> ResultEngine<Self> {
        let value = load(&store, key, fallback)?;
        Ok(Self {
            store,
            key,
            persistence,
            fallback,
            value,
            dirty: false,
        })
    }

    pub(crate) fn get(&self) -> &T {
        &self.value
    }

    /// Applies `change` and persists the result according to the mode.
    ///
    /// `change` returns its output plus whether it modified the value;
    /// unchanged values are never written.
    pub(crate) fn update<R>(
        &mut self,
        change: impl FnOnce(&mut T) -> (R, bool),
    ) -> ResultEngine<R> {
        match self.persistence {
            Persistence::Immediate => {
                let mut next = self.value.clone();
                let (out, changed) = change(&mut next);
                if changed {
                    next.write_to(&self.store, self.key)?;
                    self.value = next;
                    self.dirty = false;
                }
                Ok(out)
            }
            Persistence::Deferred => {
                let (out, changed) = change(&mut self.value);
                self.dirty |= changed;
                Ok(out)
            }
        }
    }

    pub(crate) fn flush(&mut self) -> ResultEngine<()> {
        if !self.dirty {
            return Ok(());
        }
        self.value.write_to(&self.store, self.key)?;
        self.dirty = false;
        tracing::debug!("flushed \"{}\"", self.key);
        Ok(())
    }

    /// Re-reads the store, discarding unflushed changes.
    pub(crate) fn reload(&mut self) -> ResultEngine<()> {
        self.value = load(&self.store, self.key, self.fallback)?;
        self.dirty = false;
        Ok(())
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

fn load<S, T>(store: &S, key: &str, fallback: fn() -> T) -> ResultEngine<T>
where
    S: KeyValueStore,
    T: Record,
{
    Ok(read_json_or_absent::<S, T>(store, key)?.unwrap_or_else(fallback))
}
