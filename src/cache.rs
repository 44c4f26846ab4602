use crate::compile::Template;
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// What a [`Cache`] holds for a template file.
#[derive(Debug, Clone)]
pub enum Artifact {
    /// A loaded [`Template`], returned as it is.
    Compiled(Arc<Template>),
    /// Generated render-script source, which is loaded again when returned.
    Source(String),
}

/// Storage for compiled templates, keyed by filename.
///
/// Implement this to keep templates somewhere other than the default
/// [`MemoryCache`], and set it with [`Engine::with_cache`][`crate::Engine::with_cache`].
pub trait Cache: Send + Sync {
    /// Return the [`Artifact`] stored under the key, if any.
    fn get(&self, key: &str) -> Option<Artifact>;

    /// Store an [`Artifact`] under the key, replacing any previous one.
    fn set(&self, key: &str, artifact: Artifact);

    /// Remove the [`Artifact`] stored under the key.
    fn remove(&self, key: &str);

    /// Remove every [`Artifact`].
    fn clear(&self);
}

/// A [`Cache`] that keeps artifacts in memory.
///
/// Concurrent writes to the same key are last-writer-wins.
#[derive(Debug, Default)]
pub struct MemoryCache {
    artifacts: RwLock<HashMap<String, Artifact>>,
}

impl MemoryCache {
    /// Create a new, empty [`MemoryCache`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of stored artifacts.
    pub fn len(&self) -> usize {
        self.artifacts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Return true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Artifact> {
        self.artifacts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, artifact: Artifact) {
        self.artifacts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), artifact);
    }

    fn remove(&self, key: &str) {
        self.artifacts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.artifacts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<T> Cache for Arc<T>
where
    T: Cache + ?Sized,
{
    fn get(&self, key: &str) -> Option<Artifact> {
        (**self).get(key)
    }

    fn set(&self, key: &str, artifact: Artifact) {
        (**self).set(key, artifact)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::{Artifact, Cache, MemoryCache};

    #[test]
    fn test_set_get_remove() {
        let cache = MemoryCache::new();
        assert!(cache.get("a.ejs").is_none());

        cache.set("a.ejs", Artifact::Source("one".into()));
        cache.set("a.ejs", Artifact::Source("two".into()));
        assert!(matches!(cache.get("a.ejs"), Some(Artifact::Source(s)) if s == "two"));
        assert_eq!(cache.len(), 1);

        cache.remove("a.ejs");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = MemoryCache::new();
        cache.set("a.ejs", Artifact::Source(String::new()));
        cache.set("b.ejs", Artifact::Source(String::new()));
        cache.clear();

        assert!(cache.is_empty());
    }
}
