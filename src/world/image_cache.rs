//! Path-keyed cache of loaded tile images. Failed loads are cached as
//! misses so a broken path is only tried once.

use std::collections::HashMap;

use super::persist::normalize_path;

#[derive(Debug, Clone)]
pub struct ImageCache<T> {
    entries: HashMap<String, Option<T>>,
}

impl<T> Default for ImageCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> ImageCache<T> {
    /// Cached image for `path`, calling `loader` on the first request only.
    pub fn get_or_load(&mut self, path: &str, loader: impl FnOnce(&str) -> Option<T>) -> Option<&T> {
        let key = normalize_path(path);
        self.entries
            .entry(key)
            .or_insert_with_key(|key| loader(key))
            .as_ref()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_path(path))
    }

    pub fn invalidate(&mut self, path: &str) {
        self.entries.remove(&normalize_path(path));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
