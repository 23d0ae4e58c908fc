use std::{collections::HashMap, rc::Rc};

use log::info;
use lvl_core::{
    Handle, PackedScene,
    material::{MaterialData, TextureData},
};

/// Name-keyed memo table. Entries are never evicted and a name that built
/// successfully is never built again.
///
/// Entity class scenes use [`Cache::get`] and [`Cache::insert`] directly:
/// building one imports its attachments, which reads the same table while
/// the build is still running.
#[derive(Debug)]
pub struct Cache<T> {
    entries: HashMap<String, T>,
    hits: usize,
    builds: usize,
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            builds: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub builds: usize,
}

impl<T: Clone> Cache<T> {
    pub fn get(&mut self, name: &str) -> Option<T> {
        let value = self.entries.get(name).cloned();
        if value.is_some() {
            self.hits += 1;
        }
        value
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: T) {
        self.builds += 1;
        self.entries.insert(name.into(), value);
    }

    /// Returns the cached value for `name`, or runs `build` and caches what
    /// it returns. Nothing is cached when `build` fails.
    pub fn get_or_build<E>(
        &mut self,
        name: &str,
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        if let Some(value) = self.get(name) {
            return Ok(value);
        }
        let value = build()?;
        self.insert(name, value.clone());
        Ok(value)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            builds: self.builds,
        }
    }
}

/// The three tables shared by one import run.
#[derive(Debug, Default)]
pub struct ResourceCache {
    pub scenes: Cache<Rc<PackedScene>>,
    pub textures: Cache<Handle<TextureData>>,
    pub materials: Cache<Handle<MaterialData>>,
}

impl ResourceCache {
    pub fn log_stats(&self) {
        for (table, stats) in [
            ("entity class", self.scenes.stats()),
            ("texture", self.textures.stats()),
            ("material", self.materials.stats()),
        ] {
            info!(
                "{table} cache: {} entries, {} builds, {} hits",
                stats.entries, stats.builds, stats.hits
            );
        }
    }
}
