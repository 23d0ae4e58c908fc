use std::{
    cmp::Ordering,
    collections::HashMap,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use serde::{Serialize, Serializer};
use uuid::Uuid;

// The ID (Handle)
// It's just a unique number. Efficient to copy.
#[derive(Debug)]
pub struct Handle<T> {
    pub id: Uuid,
    marker: PhantomData<T>,
}

impl<T> Handle<T> {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            marker: PhantomData,
        }
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

// Implemented by hand so `T` does not need to be Hash
impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Serialized as the bare id, the asset itself is persisted separately
impl<T> Serialize for Handle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id.serialize(serializer)
    }
}

// The Storage (Bank)
// Single-threaded: the importer is the only writer for the whole run.
pub struct Assets<T> {
    storage: HashMap<Uuid, T>,
}

impl<T> Default for Assets<T> {
    fn default() -> Self {
        Self {
            storage: HashMap::new(),
        }
    }
}

impl<T> Assets<T> {
    pub fn add(&mut self, asset: T) -> Handle<T> {
        let handle = Handle::<T>::new();
        self.storage.insert(handle.id, asset);
        handle
    }

    pub fn get(&self, handle: &Handle<T>) -> Option<&T> {
        self.storage.get(&handle.id)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_resolve_to_their_asset() {
        let mut assets = Assets::<String>::default();
        let a = assets.add("a".to_string());
        let b = assets.add("b".to_string());
        assert_ne!(a, b);
        assert_eq!(assets.get(&a).map(String::as_str), Some("a"));
        assert_eq!(assets.get(&b.clone()).map(String::as_str), Some("b"));
        assert_eq!(assets.len(), 2);
    }

    #[test]
    fn foreign_handle_is_not_found() {
        let assets = Assets::<u32>::default();
        assert!(assets.get(&Handle::new()).is_none());
        assert!(assets.is_empty());
    }
}
