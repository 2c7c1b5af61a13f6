//! Keyed-singleton registry
//!
//! One [`InstanceRegistry`] per value type lives in each [`ApplicationScope`].
//! It maps a normalized [`PathKey`] to the single instance for that key.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};

use super::scope::ApplicationScope;
use crate::models::PathKey;

pub struct InstanceRegistry<V> {
    instances: DashMap<PathKey, Arc<V>>,
}

impl<V: Send + Sync + 'static> InstanceRegistry<V> {
    fn new() -> Self {
        Self {
            instances: DashMap::new(),
        }
    }

    /// Scope attribute holding the registry for `V`
    pub fn scope_key() -> &'static str {
        type_name::<Self>()
    }

    /// Get the registry for `V` in the given scope, creating it on first use
    pub fn for_scope(scope: &ApplicationScope) -> Arc<Self> {
        scope.get_or_init(Self::scope_key(), Self::new)
    }

    /// Get the instance for `key`, creating it with `factory` if absent.
    ///
    /// The key is normalized first. Concurrent callers for the same key may
    /// each run `factory`, but only the first inserted instance is published;
    /// the others are dropped and every caller receives the winner.
    pub fn get_or_create<F>(&self, key: PathKey, factory: F) -> Arc<V>
    where
        F: FnOnce(&PathKey) -> V,
    {
        let key = key.normalize();

        if let Some(existing) = self.instances.get(&key) {
            return existing.value().clone();
        }

        let candidate = Arc::new(factory(&key));

        match self.instances.entry(key) {
            Entry::Occupied(entry) => {
                tracing::trace!("Discarding concurrent instance for {}", entry.key());
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                tracing::debug!("Registered {} instance for {}", type_name::<V>(), entry.key());
                entry.insert(candidate).value().clone()
            }
        }
    }

    /// Get the instance for `key`, if one was created
    pub fn get(&self, key: &PathKey) -> Option<Arc<V>> {
        let key = key.clone().normalize();
        self.instances.get(&key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl<V> fmt::Debug for InstanceRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("len", &self.instances.len())
            .finish()
    }
}
