//! Application-lifetime attribute store
//!
//! An [`ApplicationScope`] lives from application start-up to shutdown and
//! holds shared, lazily created attributes such as instance registries. It is
//! owned by the application state and passed to whatever needs it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

type Attribute = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ApplicationScope {
    attributes: DashMap<&'static str, Attribute>,
}

impl ApplicationScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the attribute stored under `key`, creating it with `init` if absent.
    ///
    /// Creation is atomic per key: concurrent callers all receive the same
    /// value, and `init` runs at most once per key.
    ///
    /// # Panics
    ///
    /// Panics if the attribute under `key` was created with another type.
    pub fn get_or_init<T, F>(&self, key: &'static str, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let attribute = self
            .attributes
            .entry(key)
            .or_insert_with(|| Arc::new(init()) as Attribute)
            .value()
            .clone();

        match attribute.downcast::<T>() {
            Ok(value) => value,
            Err(_) => panic!(
                "scope attribute {:?} does not hold a {}",
                key,
                std::any::type_name::<T>()
            ),
        }
    }

    /// Get the attribute stored under `key`, if it exists and has type `T`
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let attribute = self.attributes.get(key)?.value().clone();
        attribute.downcast::<T>().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }
}

impl fmt::Debug for ApplicationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<_> = self.attributes.iter().map(|e| *e.key()).collect();
        f.debug_struct("ApplicationScope").field("attributes", &keys).finish()
    }
}
