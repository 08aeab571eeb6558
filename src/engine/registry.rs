//! Registry of reflectors, keyed by type name.
//!
//! Each type module submits exactly one [`Registration`]; the global registry
//! collects them once, on first use, and is read-only afterwards. Tests and
//! embedders that want a smaller catalogue build their own with
//! [`RegistryBuilder`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::engine::Reflector;
use crate::error::{ReflectError, Result};

/// Factory submitted by a type module.
pub struct Registration(pub fn() -> Reflector);

inventory::collect!(Registration);

static GLOBAL: LazyLock<Registry> = LazyLock::new(|| {
    let mut builder = RegistryBuilder::new();
    for registration in inventory::iter::<Registration> {
        builder = builder.register(registration.0);
    }
    match builder.build() {
        Ok(registry) => registry,
        Err(e) => panic!("global reflector registry: {e}"),
    }
});

/// Immutable table of reflectors.
#[derive(Debug, Default)]
pub struct Registry {
    types: BTreeMap<&'static str, Reflector>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Every reflector submitted by the type modules linked into the process.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    pub fn lookup(&self, name: &str) -> Option<&Reflector> {
        self.types.get(name)
    }

    /// Lookup for a user-supplied name.
    pub fn get(&self, name: &str) -> Result<&Reflector> {
        self.lookup(name)
            .ok_or_else(|| ReflectError::UnknownType(name.to_string()))
    }

    /// Lookup for a name the caller hard-codes.
    ///
    /// # Panics
    ///
    /// Panics if no reflector of that name is registered.
    pub fn must(&self, name: &str) -> &Reflector {
        match self.lookup(name) {
            Some(r) => r,
            None => panic!("reflector {name:?} is not registered"),
        }
    }

    /// Reflectors sorted by name.
    pub fn all(&self) -> impl Iterator<Item = &Reflector> {
        self.types.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Collects factories and builds a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    factories: Vec<fn() -> Reflector>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, factory: fn() -> Reflector) -> Self {
        self.factories.push(factory);
        self
    }

    /// Run every factory. Fails if two reflectors share a name.
    pub fn build(self) -> Result<Registry> {
        let mut types = BTreeMap::new();
        for factory in self.factories {
            let reflector = factory();
            let name = reflector.name;
            if types.insert(name, reflector).is_some() {
                return Err(ReflectError::DuplicateType(name.to_string()));
            }
        }
        debug!(count = types.len(), "built reflector registry");
        Ok(Registry { types })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha() -> Reflector {
        Reflector::new("Alpha")
    }

    fn beta() -> Reflector {
        Reflector::new("Beta")
    }

    #[test]
    fn test_lookup_and_sorted_snapshot() {
        let registry = Registry::builder()
            .register(beta)
            .register(alpha)
            .build()
            .unwrap();
        assert!(registry.lookup("Alpha").is_some());
        assert!(registry.lookup("Gamma").is_none());
        let names: Vec<_> = registry.all().map(|r| r.name).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Registry::builder()
            .register(alpha)
            .register(alpha)
            .build()
            .unwrap_err();
        assert_eq!(err, ReflectError::DuplicateType("Alpha".into()));
    }

    #[test]
    fn test_get_reports_unknown_type() {
        let registry = Registry::builder().register(alpha).build().unwrap();
        assert_eq!(
            registry.get("Nope").unwrap_err(),
            ReflectError::UnknownType("Nope".into())
        );
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_must_panics_on_missing() {
        let registry = Registry::builder().build().unwrap();
        registry.must("Alpha");
    }
}
