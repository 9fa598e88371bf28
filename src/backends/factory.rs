// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::errors::FactoryError;
use crate::observability::messages::backend::{BackendNotFound, BackendRegistered};
use crate::observability::messages::StructuredLog;
use crate::traits::StorageBackend;

/// Creates backend instances by name.
///
/// Constructors are registered once during an explicit bootstrap step. Every
/// call to `create` builds a fresh instance; there is no default backend.
pub struct BackendFactory<T: ?Sized> {
    constructors: BTreeMap<String, fn() -> Box<T>>,
}

/// Factory for run-info storage backends.
pub type StorageFactory = BackendFactory<dyn StorageBackend>;

impl<T: ?Sized> BackendFactory<T> {
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register `constructor` under `name`. An existing registration is kept.
    pub fn register(&mut self, name: &str, constructor: fn() -> Box<T>) -> Result<(), FactoryError> {
        if self.constructors.contains_key(name) {
            return Err(FactoryError::DuplicateBackend {
                name: name.to_string(),
            });
        }
        self.constructors.insert(name.to_string(), constructor);
        BackendRegistered { name }.log();
        Ok(())
    }

    pub fn create(&self, name: &str) -> Result<Box<T>, FactoryError> {
        match self.constructors.get(name) {
            Some(constructor) => Ok(constructor()),
            None => {
                let available = self.names();
                BackendNotFound {
                    name,
                    available: &available,
                }
                .log();
                Err(FactoryError::UnknownBackend {
                    name: name.to_string(),
                    available,
                })
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }
}

impl<T: ?Sized> Default for BackendFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named {
        fn name(&self) -> &'static str;
    }

    struct Alpha;
    struct Beta;

    impl Named for Alpha {
        fn name(&self) -> &'static str {
            "alpha"
        }
    }

    impl Named for Beta {
        fn name(&self) -> &'static str {
            "beta"
        }
    }

    fn alpha() -> Box<dyn Named> {
        Box::new(Alpha)
    }

    fn beta() -> Box<dyn Named> {
        Box::new(Beta)
    }

    fn factory() -> BackendFactory<dyn Named> {
        let mut factory = BackendFactory::new();
        factory.register("beta", beta).unwrap();
        factory.register("alpha", alpha).unwrap();
        factory
    }

    #[test]
    fn test_create_table_driven() {
        struct TestCase {
            name: &'static str,
            backend: &'static str,
            expected: Result<&'static str, FactoryError>,
        }

        let test_cases = vec![
            TestCase {
                name: "first registered",
                backend: "alpha",
                expected: Ok("alpha"),
            },
            TestCase {
                name: "second registered",
                backend: "beta",
                expected: Ok("beta"),
            },
            TestCase {
                name: "unknown lists available names",
                backend: "gamma",
                expected: Err(FactoryError::UnknownBackend {
                    name: "gamma".to_string(),
                    available: vec!["alpha".to_string(), "beta".to_string()],
                }),
            },
        ];

        let factory = factory();
        for tc in test_cases {
            let result = factory.create(tc.backend).map(|b| b.name());
            assert_eq!(result, tc.expected, "Test case '{}'", tc.name);
        }
    }

    #[test]
    fn test_duplicate_registration_does_not_overwrite() {
        let mut factory = factory();
        let err = factory.register("alpha", beta).unwrap_err();

        assert_eq!(
            err,
            FactoryError::DuplicateBackend {
                name: "alpha".to_string()
            }
        );
        assert_eq!(factory.create("alpha").unwrap().name(), "alpha");
    }

    #[test]
    fn test_every_create_is_a_fresh_instance() {
        let mut factory: BackendFactory<Vec<u8>> = BackendFactory::new();
        factory.register("buffer", || Box::new(Vec::new())).unwrap();

        let mut first = factory.create("buffer").unwrap();
        first.push(1);
        let second = factory.create("buffer").unwrap();

        assert!(second.is_empty());
        assert_eq!(factory.names(), vec!["buffer".to_string()]);
        assert!(factory.contains("buffer"));
    }
}
