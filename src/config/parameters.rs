// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::errors::ParameterError;

/// Named options a module or backend binds to when it is constructed.
///
/// Values come straight from the `options` mapping of a configuration entry
/// and are converted to the requested type on access.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    owner: String,
    values: HashMap<String, serde_yaml::Value>,
}

impl Parameters {
    pub fn new(owner: impl Into<String>, values: HashMap<String, serde_yaml::Value>) -> Self {
        Self {
            owner: owner.into(),
            values,
        }
    }

    /// An empty option set for `owner`.
    pub fn empty(owner: impl Into<String>) -> Self {
        Self::new(owner, HashMap::new())
    }

    /// Builder-style insert, mostly for tests and programmatic setup.
    pub fn with(mut self, name: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// The option converted to `T`, or `None` when it is not set.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ParameterError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| ParameterError {
                    owner: self.owner.clone(),
                    name: name.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// The option converted to `T`, or `default` when it is not set.
    pub fn get_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T, ParameterError> {
        Ok(self.get(name)?.unwrap_or(default))
    }

    /// The option converted to `T`; missing is an error.
    pub fn require<T: DeserializeOwned>(&self, name: &str) -> Result<T, ParameterError> {
        self.get(name)?.ok_or_else(|| ParameterError {
            owner: self.owner.clone(),
            name: name.to_string(),
            reason: "required option is missing".to_string(),
        })
    }
}
