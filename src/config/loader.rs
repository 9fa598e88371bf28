// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::backends::storage_factory;
use crate::config::consts::DEFAULT_STORAGE_BACKEND;
use crate::config::{validate_config, Parameters};
use crate::engine::EngineOptions;
use crate::errors::ConfigError;
use crate::modules::ModuleFactory;

/// Complete configuration for one analysis run.
///
/// # Fields
/// * `engine` - Failure strategy and finalize order (optional, both have defaults)
/// * `storage` - Which run-info storage backend to use and its options (optional, defaults to `memory`)
/// * `modules` - The analysis modules to activate, in registration order
///
/// # Example
/// ```yaml
/// engine:
///   failure_strategy: continue_on_error
///   finalize_order: reverse
/// storage:
///   backend: json_file
///   options:
///     path: runinfo.json
/// modules:
///   - module: ConvertData
///   - module: BaselineFinder
///     options: { pre_samps: 100, max_sigma: 5.0 }
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineOptions,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Storage backend selection.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
}

fn default_backend() -> String {
    DEFAULT_STORAGE_BACKEND.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            options: HashMap::new(),
        }
    }
}

impl StorageConfig {
    pub fn parameters(&self) -> Parameters {
        Parameters::new(self.backend.clone(), self.options.clone())
    }
}

/// One analysis module to activate.
///
/// # Example
/// ```yaml
/// module: APFinder
/// options:
///   amp_threshold: -3.0
///   skip_channels: [0, 7]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleConfig {
    pub module: String,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>, // module-specific options
}

impl ModuleConfig {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            options: HashMap::new(),
        }
    }

    pub fn with_option(mut self, name: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.options.insert(name.to_string(), value.into());
        self
    }

    pub fn parameters(&self) -> Parameters {
        Parameters::new(self.module.clone(), self.options.clone())
    }
}

/// Load a config file. `.yaml`/`.yml` files are parsed as YAML, `.toml` as TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "yaml" | "yml" => Config::from_yaml_str(&fs::read_to_string(path)?),
        "toml" => Config::from_toml_str(&fs::read_to_string(path)?),
        _ => Err(ConfigError::UnsupportedFormat { extension }),
    }
}

/// Load a config file and validate it against the bundled modules and storage backends.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;

    let backends = storage_factory().names();
    validate_config(&cfg, &ModuleFactory::new(), &backends).map_err(ConfigError::Invalid)?;

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FinalizeOrder;
    use crate::errors::FailureStrategy;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
engine:
  failure_strategy: continue_on_error
  finalize_order: reverse
storage:
  backend: json_file
  options:
    path: runs.json
modules:
  - module: ConvertData
  - module: BaselineFinder
    options: { pre_samps: 50, skip_channels: [3] }
"#;

        let cfg = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.engine.failure_strategy, FailureStrategy::ContinueOnError);
        assert_eq!(cfg.engine.finalize_order, FinalizeOrder::Reverse);
        assert_eq!(cfg.storage.backend, "json_file");
        assert_eq!(cfg.modules.len(), 2);

        let params = cfg.modules[1].parameters();
        assert_eq!(params.owner(), "BaselineFinder");
        assert_eq!(params.get::<usize>("pre_samps").unwrap(), Some(50));
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::from_yaml_str("modules: []").unwrap();
        assert_eq!(cfg.engine, EngineOptions::default());
        assert_eq!(cfg.engine.failure_strategy, FailureStrategy::FailFast);
        assert_eq!(cfg.engine.finalize_order, FinalizeOrder::Forward);
        assert_eq!(cfg.storage.backend, DEFAULT_STORAGE_BACKEND);
    }

    #[test]
    fn test_load_by_extension() {
        struct TestCase {
            name: &'static str,
            suffix: &'static str,
            content: &'static str,
            expected_modules: Option<usize>,
        }

        let test_cases = vec![
            TestCase {
                name: "yaml",
                suffix: ".yaml",
                content: "modules:\n  - module: ConvertData\n",
                expected_modules: Some(1),
            },
            TestCase {
                name: "yml",
                suffix: ".yml",
                content: "modules:\n  - module: ConvertData\n  - module: BaselineFinder\n",
                expected_modules: Some(2),
            },
            TestCase {
                name: "toml",
                suffix: ".toml",
                content: r#"
[engine]
finalize_order = "reverse"

[[modules]]
module = "ConvertData"

[[modules]]
module = "BaselineFinder"
options = { pre_samps = 20 }
"#,
                expected_modules: Some(2),
            },
            TestCase {
                name: "unsupported extension",
                suffix: ".json",
                content: "{}",
                expected_modules: None,
            },
        ];

        for tc in test_cases {
            let file = write_temp(tc.suffix, tc.content);
            let result = load_config(file.path());
            match tc.expected_modules {
                Some(count) => {
                    let cfg = result.unwrap_or_else(|e| panic!("Test case '{}': {}", tc.name, e));
                    assert_eq!(cfg.modules.len(), count, "Test case '{}'", tc.name);
                }
                None => assert!(
                    matches!(result, Err(ConfigError::UnsupportedFormat { .. })),
                    "Test case '{}'",
                    tc.name
                ),
            }
        }
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let yaml = r#"
modules:
  - module: ConvertData
  - module: BaselineFinder
  - module: Integrator
"#;
        let file = write_temp(".yaml", yaml);
        assert!(load_and_validate_config(file.path()).is_ok());
    }

    #[test]
    fn test_load_and_validate_rejects_unknown_names() {
        let yaml = r#"
storage:
  backend: mysql
modules:
  - module: ConvertData
  - module: FluxCapacitor
"#;
        let file = write_temp(".yaml", yaml);

        let error_msg = load_and_validate_config(file.path())
            .unwrap_err()
            .to_string();
        assert!(error_msg.contains("Configuration validation failed"));
        assert!(error_msg.contains("Unknown module: 'FluxCapacitor'"));
        assert!(error_msg.contains("Unknown storage backend 'mysql'"));
    }

    #[test]
    fn test_load_and_validate_missing_dependency() {
        let yaml = r#"
modules:
  - module: ConvertData
  - module: PulseFinder
"#;
        let file = write_temp(".yaml", yaml);

        let error_msg = load_and_validate_config(file.path())
            .unwrap_err()
            .to_string();
        assert!(error_msg.contains("'PulseFinder' depends on 'BaselineFinder'"));
        assert!(error_msg.contains("'PulseFinder' depends on 'Integrator'"));
    }
}
