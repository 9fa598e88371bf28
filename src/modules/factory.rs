// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::SharedStorage;
use crate::config::ModuleConfig;
use crate::errors::ValidationError;
use crate::modules::*;
use crate::traits::{Module, ModuleType};

/// Creates bundled analysis modules by name.
///
/// Storage-backed modules get the shared backend handed to `with_storage`;
/// without one they are still built, but fail in `initialize`.
#[derive(Default)]
pub struct ModuleFactory {
    storage: Option<SharedStorage>,
}

impl ModuleFactory {
    pub fn new() -> Self {
        Self { storage: None }
    }

    pub fn with_storage(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Create a module instance from configuration.
    ///
    /// The `module` field selects the kind:
    /// - "ConvertData" -> ConvertData
    /// - "BaselineFinder" -> BaselineFinder
    /// - "Integrator" -> Integrator
    /// - "SumChannels" -> SumChannels
    /// - "PulseFinder" -> PulseFinder
    /// - "APFinder" -> APFinder
    /// - "S1S2Evaluation" -> S1S2Evaluation
    /// - "AsciiWriter" -> AsciiWriter
    /// - "RunInfoWriter" -> RunInfoWriter (uses the shared storage backend)
    pub fn create(&self, config: &ModuleConfig) -> Result<Box<dyn Module>, ValidationError> {
        let params = config.parameters();

        match config.module.as_str() {
            "ConvertData" => Ok(Box::new(ConvertData::from_parameters(&params)?)),
            "BaselineFinder" => Ok(Box::new(BaselineFinder::from_parameters(&params)?)),
            "Integrator" => Ok(Box::new(Integrator::from_parameters(&params)?)),
            "SumChannels" => Ok(Box::new(SumChannels::from_parameters(&params)?)),
            "PulseFinder" => Ok(Box::new(PulseFinder::from_parameters(&params)?)),
            "APFinder" => Ok(Box::new(APFinder::from_parameters(&params)?)),
            "S1S2Evaluation" => Ok(Box::new(S1S2Evaluation::from_parameters(&params)?)),
            "AsciiWriter" => Ok(Box::new(AsciiWriter::from_parameters(&params)?)),
            "RunInfoWriter" => {
                let mut writer = RunInfoWriter::from_parameters(&params)?;
                if let Some(storage) = &self.storage {
                    writer = writer.with_storage(storage.clone());
                }
                Ok(Box::new(writer))
            }
            other => Err(ValidationError::UnknownModule {
                module: other.to_string(),
            }),
        }
    }

    /// Every module name this factory can build.
    pub fn names() -> Vec<&'static str> {
        vec![
            ConvertData::KIND.as_str(),
            BaselineFinder::KIND.as_str(),
            Integrator::KIND.as_str(),
            SumChannels::KIND.as_str(),
            PulseFinder::KIND.as_str(),
            APFinder::KIND.as_str(),
            S1S2Evaluation::KIND.as_str(),
            AsciiWriter::KIND.as_str(),
            RunInfoWriter::KIND.as_str(),
        ]
    }

    pub fn contains(&self, name: &str) -> bool {
        Self::names().contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::MemoryBackend;
    use crate::traits::{ModuleContext, StorageBackend};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_every_name_builds_its_own_kind() {
        let factory = ModuleFactory::new();
        for name in ModuleFactory::names() {
            let module = factory.create(&ModuleConfig::new(name)).unwrap();
            assert_eq!(module.kind().as_str(), name);
            assert!(factory.contains(name));
        }
    }

    #[test]
    fn test_create_errors_table_driven() {
        struct TestCase {
            name: &'static str,
            config: ModuleConfig,
            expected: &'static str,
        }

        let test_cases = vec![
            TestCase {
                name: "unknown module",
                config: ModuleConfig::new("FluxCapacitor"),
                expected: "Unknown module: 'FluxCapacitor'",
            },
            TestCase {
                name: "names are case sensitive",
                config: ModuleConfig::new("pulsefinder"),
                expected: "Unknown module: 'pulsefinder'",
            },
            TestCase {
                name: "bad option type",
                config: ModuleConfig::new("BaselineFinder").with_option("pre_samps", "lots"),
                expected: "Invalid option 'pre_samps' for 'BaselineFinder'",
            },
            TestCase {
                name: "bad skip_channels",
                config: ModuleConfig::new("APFinder").with_option("skip_channels", "odd"),
                expected: "Invalid option 'skip_channels' for 'APFinder'",
            },
        ];

        let factory = ModuleFactory::new();
        for tc in test_cases {
            let err = factory.create(&tc.config).err().unwrap();
            assert!(
                err.to_string().contains(tc.expected),
                "Test case '{}': got '{}'",
                tc.name,
                err
            );
        }
    }

    #[test]
    fn test_runinfo_writer_gets_shared_storage() {
        let storage: SharedStorage =
            Rc::new(RefCell::new(Box::new(MemoryBackend::new()) as Box<dyn StorageBackend>));
        let ctx = ModuleContext::empty();

        let mut with = ModuleFactory::new()
            .with_storage(storage)
            .create(&ModuleConfig::new("RunInfoWriter"))
            .unwrap();
        assert!(with.initialize(&ctx).is_ok());

        let mut without = ModuleFactory::new()
            .create(&ModuleConfig::new("RunInfoWriter"))
            .unwrap();
        assert!(without.initialize(&ctx).is_err());
    }
}
