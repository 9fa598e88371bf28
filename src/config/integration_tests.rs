// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Loads the sample run configurations under `configs/` and builds runtimes
//! from them.

use crate::backends::json_file;
use crate::config::{load_and_validate_config, load_config, RuntimeBuilder};
use crate::engine::FinalizeOrder;
use crate::errors::{ConfigError, FailureStrategy, ValidationError};
use crate::event::VecSource;
use crate::modules::testing::raw_event;
use crate::modules::{AsciiWriter, BaselineFinder, PulseFinder, RunInfoWriter};
use crate::traits::{ModuleType, RunQuery, StorageBackend, StoreMode};

/// Test that the full analysis chain configuration loads and validates
#[test]
fn test_analysis_chain_yaml_loading() {
    let config = load_and_validate_config("configs/analysis-chain.yaml").unwrap();

    assert_eq!(config.engine.failure_strategy, FailureStrategy::FailFast);
    assert_eq!(config.engine.finalize_order, FinalizeOrder::Forward);
    assert_eq!(config.storage.backend, "memory");
    assert_eq!(config.modules.len(), 9);
    assert_eq!(config.modules[0].module, "ConvertData");
    assert_eq!(config.modules[8].module, "RunInfoWriter");

    let baseline = config.modules[1].parameters();
    assert_eq!(baseline.get_or("pre_samps", 0usize).unwrap(), 100);
    assert_eq!(baseline.get_or("max_sigma", 0.0).unwrap(), 5.0);
}

/// Test engine options and per-module skip lists
#[test]
fn test_continue_on_error_yaml_loading() {
    let config = load_and_validate_config("configs/continue-on-error.yaml").unwrap();

    assert_eq!(config.engine.failure_strategy, FailureStrategy::ContinueOnError);
    assert_eq!(config.engine.finalize_order, FinalizeOrder::Reverse);
    assert_eq!(config.storage.backend, "memory");

    let skipped: Vec<i32> = config.modules[0]
        .parameters()
        .get_or("skip_channels", Vec::new())
        .unwrap();
    assert_eq!(skipped, vec![3]);
}

/// Test that TOML configurations carry the same structure as YAML
#[test]
fn test_json_storage_toml_loading() {
    let config = load_and_validate_config("configs/json-storage.toml").unwrap();

    assert_eq!(config.storage.backend, json_file::NAME);
    assert_eq!(
        config.storage.parameters().require::<String>("path").unwrap(),
        "runinfo.json"
    );
    let names: Vec<&str> = config.modules.iter().map(|m| m.module.as_str()).collect();
    assert_eq!(
        names,
        vec!["ConvertData", "BaselineFinder", "Integrator", "PulseFinder", "RunInfoWriter"]
    );
    let mode: StoreMode = config.modules[4].parameters().require("store_mode").unwrap();
    assert_eq!(mode, StoreMode::Replace);
}

/// Test that a configuration with missing dependencies reports all of them
#[test]
fn test_missing_dependency_yaml_is_rejected() {
    let err = load_and_validate_config("configs/missing-dependency.yaml").unwrap_err();

    let ConfigError::Invalid(errors) = err else {
        panic!("expected validation errors, got {:?}", err);
    };
    let missing: Vec<&str> = errors
        .iter()
        .filter_map(|e| match e {
            ValidationError::UnresolvedDependency {
                module,
                missing_dependency,
            } if module == "PulseFinder" => Some(missing_dependency.as_str()),
            _ => None,
        })
        .collect();
    assert!(missing.contains(&"BaselineFinder"));
    assert!(missing.contains(&"Integrator"));

    // Parsing alone still succeeds
    assert_eq!(load_config("configs/missing-dependency.yaml").unwrap().modules.len(), 2);
}

/// Test building a runtime from the analysis chain configuration
#[test]
fn test_build_runtime_from_yaml() {
    let config = load_and_validate_config("configs/analysis-chain.yaml").unwrap();
    let mut runtime = RuntimeBuilder::from_config(&config).unwrap();

    assert_eq!(runtime.engine.module_count(), 9);
    assert_eq!(runtime.storage.borrow().name(), "memory");

    runtime.engine.resolve().unwrap();
    let order = runtime.engine.order().unwrap().to_vec();
    let position = |kind| order.iter().position(|k| *k == kind).unwrap();

    for slot in runtime.engine.registry().slots() {
        for dep in slot.dependencies() {
            assert!(
                position(*dep) < position(slot.kind()),
                "'{}' must run after '{}'",
                slot.kind(),
                dep
            );
        }
    }
    assert!(position(BaselineFinder::KIND) < position(PulseFinder::KIND));
    assert!(runtime.engine.get_module::<AsciiWriter>().is_some());
}

/// Test a full run against the JSON file backend, with the path redirected
#[test]
fn test_run_persists_runinfo_to_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runinfo.json");

    let mut config = load_and_validate_config("configs/json-storage.toml").unwrap();
    config
        .storage
        .options
        .insert("path".to_string(), path.to_string_lossy().to_string().into());

    for pass in 0..2 {
        let mut runtime = RuntimeBuilder::from_config(&config).unwrap();
        let events = (0..3)
            .map(|id| raw_event(id, vec![(0, vec![10.0; 120]), (1, vec![10.0; 120])]))
            .collect();
        let summary = runtime.engine.run(&mut VecSource::new(events)).unwrap();
        assert_eq!(summary.events_processed, 3, "pass {}", pass);

        let writer = runtime.engine.get_module::<RunInfoWriter>().unwrap();
        assert_eq!(writer.previous().is_some(), pass > 0, "pass {}", pass);
    }

    let mut reader = json_file::JsonFileBackend::with_path(&path);
    let stored = reader.load(&RunQuery::RunId(1)).unwrap().unwrap();
    assert_eq!(stored.events, 3);
    assert_eq!(stored.metadata.get("nchans").map(String::as_str), Some("2"));
}

/// Test that unknown names are all reported before anything is built
#[test]
fn test_unknown_module_and_backend_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(
        &path,
        "storage:\n  backend: mysql\nmodules:\n  - module: ConvertData\n  - module: FluxCapacitor\n",
    )
    .unwrap();

    let msg = load_and_validate_config(&path).unwrap_err().to_string();
    assert!(msg.contains("Unknown module: 'FluxCapacitor'"), "{}", msg);
    assert!(msg.contains("Unknown storage backend 'mysql'"), "{}", msg);
}
