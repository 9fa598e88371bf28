// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::config::DependencyGraph;
use crate::errors::{RegistryError, ValidationError};
use crate::observability::messages::registry::{
    ModuleRegistered, RegistrationRejected, ResolutionFailed, ResolutionSucceeded,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Module, ModuleKind, ModuleType};

/// Where a registered module is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Registered,
    Initialized,
    Failed,
    Finalized,
}

/// One registered module plus the data the registry snapshotted at registration.
pub struct ModuleSlot {
    kind: ModuleKind,
    dependencies: Vec<ModuleKind>,
    state: LifecycleState,
    module: Box<dyn Module>,
}

impl ModuleSlot {
    fn new(module: Box<dyn Module>) -> Self {
        let descriptor = module.descriptor();
        Self {
            kind: descriptor.kind(),
            dependencies: descriptor.dependencies().to_vec(),
            state: LifecycleState::Registered,
            module,
        }
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn dependencies(&self) -> &[ModuleKind] {
        &self.dependencies
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: LifecycleState) {
        self.state = state;
    }

    pub fn module(&self) -> &dyn Module {
        self.module.as_ref()
    }

    pub fn module_mut(&mut self) -> &mut dyn Module {
        self.module.as_mut()
    }
}

/// Owns the active modules of a run, at most one per kind, and their
/// resolved execution order.
///
/// Slots are kept in registration order until `resolve` succeeds; from then
/// on they are stored in execution order and the registry is closed to new
/// registrations.
#[derive(Default)]
pub struct ModuleRegistry {
    slots: Vec<ModuleSlot>,
    order: Option<Vec<ModuleKind>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Box<dyn Module>) -> Result<(), RegistryError> {
        let slot = ModuleSlot::new(module);
        let kind = slot.kind();

        let rejection = if self.order.is_some() {
            Some(RegistryError::AlreadyResolved { kind })
        } else if self.contains(kind) {
            Some(RegistryError::DuplicateModule { kind })
        } else {
            None
        };

        if let Some(err) = rejection {
            RegistrationRejected {
                kind: kind.as_str(),
                error: &err,
            }
            .log();
            return Err(err);
        }

        ModuleRegistered {
            kind: kind.as_str(),
            name: slot.module().name(),
            dependency_count: slot.dependencies().len(),
        }
        .log();
        self.slots.push(slot);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, kind: ModuleKind) -> bool {
        self.slots.iter().any(|slot| slot.kind == kind)
    }

    pub fn is_resolved(&self) -> bool {
        self.order.is_some()
    }

    /// The cached execution order, once `resolve` has succeeded.
    pub fn order(&self) -> Option<&[ModuleKind]> {
        self.order.as_deref()
    }

    /// Build the dependency graph from the registration snapshots.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for slot in &self.slots {
            graph.add_node(slot.kind, slot.dependencies.clone());
        }
        graph
    }

    /// Compute the execution order and store the modules in it.
    ///
    /// The order is computed once; later calls return the cached order.
    /// On failure nothing is cached and no module is reordered.
    pub fn resolve(&mut self) -> Result<&[ModuleKind], Vec<ValidationError>> {
        if self.order.is_none() {
            let order = match self.dependency_graph().topological_order() {
                Ok(order) => order,
                Err(errors) => {
                    ResolutionFailed {
                        module_count: self.slots.len(),
                        errors: &errors,
                    }
                    .log();
                    return Err(errors);
                }
            };

            let position: HashMap<ModuleKind, usize> =
                order.iter().enumerate().map(|(i, kind)| (*kind, i)).collect();
            self.slots
                .sort_by_key(|slot| position.get(&slot.kind).copied().unwrap_or(usize::MAX));

            ResolutionSucceeded { order: &order }.log();
            self.order = Some(order);
        }

        Ok(self.order.as_deref().unwrap_or_default())
    }

    pub fn state_of(&self, kind: ModuleKind) -> Option<LifecycleState> {
        self.slot(kind).map(|slot| slot.state)
    }

    pub fn get_by_kind(&self, kind: ModuleKind) -> Option<&dyn Module> {
        self.slot(kind).map(|slot| slot.module())
    }

    pub fn get<T: ModuleType>(&self) -> Option<&T> {
        self.get_by_kind(T::KIND)
            .and_then(|module| module.as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: ModuleType>(&mut self) -> Option<&mut T> {
        self.slots
            .iter_mut()
            .find(|slot| slot.kind == T::KIND)
            .and_then(|slot| slot.module.as_any_mut().downcast_mut::<T>())
    }

    /// Slots in storage order: registration order before resolution,
    /// execution order after.
    pub fn slots(&self) -> &[ModuleSlot] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [ModuleSlot] {
        &mut self.slots
    }

    fn slot(&self, kind: ModuleKind) -> Option<&ModuleSlot> {
        self.slots.iter().find(|slot| slot.kind == kind)
    }
}
