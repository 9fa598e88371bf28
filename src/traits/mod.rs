pub mod module;
pub mod storage;

pub use module::{ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};
pub use storage::{apply_store, RunInfo, RunQuery, StorageBackend, StoreMode};
