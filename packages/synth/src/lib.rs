//! Aggregation of per-directory `State` slices into a parent module.
//!
//! Given a target module and one child module path, [`transform`] checks that
//! the child exports the `State` type (and `initialState` value, depending on
//! the [`Mode`]) and rebuilds the target so that it imports every known child
//! and exports a combined `State` and `initialState`. Applying it repeatedly
//! with the same child leaves the target unchanged.

pub mod aggregate;
pub mod contract;
pub mod error;
pub mod import_path;
pub mod loader;
pub mod naming;
pub mod options;
pub mod synthesizer;
pub mod transform;

#[cfg(test)]
mod tests;

pub use aggregate::{read_aggregate, PriorAggregate};
pub use contract::{exports_contract, missing_contracts, Contract};
pub use error::{SynthError, SynthResult};
pub use import_path::{default_import_path, import_path, normalize, DEFAULT_EXTENSIONS};
pub use loader::{CachedLoader, FsModuleLoader, LoadError, ModuleLoader};
pub use naming::{field_key, state_name, value_alias};
pub use options::{Mode, TransformOptions};
pub use transform::{transform, Outcome};
