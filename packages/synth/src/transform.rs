//! Rewriting a target module to aggregate one more child.

use crate::aggregate::read_aggregate;
use crate::contract::missing_contracts;
use crate::error::{SynthError, SynthResult};
use crate::import_path::import_path;
use crate::loader::ModuleLoader;
use crate::naming::{field_key, state_name};
use crate::options::{Mode, TransformOptions};
use crate::synthesizer::{synthesize, type_import};
use stateweave_parser::ast::{Comment, Module, Statement};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Text of the pragma added to rewritten modules
pub const FLOW_PRAGMA: &str = " @flow";

/// Result of a single rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No child module was given
    NotApplicable,
    /// The child does not export the contracts the mode requires
    ContractUnsatisfied,
    /// The child no longer exists; `removed` imports of it were dropped
    Retracted { removed: usize },
    /// Incremental mode found the child already imported
    AlreadyImported,
    /// The target body was replaced or extended
    Rewritten,
}

impl Outcome {
    /// True when new declarations were installed
    pub fn rewritten(self) -> bool {
        self == Outcome::Rewritten
    }

    /// True when the target tree changed in any way
    pub fn modified(self) -> bool {
        match self {
            Outcome::Rewritten => true,
            Outcome::Retracted { removed } => removed > 0,
            _ => false,
        }
    }
}

/// Aggregate the child named in `options` into `target`, which lives at
/// `target_path`.
///
/// A child that fails to load for any reason other than being absent is an
/// error and leaves `target` untouched.
#[instrument(skip_all, fields(target = %target_path.display(), mode = %options.mode))]
pub fn transform<L: ModuleLoader + ?Sized>(
    target: &mut Module,
    target_path: &Path,
    options: &TransformOptions,
    loader: &L,
) -> SynthResult<Outcome> {
    let Some(child_path) = options.child_path.as_deref() else {
        debug!("No child module given");
        return Ok(Outcome::NotApplicable);
    };

    let specifier = import_path(target_path, child_path, &options.extensions);
    debug!(child = %child_path.display(), specifier = %specifier, "Resolving child module");

    let child = match loader.load(child_path) {
        Ok(child) => child,
        Err(err) if err.is_not_found() => {
            let removed = retract(target, &specifier);
            info!(specifier = %specifier, removed, "Child module missing, retracted imports");
            return Ok(Outcome::Retracted { removed });
        }
        Err(source) => {
            return Err(SynthError::Load {
                path: child_path.to_path_buf(),
                source,
            })
        }
    };

    let missing = missing_contracts(&child, options.mode.required_contracts());
    if !missing.is_empty() {
        debug!(specifier = %specifier, ?missing, "Child does not satisfy contract");
        return Ok(Outcome::ContractUnsatisfied);
    }

    if options.mode == Mode::IncrementalImport {
        if !insert_type_import(target, &specifier) {
            debug!(specifier = %specifier, "Child already imported");
            return Ok(Outcome::AlreadyImported);
        }
        normalize_pragma(target);
        info!(specifier = %specifier, "Inserted child type import");
        return Ok(Outcome::Rewritten);
    }

    let prior = read_aggregate(target);
    let mut specifiers = prior.specifiers;
    specifiers.insert(specifier.clone());
    let mut names = prior.slice_names;
    names.insert(state_name(Path::new(&specifier)));

    warn_collisions(&specifiers);

    target.body = synthesize(&specifiers, &names, options.mode);
    normalize_pragma(target);

    info!(specifier = %specifier, slices = names.len(), "Rewrote aggregate");
    Ok(Outcome::Rewritten)
}

/// Remove every import of `specifier`, returning how many were removed
pub fn retract(target: &mut Module, specifier: &str) -> usize {
    let before = target.body.len();
    target
        .body
        .retain(|statement| !matches!(statement, Statement::Import(import) if import.source == specifier));
    before - target.body.len()
}

/// Put a `@flow` pragma first among the header comments.
///
/// An existing pragma, including variants like `@flow strict`, is moved to
/// the front; duplicates are dropped.
pub fn normalize_pragma(target: &mut Module) {
    let existing = target
        .comments
        .iter()
        .position(Comment::is_flow_pragma)
        .map(|index| target.comments.remove(index));
    target.comments.retain(|comment| !comment.is_flow_pragma());
    target
        .comments
        .insert(0, existing.unwrap_or_else(|| Comment::line(FLOW_PRAGMA)));
}

/// Insert the child's type import after the last import, unless the module
/// already imports from `specifier`
fn insert_type_import(target: &mut Module, specifier: &str) -> bool {
    if target.imports().any(|import| import.source == specifier) {
        return false;
    }

    let position = target
        .body
        .iter()
        .rposition(|statement| matches!(statement, Statement::Import(_)))
        .map_or(0, |index| index + 1);
    target.body.insert(position, type_import(specifier));
    true
}

/// Children whose slice names lower to the same field key end up in one field
fn warn_collisions(specifiers: &BTreeSet<String>) {
    let mut by_key: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for specifier in specifiers {
        by_key
            .entry(field_key(&state_name(Path::new(specifier))))
            .or_default()
            .push(specifier);
    }

    for (key, specifiers) in by_key.iter().filter(|(_, s)| s.len() > 1) {
        warn!(field = %key, specifiers = ?specifiers, "Children share a field key");
    }
}
