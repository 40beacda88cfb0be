//! Reading the contributions a target module already aggregates.

use crate::contract::Contract;
use stateweave_parser::ast::{BindingKind, Module};
use stateweave_parser::explode;
use std::collections::BTreeSet;

/// Slices recorded by a previous rewrite of the target module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorAggregate {
    /// Local aliases of `import type { State as <Name> }`
    pub slice_names: BTreeSet<String>,
    /// Sources of every import that brings in a contract export
    pub specifiers: BTreeSet<String>,
}

impl PriorAggregate {
    pub fn is_empty(&self) -> bool {
        self.slice_names.is_empty() && self.specifiers.is_empty()
    }
}

/// Extract the prior aggregate from the target's import table.
///
/// Imports that bring in neither `State` nor `initialState` are not
/// contributions and are ignored.
pub fn read_aggregate(module: &Module) -> PriorAggregate {
    let mut prior = PriorAggregate::default();

    for entry in explode(module).imports {
        let Some(imported) = entry.imported.as_deref() else {
            continue;
        };

        if imported == Contract::State.export_name() && entry.kind == BindingKind::Type {
            if let Some(local) = &entry.local {
                prior.slice_names.insert(local.clone());
            }
        }

        if imported == Contract::State.export_name()
            || imported == Contract::InitialState.export_name()
        {
            prior.specifiers.insert(entry.source);
        }
    }

    prior
}
