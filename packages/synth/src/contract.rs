//! Export contracts a child module must satisfy.

use serde::{Deserialize, Serialize};
use stateweave_parser::{explode, ast::Module};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Contract {
    /// `export type State`
    State,
    /// `export const initialState`
    InitialState,
}

impl Contract {
    /// External export name that satisfies this contract
    pub fn export_name(self) -> &'static str {
        match self {
            Contract::State => "State",
            Contract::InitialState => "initialState",
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.export_name())
    }
}

/// True iff `module` exports something under the contract's name.
///
/// Re-exports and type exports count; `export * from` does not, since it
/// names nothing.
pub fn exports_contract(module: &Module, contract: Contract) -> bool {
    explode(module).exports_name(contract.export_name())
}

/// Contracts from `required` that `module` does not export
pub fn missing_contracts(module: &Module, required: &[Contract]) -> Vec<Contract> {
    let exploded = explode(module);
    required
        .iter()
        .copied()
        .filter(|contract| !exploded.exports_name(contract.export_name()))
        .collect()
}
