use crate::contract::Contract;
use crate::import_path::DEFAULT_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// What a rewrite produces in the target module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Type imports and the aggregate `State` type
    TypeOnly,
    /// Adds value imports and the aggregate `initialState`
    TypeAndInitializer,
    /// Adds `export default initialState`
    #[default]
    TypeInitializerAndDefault,
    /// Only inserts the child's type import, leaving the rest of the module alone
    IncrementalImport,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::TypeOnly,
        Mode::TypeAndInitializer,
        Mode::TypeInitializerAndDefault,
        Mode::IncrementalImport,
    ];

    /// Contracts the child module must export for this mode to apply
    pub fn required_contracts(self) -> &'static [Contract] {
        match self {
            Mode::TypeOnly | Mode::IncrementalImport => &[Contract::State],
            Mode::TypeAndInitializer | Mode::TypeInitializerAndDefault => {
                &[Contract::State, Contract::InitialState]
            }
        }
    }

    pub fn emits_initializer(self) -> bool {
        matches!(self, Mode::TypeAndInitializer | Mode::TypeInitializerAndDefault)
    }

    pub fn emits_default_export(self) -> bool {
        self == Mode::TypeInitializerAndDefault
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::TypeOnly => "type-only",
            Mode::TypeAndInitializer => "type-and-initializer",
            Mode::TypeInitializerAndDefault => "type-initializer-and-default",
            Mode::IncrementalImport => "incremental-import",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Mode::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown mode '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

/// Options for a single rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub mode: Mode,
    /// Child module to aggregate. Without one the rewrite does nothing.
    pub child_path: Option<PathBuf>,
    /// Source extensions stripped from import specifiers
    pub extensions: Vec<String>,
}

impl TransformOptions {
    pub fn new(child_path: impl Into<PathBuf>) -> Self {
        Self {
            child_path: Some(child_path.into()),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            child_path: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}
