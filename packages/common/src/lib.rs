//! File system access shared by the stateweave crates.

pub mod filesystem;

pub use filesystem::*;
