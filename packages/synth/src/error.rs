use crate::loader::LoadError;
use std::path::PathBuf;
use thiserror::Error;

pub type SynthResult<T> = Result<T, SynthError>;

#[derive(Error, Debug)]
pub enum SynthError {
    /// The child module exists but could not be read or parsed
    #[error("Cannot aggregate {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}

impl SynthError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            SynthError::Load { path, .. } => path,
        }
    }
}
