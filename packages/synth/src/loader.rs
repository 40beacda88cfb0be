//! Loading child modules from disk.

use stateweave_common::{FileSystem, RealFileSystem};
use stateweave_parser::{ast::Module, parse, ParseError};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Module not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}

/// Loads and parses a module by path
pub trait ModuleLoader {
    fn load(&self, path: &Path) -> Result<Module, LoadError>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &L {
    fn load(&self, path: &Path) -> Result<Module, LoadError> {
        (**self).load(path)
    }
}

fn read_module<F: FileSystem>(fs: &F, path: &Path) -> Result<Module, LoadError> {
    let source = fs
        .read_to_string(path)
        .map_err(|e| LoadError::from_io(path, e))?;
    parse(&source).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and parses on every call
#[derive(Debug, Default)]
pub struct FsModuleLoader<F: FileSystem = RealFileSystem> {
    fs: F,
}

impl FsModuleLoader<RealFileSystem> {
    pub fn new() -> Self {
        Self { fs: RealFileSystem }
    }
}

impl<F: FileSystem> FsModuleLoader<F> {
    pub fn with_fs(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem> ModuleLoader for FsModuleLoader<F> {
    fn load(&self, path: &Path) -> Result<Module, LoadError> {
        read_module(&self.fs, path)
    }
}

/// Keeps parsed modules keyed by path, reparsing when the modification time
/// changes. Owned by the caller; nothing is shared between loaders.
#[derive(Debug, Default)]
pub struct CachedLoader<F: FileSystem = RealFileSystem> {
    fs: F,
    cache: Mutex<HashMap<PathBuf, (SystemTime, Module)>>,
}

impl CachedLoader<RealFileSystem> {
    pub fn new() -> Self {
        Self::with_fs(RealFileSystem)
    }
}

impl<F: FileSystem> CachedLoader<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            fs,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Drop the cached module for `path`
    pub fn invalidate(&self, path: &Path) {
        self.entries().remove(path);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, (SystemTime, Module)>> {
        // Entries are inserted whole, so a poisoned map is still consistent
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<F: FileSystem> ModuleLoader for CachedLoader<F> {
    fn load(&self, path: &Path) -> Result<Module, LoadError> {
        let modified = match self.fs.modified(path) {
            Ok(modified) => modified,
            Err(e) => {
                self.invalidate(path);
                return Err(LoadError::from_io(path, e));
            }
        };

        if let Some((cached_at, module)) = self.entries().get(path) {
            if *cached_at == modified {
                debug!(path = %path.display(), "Module cache hit");
                return Ok(module.clone());
            }
        }

        let module = read_module(&self.fs, path)?;
        self.entries()
            .insert(path.to_path_buf(), (modified, module.clone()));
        Ok(module)
    }
}
