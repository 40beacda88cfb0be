use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File system abstraction for module loading and testing
pub trait FileSystem: Send + Sync {
    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Read a file as UTF-8. Missing files report `io::ErrorKind::NotFound`.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Last modification time, used to invalidate cached modules
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// Real file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }
}

/// In-memory file system for testing
#[derive(Debug, Default)]
pub struct MockFileSystem {
    pub files: HashMap<PathBuf, (String, SystemTime)>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file. Replacing bumps its modification time.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        let modified = match self.files.get(&path) {
            Some((_, previous)) => *previous + std::time::Duration::from_secs(1),
            None => SystemTime::UNIX_EPOCH,
        };
        self.files.insert(path, (contents.into(), modified));
    }

    pub fn remove_file(&mut self, path: &Path) {
        self.files.remove(path);
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such file: {}", path.display()),
        )
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .map(|(contents, _)| contents.clone())
            .ok_or_else(|| Self::not_found(path))
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.files
            .get(path)
            .map(|(_, modified)| *modified)
            .ok_or_else(|| Self::not_found(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_missing_file_is_not_found() {
        let fs = MockFileSystem::new();
        let err = fs.read_to_string(Path::new("/src/App/reducer.js")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!fs.exists(Path::new("/src/App/reducer.js")));
    }

    #[test]
    fn test_mock_replace_bumps_mtime() {
        let mut fs = MockFileSystem::new();
        let path = Path::new("/src/state.js");
        fs.add_file(path, "// @flow");
        let first = fs.modified(path).unwrap();
        fs.add_file(path, "// @flow\nexport default {};");
        let second = fs.modified(path).unwrap();

        assert!(second > first);
        assert_eq!(fs.read_to_string(path).unwrap(), "// @flow\nexport default {};");
    }

    #[test]
    fn test_real_file_system() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reducer.js");
        std::fs::write(&path, "export type State = {};").unwrap();

        let fs = RealFileSystem;
        assert!(fs.exists(&path));
        assert!(fs.modified(&path).is_ok());
        assert_eq!(fs.read_to_string(&path).unwrap(), "export type State = {};");

        let missing = fs.read_to_string(&dir.path().join("missing.js")).unwrap_err();
        assert_eq!(missing.kind(), io::ErrorKind::NotFound);
    }
}
