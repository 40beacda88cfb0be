//! Relative module specifiers between two files.

use std::path::{Component, Path, PathBuf};

/// Source extensions stripped from specifiers unless configured otherwise
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".mjs", ".cjs"];

/// Lexically normalize a path: `.` segments are dropped and `..` pops the
/// previous named segment. The file system is never consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    parts.iter().collect()
}

/// Specifier importing `to` from a module located at `from`.
///
/// The result always starts with `./` or `../`, uses `/` separators and has
/// a trailing source extension from `extensions` removed.
pub fn import_path<S: AsRef<str>>(from: &Path, to: &Path, extensions: &[S]) -> String {
    let from = normalize(from);
    let to = normalize(to);
    let from_dir = from.parent().unwrap_or_else(|| Path::new(""));

    let from_parts: Vec<Component> = from_dir.components().collect();
    let to_parts: Vec<Component> = to.components().collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        segments.push("..".to_string());
    }
    for component in &to_parts[common..] {
        segments.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let mut relative = segments.join("/");
    let extension_len = extensions.iter().find_map(|ext| {
        let ext: &str = ext.as_ref();
        (relative.ends_with(ext) && relative.len() > ext.len()).then_some(ext.len())
    });
    if let Some(len) = extension_len {
        relative.truncate(relative.len() - len);
    }

    if relative == ".." || relative.starts_with("../") {
        relative
    } else {
        format!("./{}", relative)
    }
}

/// [`import_path`] with [`DEFAULT_EXTENSIONS`]
pub fn default_import_path(from: &Path, to: &Path) -> String {
    import_path(from, to, DEFAULT_EXTENSIONS)
}

/// True when a specifier points at a file relative to the importing module
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_below_target() {
        assert_eq!(
            default_import_path(
                Path::new("/proj/src/state.js"),
                Path::new("/proj/src/App/reducer.js")
            ),
            "./App/reducer"
        );
    }

    #[test]
    fn test_child_beside_and_above_target() {
        assert_eq!(
            default_import_path(Path::new("/proj/src/state.js"), Path::new("/proj/src/reducer.js")),
            "./reducer"
        );
        assert_eq!(
            default_import_path(
                Path::new("/proj/src/store/state.js"),
                Path::new("/proj/src/App/reducer.js")
            ),
            "../App/reducer"
        );
        assert_eq!(
            default_import_path(
                Path::new("/proj/src/a/b/state.js"),
                Path::new("/proj/lib/reducer.mjs")
            ),
            "../../../lib/reducer"
        );
    }

    #[test]
    fn test_extensions() {
        let from = Path::new("/proj/src/state.js");
        assert_eq!(
            default_import_path(from, Path::new("/proj/src/App/reducer.jsx")),
            "./App/reducer"
        );
        // Unknown extensions are kept
        assert_eq!(
            default_import_path(from, Path::new("/proj/src/App/reducer.ts")),
            "./App/reducer.ts"
        );
        assert_eq!(
            import_path(from, Path::new("/proj/src/App/reducer.ts"), &[".ts"]),
            "./App/reducer"
        );
        // Only a trailing extension is removed
        assert_eq!(
            default_import_path(from, Path::new("/proj/src/App.js/reducer.es")),
            "./App.js/reducer.es"
        );
    }

    #[test]
    fn test_dot_directories_are_prefixed() {
        assert_eq!(
            default_import_path(
                Path::new("/proj/src/state.js"),
                Path::new("/proj/src/.generated/reducer.js")
            ),
            "./.generated/reducer"
        );
    }

    #[test]
    fn test_relative_inputs_are_normalized() {
        assert_eq!(
            default_import_path(Path::new("src/./state.js"), Path::new("src/x/../App/reducer.js")),
            "./App/reducer"
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../a/./b")), PathBuf::from("../a/b"));
    }

    #[test]
    fn test_is_relative() {
        assert!(is_relative("./App/reducer"));
        assert!(is_relative("../App/reducer"));
        assert!(!is_relative("redux"));
    }
}
