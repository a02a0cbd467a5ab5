//! Shared path manipulation utilities.

use std::cmp::Ordering;
use std::env;
use std::path::{Component, Path, PathBuf};

/// Resolve a path to an absolute, normalized path.
///
/// If `fs::canonicalize` succeeds (path exists), it is used to resolve symlinks
/// and normalize components.
///
/// If it fails (e.g. path does not exist), the path is made absolute relative
/// to CWD and `..`/`.` components are resolved syntactically.
pub fn resolve_absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    if let Ok(canonical) = std::fs::canonicalize(&absolute) {
        return canonical;
    }

    normalize_syntactic(&absolute)
}

/// Render `path` relative to `root` as a `/`-separated string.
///
/// Returns `None` when `path` is not under `root` or is `root` itself.
/// Non-UTF-8 components are converted lossily.
pub fn relative_artifact_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Order two `/`-separated artifact names one path component at a time.
///
/// `a/x` sorts before `a-b/x` because the first components compare as
/// `a` < `a-b`, whereas a plain string compare would put `-` before `/`.
#[must_use]
pub fn compare_artifact_names(a: &str, b: &str) -> Ordering {
    a.split('/').cmp(b.split('/'))
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_existing_path_canonically() {
        let cwd = env::current_dir().unwrap();
        let resolved = resolve_absolute_path(Path::new("."));
        assert_eq!(resolved, std::fs::canonicalize(&cwd).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn normalizes_missing_artifacts_dir_syntactically() {
        let input = Path::new("/nonexistent-dist/./build/../dist");
        assert!(std::fs::canonicalize(input).is_err());
        assert_eq!(
            resolve_absolute_path(input),
            Path::new("/nonexistent-dist/dist")
        );
    }

    #[test]
    fn artifact_names_compare_by_component() {
        assert_eq!(compare_artifact_names("a/x", "a-b/x"), Ordering::Less);
        assert_eq!(compare_artifact_names("a/x", "a.bin"), Ordering::Less);
        assert_eq!(compare_artifact_names("C.txt", "a.bin"), Ordering::Less);
        assert_eq!(compare_artifact_names("b/z.bin", "b/z.bin"), Ordering::Equal);
        assert_eq!(compare_artifact_names("linux/app", "linux"), Ordering::Greater);
    }

    #[test]
    fn relative_name_uses_forward_slashes() {
        let root = Path::new("dist");
        let nested = root.join("linux").join("x86_64").join("app.tar.gz");
        assert_eq!(
            relative_artifact_name(root, &nested).as_deref(),
            Some("linux/x86_64/app.tar.gz")
        );
    }

    #[test]
    fn relative_name_rejects_root_and_outsiders() {
        let root = Path::new("dist");
        assert_eq!(relative_artifact_name(root, root), None);
        assert_eq!(relative_artifact_name(root, Path::new("other/app.bin")), None);
    }
}
