//! Mapping request paths onto the served directory.

use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

/// Document served for directory requests.
pub const INDEX: &str = "index.html";

/// Normalize a decoded request path into a path relative to the served root.
///
/// Returns `None` for paths that would leave the root (`..` past the top),
/// contain null bytes, or carry a platform prefix. The empty path (the root
/// itself) is valid and normalizes to an empty [`PathBuf`].
///
/// ```text
/// "/"                      -> ""
/// "/data/../index.html"    -> "index.html"
/// "/a//b/./c.js"           -> "a/b/c.js"
/// "/../etc/passwd"         -> None
/// ```
pub(crate) fn normalize(request: &str) -> Option<PathBuf> {
    let mut components = Vec::new();
    for component in Path::new(request).components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    return None;
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => return None,
            Component::ParentDir => {
                components.pop()?;
            },
        }
    }
    Some(components.into_iter().collect())
}

/// Resolve a request to a regular file under `root`, which must be canonical.
///
/// Directories resolve to their [`INDEX`] document. Symlinks are followed but
/// must end up inside `root`. Anything that does not end up at an existing
/// regular file yields `None`.
pub(crate) async fn locate(root: &Path, request: &str) -> Option<PathBuf> {
    let (candidate, metadata) = inside(root, &root.join(normalize(request)?)).await?;
    let (candidate, metadata) = match metadata.is_dir() {
        true => inside(root, &candidate.join(INDEX)).await?,
        false => (candidate, metadata),
    };
    metadata.is_file().then_some(candidate)
}

async fn inside(root: &Path, path: &Path) -> Option<(PathBuf, Metadata)> {
    let resolved = tokio::fs::canonicalize(path).await.ok()?;
    if !resolved.starts_with(root) {
        tracing::debug!(path = %path.display(), "Link leads outside the served root");
        return None;
    }
    let metadata = tokio::fs::metadata(&resolved).await.ok()?;
    Some((resolved, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(normalize("/index.html").unwrap(), Path::new("index.html"));
        assert_eq!(normalize("data/stations.json").unwrap(), Path::new("data/stations.json"));
        assert_eq!(normalize("/").unwrap(), Path::new(""));
        assert_eq!(normalize("").unwrap(), Path::new(""));
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(normalize("/a//b//c.js").unwrap(), Path::new("a/b/c.js"));
        assert_eq!(normalize("/a/./b/./c.js").unwrap(), Path::new("a/b/c.js"));
        assert_eq!(normalize("/data/../index.html").unwrap(), Path::new("index.html"));
        assert_eq!(normalize("/data/").unwrap(), Path::new("data"));
    }

    #[test]
    fn test_traversal_attempts() {
        assert!(normalize("/../etc/passwd").is_none());
        assert!(normalize("/a/../../b").is_none());
        assert!(normalize("..").is_none());
    }

    #[test]
    fn test_invalid_characters() {
        assert!(normalize("/a\0b").is_none());
    }

    #[tokio::test]
    async fn test_locate() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join(INDEX), "<html></html>").unwrap();
        std::fs::create_dir(root.join("empty")).unwrap();
        std::fs::create_dir(root.join("nested")).unwrap();
        std::fs::write(root.join("nested").join(INDEX), "<html></html>").unwrap();
        std::fs::write(root.join("app.js"), "").unwrap();

        assert_eq!(locate(&root, "/").await.unwrap(), root.join(INDEX));
        assert_eq!(locate(&root, "/nested/").await.unwrap(), root.join("nested").join(INDEX));
        assert_eq!(locate(&root, "/app.js").await.unwrap(), root.join("app.js"));
        assert!(locate(&root, "/empty/").await.is_none());
        assert!(locate(&root, "/missing.js").await.is_none());
        assert!(locate(&root, "/../outside").await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_links_stay_inside_root() {
        use std::os::unix::fs::symlink;

        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("data.json"), "[]").unwrap();
        symlink(outside.path().join("secret.txt"), root.join("secret.txt")).unwrap();
        symlink(outside.path(), root.join("elsewhere")).unwrap();
        symlink(root.join("data.json"), root.join("latest.json")).unwrap();

        assert!(locate(&root, "/secret.txt").await.is_none());
        assert!(locate(&root, "/elsewhere/secret.txt").await.is_none());
        assert_eq!(locate(&root, "/latest.json").await.unwrap(), root.join("data.json"));
    }
}
