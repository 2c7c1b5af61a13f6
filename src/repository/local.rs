//! File-backed pages from a book's working copy

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use once_cell::sync::OnceCell;

use super::pages::{DispatchHandle, DispatchProvider, PageHandler};
use crate::{
    error::{AppError, AppResult},
    models::{path::SEPARATOR, PathKey},
};

/// Source files below `root`, served under the `mount` path
pub struct WorkDirectory {
    mount: PathKey,
    root: PathBuf,
    canonical_root: OnceCell<PathBuf>,
}

impl WorkDirectory {
    pub fn new(mount: PathKey, root: impl Into<PathBuf>) -> Self {
        Self {
            mount: mount.normalize(),
            root: root.into(),
            canonical_root: OnceCell::new(),
        }
    }

    pub fn mount(&self) -> &PathKey {
        &self.mount
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn canonical_root(&self) -> io::Result<&Path> {
        if let Some(root) = self.canonical_root.get() {
            return Ok(root);
        }
        // Racing callers may both canonicalize; the first stored value wins.
        let root = tokio::fs::canonicalize(&self.root).await?;
        Ok(self.canonical_root.get_or_init(|| root).as_path())
    }

    /// Locate the source file for `path`, a path below the mount.
    ///
    /// Returns `Ok(None)` when `path` is outside the mount or no such file
    /// exists, and an authorization error when it resolves outside the
    /// working copy.
    pub async fn source_file(&self, path: &str) -> AppResult<Option<PathBuf>> {
        let Some(sub_path) = path.strip_prefix(self.mount.prefix()) else {
            return Ok(None);
        };
        if !sub_path.is_empty() && !sub_path.starts_with(SEPARATOR) {
            return Ok(None);
        }

        let sub_path = sub_path.trim_matches(SEPARATOR);
        let file = if sub_path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(sub_path)
        };

        let canonical = match tokio::fs::canonicalize(&file).await {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !canonical.starts_with(self.canonical_root().await?) {
            tracing::warn!("Rejected {} resolving outside {}", path, self.root.display());
            return Err(AppError::Authorization(format!(
                "{} is outside the work directory",
                path
            )));
        }

        match tokio::fs::metadata(&canonical).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(canonical)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DispatchProvider for WorkDirectory {
    fn scheme(&self) -> &'static str {
        "local"
    }

    async fn lookup(&self, path: &str) -> AppResult<Option<DispatchHandle>> {
        let file = self.source_file(path).await?;
        Ok(file.map(|file| DispatchHandle::new(Arc::new(SourceFile { file }))))
    }
}

/// Serves the raw bytes of one source file
struct SourceFile {
    file: PathBuf,
}

#[async_trait]
impl PageHandler for SourceFile {
    async fn handle(&self, _path: &str) -> AppResult<Response> {
        let bytes = tokio::fs::read(&self.file).await?;
        let content_type = if std::str::from_utf8(&bytes).is_ok() {
            "text/plain; charset=utf-8"
        } else {
            "application/octet-stream"
        };
        Ok(([(CONTENT_TYPE, content_type)], bytes).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("index.md"), "# Home").unwrap();
        fs::write(dir.path().join("guide/intro.md"), "# Intro").unwrap();
        dir
    }

    fn docs(dir: &tempfile::TempDir) -> WorkDirectory {
        WorkDirectory::new(PathKey::parse("/docs").unwrap(), dir.path())
    }

    #[tokio::test]
    async fn test_source_file_lookup() {
        let dir = fixture();
        let pages = docs(&dir);

        let found = pages.source_file("/docs/guide/intro.md").await.unwrap().unwrap();
        assert!(found.ends_with("guide/intro.md"));
        assert!(pages.source_file("/docs/index.md/").await.unwrap().is_some());

        assert!(pages.source_file("/docs/missing.md").await.unwrap().is_none());
        assert!(pages.source_file("/docs/guide").await.unwrap().is_none());
        assert!(pages.source_file("/docs").await.unwrap().is_none());
        assert!(pages.source_file("/docsets/index.md").await.unwrap().is_none());
        assert!(pages.source_file("/other/index.md").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_canonical_root_is_memoized() {
        let dir = fixture();
        let pages = docs(&dir);
        let expected = fs::canonicalize(dir.path()).unwrap();

        let first = pages.canonical_root().await.unwrap().to_path_buf();
        assert_eq!(first, expected);
        assert_eq!(pages.canonical_root().await.unwrap(), expected.as_path());

        let missing = WorkDirectory::new(PathKey::root(), dir.path().join("absent"));
        assert!(missing.canonical_root().await.is_err());
        assert!(missing.canonical_root.get().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_escape_is_rejected() {
        let dir = fixture();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "x").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("leak")).unwrap();
        let pages = docs(&dir);

        assert!(matches!(
            pages.source_file("/docs/leak/secret.txt").await,
            Err(AppError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_serves_raw_source() {
        let dir = fixture();
        let pages = docs(&dir);
        assert_eq!(pages.scheme(), "local");

        let handle = pages.lookup("/docs/index.md").await.unwrap().unwrap();
        let response = handle.invoke("/docs/index.md").await.unwrap();
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"# Home");

        assert!(pages.lookup("/docs/nope").await.unwrap().is_none());
    }
}
