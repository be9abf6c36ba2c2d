//! File read/write handlers rooted at the configured directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::http::{ContextError, RequestContext, Response, Status};

/// Shared handle to the serving directory. Cheap to clone per request.
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    root: Option<Arc<PathBuf>>,
}

impl FileStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root: root.map(Arc::new),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref().map(PathBuf::as_path)
    }

    /// `GET /files/{filename}`.
    pub async fn read(&self, ctx: RequestContext) -> Response {
        let path = match self.resolve(&ctx) {
            Ok(path) => path,
            Err(response) => return response,
        };

        match tokio::fs::read(&path).await {
            Ok(data) => Response::octet_stream(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Response::not_found(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read file");
                Response::internal_error()
            }
        }
    }

    /// `POST /files/{filename}` stores the request body.
    pub async fn write(&self, ctx: RequestContext) -> Response {
        let path = match self.resolve(&ctx) {
            Ok(path) => path,
            Err(response) => return response,
        };
        let body = match ctx.request_body() {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "File upload without a body");
                return Response::bad_request();
            }
        };

        match tokio::fs::write(&path, body).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), bytes = body.len(), "File written");
                Response::empty(Status::Created)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to write file");
                Response::internal_error()
            }
        }
    }

    fn resolve(&self, ctx: &RequestContext) -> Result<PathBuf, Response> {
        let Some(root) = self.root() else {
            tracing::error!("File request received but no directory is configured");
            return Err(Response::internal_error());
        };
        let filename = ctx.param("filename").map_err(|e: ContextError| {
            tracing::error!(error = %e, "File handler registered without a filename param");
            Response::internal_error()
        })?;
        // Placeholders never contain '/', so only the dot entries can escape the root.
        if filename == "." || filename == ".." {
            return Err(Response::bad_request());
        }
        Ok(root.join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_for(filename: &str) -> RequestContext {
        let mut ctx = RequestContext::new();
        ctx.set_param("filename", filename);
        ctx
    }

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("foo"), b"Hello, World!").unwrap();
        let store = FileStore::new(Some(dir.path().to_path_buf()));

        let response = store.read(ctx_for("foo")).await;
        assert_eq!(response, Response::octet_stream(&b"Hello, World!"[..]));
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(Some(dir.path().to_path_buf()));
        assert_eq!(store.read(ctx_for("nope")).await.status(), Status::NotFound);
    }

    #[tokio::test]
    async fn writes_body_and_answers_created() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(Some(dir.path().to_path_buf()));

        let mut ctx = ctx_for("upload.bin");
        ctx.set_request_body(b"12345".to_vec());
        assert_eq!(store.write(ctx).await, Response::empty(Status::Created));
        assert_eq!(std::fs::read(dir.path().join("upload.bin")).unwrap(), b"12345");

        // No body recorded.
        assert_eq!(
            store.write(ctx_for("other")).await.status(),
            Status::BadRequest
        );
    }

    #[tokio::test]
    async fn unconfigured_directory_is_500() {
        let store = FileStore::new(None);
        assert_eq!(
            store.read(ctx_for("foo")).await.status(),
            Status::InternalServerError
        );
    }

    #[tokio::test]
    async fn dot_entries_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(Some(dir.path().to_path_buf()));
        assert_eq!(store.read(ctx_for("..")).await.status(), Status::BadRequest);
        assert_eq!(store.read(ctx_for(".")).await.status(), Status::BadRequest);
    }
}
