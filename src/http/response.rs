//! Response handling.
//!
//! # Responsibilities
//! - Turn a resolved path into a file response
//! - Serve the index file for directories
//! - Map resolution failures to HTTP status codes
//!
//! # Design Decisions
//! - Streaming, ranges and MIME types are delegated to `tower_http::services::ServeFile`
//! - No directory listings: a directory without an index file is 404
//! - Forbidden/NotFound/BadRequest are ordinary outcomes, not logged as errors

use std::path::Path;

use axum::{
    body::Body,
    http::{request::Parts, Request, StatusCode},
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Transport-level outcome of a request that did not produce a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ServeError {
    /// The resolved path escapes the root.
    #[error("Forbidden")]
    Forbidden,
    /// The resolved path does not exist.
    #[error("Not Found")]
    NotFound,
    /// The resolved path is neither a file nor a directory.
    #[error("Bad Request")]
    BadRequest,
    /// A predicate or producer failed.
    #[error("Internal Server Error")]
    Internal,
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::Forbidden => StatusCode::FORBIDDEN,
            ServeError::NotFound => StatusCode::NOT_FOUND,
            ServeError::BadRequest => StatusCode::BAD_REQUEST,
            ServeError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Serve `path`: files directly, directories through `index_file`.
pub async fn serve_path(path: &Path, index_file: &str, head: &Parts) -> Result<Response, ServeError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|_| ServeError::NotFound)?;

    if metadata.is_file() {
        return Ok(stream_file(path, head).await);
    }

    if metadata.is_dir() {
        let index = path.join(index_file);
        return match tokio::fs::metadata(&index).await {
            Ok(m) if m.is_file() => Ok(stream_file(&index, head).await),
            _ => Err(ServeError::NotFound),
        };
    }

    Err(ServeError::BadRequest)
}

/// Stream one file, honoring conditional and range headers of `head`.
async fn stream_file(path: &Path, head: &Parts) -> Response {
    let mut request = Request::builder()
        .method(head.method.clone())
        .uri(head.uri.clone())
        .version(head.version);
    if let Some(headers) = request.headers_mut() {
        headers.extend(head.headers.clone());
    }
    let request = match request.body(Body::empty()) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "Failed to rebuild request for file streaming");
            return ServeError::Internal.into_response();
        }
    };

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(infallible) => match infallible {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn head(method: &str) -> Parts {
        Request::builder()
            .method(method)
            .uri("/whatever")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServeError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ServeError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ServeError::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServeError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServeError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_serves_file_and_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "<p>hi</p>").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "docs").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        let file = serve_path(&dir.path().join("page.html"), "index.html", &head("GET"))
            .await
            .unwrap();
        assert_eq!(file.status(), StatusCode::OK);
        assert_eq!(file.headers()[header::CONTENT_TYPE], "text/html");

        let index = serve_path(&dir.path().join("docs"), "index.html", &head("GET"))
            .await
            .unwrap();
        assert_eq!(index.status(), StatusCode::OK);

        let empty = serve_path(&dir.path().join("empty"), "index.html", &head("GET")).await;
        assert_eq!(empty.unwrap_err(), ServeError::NotFound);

        let missing = serve_path(&dir.path().join("nope"), "index.html", &head("GET")).await;
        assert_eq!(missing.unwrap_err(), ServeError::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_special_file_is_bad_request() {
        let result = serve_path(Path::new("/dev/null"), "index.html", &head("GET")).await;
        assert_eq!(result.unwrap_err(), ServeError::BadRequest);
    }
}
