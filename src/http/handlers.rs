//! Request dispatch.
//!
//! | Method | Behaviour |
//! |---|---|
//! | GET | stream the store document as `text/plain` |
//! | POST | decode the body, append-if-absent, confirmation HTML |
//! | other | 405 with `Allow: GET, POST` |

use std::io;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Method, Request},
    response::{IntoResponse, Response},
};
use futures_util::stream::{self, Stream};
use tokio::{fs::File, io::AsyncReadExt};

use crate::http::decode::decode_submission;
use crate::http::error::ApiError;
use crate::http::request::{remote_addr, request_id};
use crate::http::response::{confirmation_page, TEXT_HTML, TEXT_PLAIN};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::Record;

const CHUNK_SIZE: usize = 8 * 1024;

/// Single entry point for every path.
pub async fn submission_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(&request);

    tracing::info!(
        request_id = %request_id,
        remote_addr = %remote_addr(&request),
        method = %method,
        "Requested"
    );

    let response = match method {
        Method::GET => serve_document(&state).await,
        Method::POST => register_submission(&state, request.into_body()).await,
        _ => Err(ApiError::MethodNotAllowed(method.clone())),
    }
    .into_response();

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

/// Stream the document as it is on disk right now.
async fn serve_document(state: &AppState) -> Result<Response, ApiError> {
    let path = state.store.document_path();
    let file = File::open(path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to open store document");
        ApiError::DocumentUnavailable(e)
    })?;

    Ok((
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        Body::from_stream(file_chunks(file)),
    )
        .into_response())
}

/// Read `file` lazily so a slow client paces the reads.
fn file_chunks(file: File) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    stream::unfold(Some(file), |file| async move {
        let Some(mut file) = file else {
            return None;
        };
        let mut buf = vec![0u8; CHUNK_SIZE];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(Bytes::from(buf)), Some(file)))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed while streaming store document");
                Some((Err(e), None))
            }
        }
    })
}

async fn register_submission(state: &AppState, body: Body) -> Result<Response, ApiError> {
    let raw = axum::body::to_bytes(body, usize::MAX).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read submission body");
        ApiError::BodyRead(e)
    })?;

    let decoded = decode_submission(&raw).map_err(|e| {
        tracing::warn!(error = %e, bytes = raw.len(), "Rejected undecodable submission");
        e
    })?;

    let store = Arc::clone(&state.store);
    let key = decoded.clone();
    let outcome =
        tokio::task::spawn_blocking(move || store.append_if_absent(&key, Record::new(key.clone())))
            .await?;

    let inserted = match outcome {
        Ok(inserted) => inserted,
        Err(e) => {
            tracing::error!(decoded = %decoded, error = %e, "Failed to persist submission");
            return Err(e.into());
        }
    };

    metrics::record_submission(inserted);
    tracing::info!(decoded = %decoded, inserted, "Score registered");

    Ok((
        [(header::CONTENT_TYPE, TEXT_HTML)],
        confirmation_page(&decoded, state.escape_html),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, StoreConfig};
    use crate::http::server::build_router;
    use crate::store::RecordStore;
    use axum::http::StatusCode;
    use std::collections::BTreeMap;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Fixture {
        _dir: TempDir,
        config: ServerConfig,
        store: Arc<RecordStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let mut config = ServerConfig::default();
            config.store = StoreConfig {
                path: dir.path().join("database.json").to_string_lossy().into_owned(),
                ..StoreConfig::default()
            };
            let store = Arc::new(RecordStore::open(&config.store).unwrap());
            Self {
                _dir: dir,
                config,
                store,
            }
        }

        async fn send(&self, method: Method, path: &str, body: &'static str) -> (StatusCode, Response) {
            let app = build_router(
                &self.config,
                AppState {
                    store: Arc::clone(&self.store),
                    escape_html: self.config.response.escape_html,
                },
            );
            let request = Request::builder()
                .method(method)
                .uri(path)
                .header(header::CONTENT_LENGTH, body.len())
                .body(Body::from(body))
                .unwrap();
            let response = app.oneshot(request).await.unwrap();
            (response.status(), response)
        }

        fn disk(&self) -> BTreeMap<String, String> {
            let content = std::fs::read_to_string(self.store.document_path()).unwrap();
            serde_json::from_str(&content).unwrap()
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_post_new_key() {
        let fx = Fixture::new();
        let (status, response) = fx.send(Method::POST, "/", "alice:100").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_HTML);
        assert!(body_text(response).await.contains("alice:100が登録されました"));
        assert_eq!(fx.disk().len(), 1);
        assert!(fx.disk().contains_key("alice:100"));
    }

    #[tokio::test]
    async fn test_post_duplicate_still_confirms() {
        let fx = Fixture::new();
        fx.send(Method::POST, "/", "alice:100").await;
        let (status, response) = fx.send(Method::POST, "/anything", "alice:100").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body_text(response).await.contains("alice:100が登録されました"));
        assert_eq!(fx.disk().len(), 1);
    }

    #[tokio::test]
    async fn test_post_decodes_percent_escapes() {
        let fx = Fixture::new();
        let (_, response) = fx.send(Method::POST, "/", "%E3%81%82").await;

        assert!(body_text(response).await.contains("<h1>あが登録されました</h1>"));
        assert!(fx.store.contains("あ"));
    }

    #[tokio::test]
    async fn test_post_malformed_body_is_rejected() {
        let fx = Fixture::new();
        let (status, response) = fx.send(Method::POST, "/", "100%").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("malformed percent escape"));
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn test_get_streams_document() {
        let fx = Fixture::new();
        fx.send(Method::POST, "/", "bob:80").await;

        let (status, response) = fx.send(Method::GET, "/scores", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
        assert_eq!(
            body_text(response).await,
            std::fs::read_to_string(fx.store.document_path()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_get_reads_disk_not_memory() {
        let fx = Fixture::new();
        std::fs::write(fx.store.document_path(), "{\"external\": \"external\"}").unwrap();

        let (_, response) = fx.send(Method::GET, "/", "").await;
        assert_eq!(body_text(response).await, "{\"external\": \"external\"}");
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn test_get_large_document_in_chunks() {
        let fx = Fixture::new();
        let large = format!("{{\"k\": \"{}\"}}", "x".repeat(CHUNK_SIZE * 3 + 17));
        std::fs::write(fx.store.document_path(), &large).unwrap();

        let (_, response) = fx.send(Method::GET, "/", "").await;
        assert_eq!(body_text(response).await, large);
    }

    #[tokio::test]
    async fn test_get_missing_document_is_server_error() {
        let fx = Fixture::new();
        std::fs::remove_file(fx.store.document_path()).unwrap();

        let (status, _) = fx.send(Method::GET, "/", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_other_methods_not_allowed() {
        let fx = Fixture::new();
        for method in [Method::PUT, Method::DELETE, Method::PATCH] {
            let (status, response) = fx.send(method, "/", "alice:100").await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers()[header::ALLOW], "GET, POST");
        }
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let mut fx = Fixture::new();
        fx.config.limits.max_body_size = 4;
        let (status, _) = fx.send(Method::POST, "/", "alice:100").await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn test_verbatim_html_mode() {
        let mut fx = Fixture::new();
        fx.config.response.escape_html = false;
        let (_, response) = fx.send(Method::POST, "/", "%3Cb%3Ehi%3C%2Fb%3E").await;

        assert!(body_text(response).await.contains("<h1><b>hi</b>が登録されました</h1>"));
    }

    #[tokio::test]
    async fn test_escaped_html_mode() {
        let fx = Fixture::new();
        let (_, response) = fx.send(Method::POST, "/", "%3Cb%3Ehi%3C%2Fb%3E").await;

        assert!(body_text(response)
            .await
            .contains("<h1>&lt;b&gt;hi&lt;/b&gt;が登録されました</h1>"));
        assert!(fx.store.contains("<b>hi</b>"));
    }

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let fx = Fixture::new();
        let (_, response) = fx.send(Method::GET, "/", "").await;
        assert!(response.headers().contains_key(crate::http::X_REQUEST_ID));
    }
}
