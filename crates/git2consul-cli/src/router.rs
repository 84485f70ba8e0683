//! Liveness endpoint
//!
//! Answers `GET /status` (and `GET /`) with `{"status": "ok"}` for as long as
//! the process is up. The answer does not depend on the state of the sync
//! loop.

use axum::{Json, Router, routing::get};
use git2consul_core::Endpoint;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::error::{CliError, Result};

#[derive(Debug, Serialize)]
struct Status {
    status: &'static str,
}

async fn status() -> Json<Status> {
    Json(Status { status: "ok" })
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(status))
        .route("/status", get(status))
}

/// Serve the liveness routes on `endpoint` until `shutdown` turns `true`.
pub async fn serve(endpoint: Endpoint, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let address = endpoint.to_string();
    let listener = TcpListener::bind(address.as_str())
        .await
        .map_err(|source| CliError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %address, "Liveness endpoint listening");

    axum::serve(listener, router())
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;
    tracing::debug!("Liveness endpoint stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, String, serde_json::Value) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn status_reports_ok() {
        let (status, content_type, body) = get_json("/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json");
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn root_reports_ok() {
        let (status, _, body) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        let server = tokio::spawn(serve(Endpoint::new("127.0.0.1", 0), rx));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.is_ok());
    }
}
