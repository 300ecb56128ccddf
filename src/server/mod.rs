// src/server/mod.rs

use serde::{Deserialize, Serialize};
use std::{convert::Infallible, path::PathBuf, sync::Arc, time::Instant};
use thiserror::Error;
use tracing::{error, info, warn};
use warp::{
    http::StatusCode,
    reject::{MethodNotAllowed, PayloadTooLarge, Rejection},
    reply::{self, Reply, Response},
    Filter,
};

use crate::fetch::{FetchError, PalletFetcher};

/// Largest request body accepted on the API.
const MAX_BODY_BYTES: u64 = 16 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletRequest {
    pub pallet_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Errors surfaced by the API. All map to a `{ message }` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Fetch(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        error_reply(self.status(), self.to_string())
    }
}

fn error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        message: message.into(),
    };
    reply::with_status(reply::json(&body), status).into_response()
}

async fn pallet_handler(
    req: PalletRequest,
    fetcher: Arc<PalletFetcher>,
) -> Result<Response, Infallible> {
    let start = Instant::now();

    match fetcher.fetch_pallet(&req.pallet_id).await.map_err(ApiError::from) {
        Ok(result) => {
            info!(
                pallet_id = %req.pallet_id,
                rows = result.rows.len(),
                elapsed = ?start.elapsed(),
                "pallet extracted"
            );
            Ok(reply::json(&result).into_response())
        }
        Err(e) => {
            warn!(pallet_id = %req.pallet_id, error = %e, "pallet request failed");
            Ok(e.into_response())
        }
    }
}

async fn health_check() -> Result<impl Reply, Infallible> {
    Ok(reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "palletscraper"
    })))
}

/// Turn warp's own rejections into `{ message }` bodies.
async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, e.to_string()));
    }
    if err.find::<PayloadTooLarge>().is_some() {
        return Ok(error_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            "request body too large",
        ));
    }
    if let Some(e) = err.find::<warp::cors::CorsForbidden>() {
        return Ok(error_reply(StatusCode::FORBIDDEN, e.to_string()));
    }
    if err.find::<MethodNotAllowed>().is_some() {
        return Ok(error_reply(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"));
    }
    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "not found"));
    }
    error!(?err, "unhandled rejection");
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error",
    ))
}

/// All routes: `POST /api/pallet`, `GET /health`, and the static UI.
pub fn routes(
    fetcher: Arc<PalletFetcher>,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let with_fetcher = warp::any().map(move || Arc::clone(&fetcher));

    let pallet = warp::path!("api" / "pallet")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_fetcher)
        .and_then(pallet_handler);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let assets = warp::fs::dir(static_dir);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST"])
        .allow_headers(vec!["content-type"]);

    health
        .or(pallet)
        .or(assets)
        .with(cors)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::upstream;
    use crate::process::ExtractionResult;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    const PAGE: &str = r#"<html><body><table class="data">
        <tr class="header"><td>Height</td><td>Width</td><td>Length</td><td>Pallet</td></tr>
        <tr><td>5'</td><td>4'</td><td>10'</td><td>2</td></tr>
        <tr><td>4'6"</td><td>40"</td><td>48</td><td>1</td></tr>
    </table></body></html>"#;

    fn fetcher_for(addr: std::net::SocketAddr, timeout_ms: u64) -> Arc<PalletFetcher> {
        Arc::new(PalletFetcher::new(&upstream::config_for(addr, timeout_ms)).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let addr = upstream::silent().await;
        let api = routes(fetcher_for(addr, 200), "does-not-exist".into());
        let resp = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_pallet_success() {
        let (addr, _heads) = upstream::serve("200 OK", PAGE).await;
        let api = routes(fetcher_for(addr, 2000), "does-not-exist".into());

        let resp = warp::test::request()
            .method("POST")
            .path("/api/pallet")
            .json(&json!({ "palletId": "12345" }))
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let result: ExtractionResult = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(result.labels, vec!["Height", "Width", "Length", "Pallet"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1]["height"], Some(54));
        assert_eq!(result.rows[1]["width"], Some(40));
        assert_eq!(result.rows[1]["length"], Some(48));
    }

    #[tokio::test]
    async fn test_page_without_table_is_empty_ok() {
        let (addr, _heads) = upstream::serve("200 OK", "<html>Please log in</html>").await;
        let api = routes(fetcher_for(addr, 2000), "does-not-exist".into());

        let resp = warp::test::request()
            .method("POST")
            .path("/api/pallet")
            .json(&json!({ "palletId": "1001" }))
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body, json!({"labels": [], "keys": [], "rows": []}));
    }

    #[tokio::test]
    async fn test_upstream_timeout_is_400() {
        let addr = upstream::silent().await;
        let api = routes(fetcher_for(addr, 200), "does-not-exist".into());

        let start = std::time::Instant::now();
        let resp = warp::test::request()
            .method("POST")
            .path("/api/pallet")
            .json(&json!({ "palletId": "1001" }))
            .reply(&api)
            .await;
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorBody = serde_json::from_slice(resp.body()).unwrap();
        assert!(!body.message.is_empty());
        assert!(body.message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_400() {
        let (addr, _heads) = upstream::serve("404 Not Found", "gone").await;
        let api = routes(fetcher_for(addr, 2000), "does-not-exist".into());

        let resp = warp::test::request()
            .method("POST")
            .path("/api/pallet")
            .json(&json!({ "palletId": "1001" }))
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_slice(resp.body()).unwrap();
        assert!(body.message.contains("404"));
    }

    #[tokio::test]
    async fn test_invalid_pallet_id() {
        let (addr, mut heads) = upstream::serve("200 OK", PAGE).await;
        let api = routes(fetcher_for(addr, 2000), "does-not-exist".into());

        let resp = warp::test::request()
            .method("POST")
            .path("/api/pallet")
            .json(&json!({ "palletId": "12&_cmd=delete" }))
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_slice(resp.body()).unwrap();
        assert!(body.message.contains("pallet id"));
        // nothing reached upstream
        assert!(heads.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let addr = upstream::silent().await;
        let api = routes(fetcher_for(addr, 200), "does-not-exist".into());

        let resp = warp::test::request()
            .method("POST")
            .path("/api/pallet")
            .header("content-type", "application/json")
            .body("{\"id\": 5}")
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_slice(resp.body()).unwrap();
        assert!(!body.message.is_empty());
    }

    #[tokio::test]
    async fn test_static_assets() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Pallets</h1>").unwrap();
        let addr = upstream::silent().await;
        let api = routes(fetcher_for(addr, 200), dir.path().to_path_buf());

        let resp = warp::test::request()
            .method("GET")
            .path("/index.html")
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body().as_ref(), b"<h1>Pallets</h1>");

        let missing = warp::test::request()
            .method("GET")
            .path("/nope.js")
            .reply(&api)
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
