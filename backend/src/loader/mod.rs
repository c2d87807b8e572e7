//! Dataset loader: download bytes over HTTP and parse them as CSV.

use std::time::Duration;

use crate::error::{LoadError, LoadResult};
use crate::parser::{parse_bytes_auto, ParseResult};

/// Bytes inspected when sniffing for an HTML page.
const SNIFF_LEN: usize = 512;

/// GET `url` and return the body.
///
/// Non-2xx statuses, timeouts and HTML bodies (Drive answers with an HTML page
/// for private files and large-file warnings) are errors.
pub async fn fetch_bytes(url: &str, timeout_secs: u64) -> LoadResult<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LoadError::Http(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| request_error(e, timeout_secs))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| request_error(e, timeout_secs))?;

    if content_type.starts_with("text/html") || looks_like_html(&bytes) {
        return Err(LoadError::NotCsv(
            "received an HTML page; check that the file is shared publicly".to_string(),
        ));
    }

    Ok(bytes.to_vec())
}

/// Download and parse a CSV dataset.
pub async fn load_dataset(
    url: &str,
    delimiter: Option<char>,
    timeout_secs: u64,
) -> LoadResult<ParseResult> {
    let bytes = fetch_bytes(url, timeout_secs).await?;
    Ok(parse_bytes_auto(&bytes, delimiter)?)
}

fn request_error(e: reqwest::Error, timeout_secs: u64) -> LoadError {
    if e.is_timeout() {
        LoadError::Timeout(timeout_secs)
    } else {
        LoadError::Http(e.to_string())
    }
}

fn looks_like_html(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_LEN)]);
    let head = head.trim_start().to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::header, http::StatusCode, response::Html, routing::get, Router};

    async fn spawn_server() -> String {
        let app = Router::new()
            .route(
                "/data.csv",
                get(|| async { ([(header::CONTENT_TYPE, "text/csv")], "a,b\n1,\n2,3\n") }),
            )
            .route("/gone", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/page",
                get(|| async { Html("<!DOCTYPE html><html><body>Sign in</body></html>") }),
            )
            .route(
                "/sneaky",
                get(|| async { ([(header::CONTENT_TYPE, "application/octet-stream")], "  <html></html>") }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "a\n1\n"
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_load_csv() {
        let base = spawn_server().await;
        let result = load_dataset(&format!("{}/data.csv", base), None, 5).await.unwrap();

        assert_eq!(result.dataset.row_count(), 2);
        assert_eq!(result.dataset.column("b").unwrap().missing_count(), 1);
    }

    #[tokio::test]
    async fn test_status_error() {
        let base = spawn_server().await;
        let err = fetch_bytes(&format!("{}/gone", base), 5).await.unwrap_err();
        assert!(matches!(err, LoadError::Status(404)));
    }

    #[tokio::test]
    async fn test_html_rejected() {
        let base = spawn_server().await;

        let err = fetch_bytes(&format!("{}/page", base), 5).await.unwrap_err();
        assert!(matches!(err, LoadError::NotCsv(_)));

        let err = fetch_bytes(&format!("{}/sneaky", base), 5).await.unwrap_err();
        assert!(matches!(err, LoadError::NotCsv(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let base = spawn_server().await;
        let err = fetch_bytes(&format!("{}/slow", base), 1).await.unwrap_err();
        assert!(matches!(err, LoadError::Timeout(1)));
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html(b"\n<!DOCTYPE HTML>"));
        assert!(!looks_like_html(b"a,b\n1,2"));
    }
}
