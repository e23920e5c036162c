//! HTTP Middleware
//!
//! 传输层错误日志（4xx/5xx）。业务错误在 ApiError::into_response() 中记录。

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// HTTP 状态码错误日志中间件
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        // 多为请求体解析失败（JSON/multipart）或超出上传大小限制
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::DefaultBodyLimit,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Json, Router,
    };
    use tower::util::ServiceExt;

    async fn echo(Json(value): Json<serde_json::Value>) -> Json<serde_json::Value> {
        Json(value)
    }

    async fn failing() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn router() -> Router {
        Router::new()
            .route("/echo", post(echo))
            .route("/fail", post(failing))
            .layer(DefaultBodyLimit::max(64))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    fn json_request(uri: &str, body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let response = router()
            .oneshot(json_request("/echo", r#"{"book_code":"GEN"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body_is_client_error() {
        let response = router()
            .oneshot(json_request("/echo", "{not json"))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let body = format!(r#"{{"text":"{}"}}"#, "a".repeat(200));
        let response = router().oneshot(json_request("/echo", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_server_error_passes_through() {
        let response = router().oneshot(json_request("/fail", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
