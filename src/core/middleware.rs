//! 核心中间件模块

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// 响应中携带的请求 ID 头
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 当前请求的 ID，仅在 `request_logging_middleware` 内部可用
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 请求日志中间件，为每个响应附加 `x-request-id`
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = REQUEST_ID.scope(request_id.clone(), next.run(req)).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }

    if status.is_server_error() {
        warn!("[{}] {} {} - {} - {}ms", request_id, method, uri, status, elapsed_ms);
    } else {
        info!("[{}] {} {} - {} - {}ms", request_id, method, uri, status, elapsed_ms);
    }

    response
}
