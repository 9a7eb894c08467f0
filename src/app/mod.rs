//! 应用层：路由与产品管理

pub mod product;

use std::any::Any as PanicPayload;
use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::error;

use crate::core::{error::CoreError, middleware::request_logging_middleware};
use product::handler::{self, AppState};

/// 服务版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const PRODUCTS_PATH: &str = "/api/v1/products";

/// 构建完整路由：`/api/v1/products` 下的 CRUD 接口、根路由、健康检查与 404 兜底
///
/// 产品路由同时接受带结尾斜杠的路径，如 `/api/v1/products/`
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let collection: MethodRouter<AppState> =
        get(handler::get_all_products).post(handler::create_product);
    let item: MethodRouter<AppState> = get(handler::get_product)
        .put(handler::update_product)
        .delete(handler::delete_product);

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health_check))
        .route(PRODUCTS_PATH, collection.clone())
        .route(&format!("{PRODUCTS_PATH}/"), collection)
        .route(&format!("{PRODUCTS_PATH}/:id"), item.clone())
        .route(&format!("{PRODUCTS_PATH}/:id/"), item)
        .fallback(endpoint_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(TimeoutLayer::new(request_timeout))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// API 信息
async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Product API is running",
        "version": VERSION,
    }))
}

/// 健康检查
async fn health_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>, CoreError> {
    let products_count = state.product_service.product_count().await?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": VERSION,
        "storage": {
            "type": "json-file",
            "products_count": products_count,
        },
    })))
}

async fn endpoint_not_found() -> CoreError {
    CoreError::NotFound("Endpoint not found".to_string())
}

/// 处理器 panic 时返回统一的 500 错误体
fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "未知 panic".to_string()
    };
    error!("请求处理发生 panic: {}", detail);

    CoreError::InternalServerError("服务内部错误".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_panic_response_is_internal_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = panic_response(Box::new(String::from("boom")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_recovered() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        async fn explode() -> &'static str {
            panic!("boom")
        }

        let app = Router::new()
            .route("/explode", get(explode))
            .layer(CatchPanicLayer::custom(panic_response));

        let request = Request::builder().uri("/explode").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
