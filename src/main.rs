use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use product_api::app::{self, product::handler::AppState, product::service::ProductService};
use product_api::config::load_config;
use product_api::infrastructure::{JsonStorage, Logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, source) = load_config().context("加载配置失败")?;

    Logger::init(&config.logging.level);
    match source {
        Some(path) => info!("从配置文件加载: {}", path.display()),
        None => info!("未找到配置文件，使用默认配置"),
    }

    // 数据文件损坏时终止启动
    let storage = match JsonStorage::initialize(&config.storage.path) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            error!("初始化存储失败: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "存储已就绪: {} ({} 个产品)",
        storage.path().display(),
        storage.len()
    );

    let state = AppState {
        product_service: ProductService::new(storage),
    };
    let app = app::router(state, config.http.timeout());

    let addr = config.http.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法绑定到 {}", addr))?;

    info!("🚀 Product API 运行在 http://{}", addr);
    info!("   GET    /api/v1/products      - 获取所有产品");
    info!("   POST   /api/v1/products      - 创建产品");
    info!("   GET    /api/v1/products/:id  - 获取产品");
    info!("   PUT    /api/v1/products/:id  - 更新产品");
    info!("   DELETE /api/v1/products/:id  - 删除产品");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务器运行失败")?;

    info!("服务器已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("监听退出信号失败: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到退出信号，正在关闭...");
}
