//! # Product API
//!
//! 基于 JSON 文件持久化的产品 CRUD 服务：
//! - `app`: 路由、处理器与产品服务
//! - `core`: 统一错误处理与请求日志中间件
//! - `infrastructure`: JSON 文件存储与日志初始化
//! - `config`: TOML 配置加载

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::product::model::{Product, ProductInput};
pub use infrastructure::json_storage::{JsonStorage, StorageError};
