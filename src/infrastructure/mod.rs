//! 基础设施层：数据持久化与日志

pub mod json_storage;
pub mod logger;

pub use json_storage::{JsonStorage, StorageError};
pub use logger::Logger;
