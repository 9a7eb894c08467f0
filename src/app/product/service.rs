//! 产品业务服务
//!
//! 存储操作会在锁内同步写盘，统一放到 tokio 的阻塞线程池执行，异步工作线程不会被文件 I/O 占住。

use std::sync::Arc;

use tracing::{error, info};

use super::model::{Product, ProductInput};
use crate::core::error::CoreError;
use crate::infrastructure::json_storage::{JsonStorage, StorageError};

#[derive(Clone)]
pub struct ProductService {
    storage: Arc<JsonStorage>,
}

impl ProductService {
    pub fn new(storage: Arc<JsonStorage>) -> Self {
        Self { storage }
    }

    /// 在阻塞线程池中执行存储操作
    async fn blocking<T, F>(&self, op: F) -> Result<T, CoreError>
    where
        F: FnOnce(&JsonStorage) -> T + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || op(&storage))
            .await
            .map_err(|e| {
                error!("存储任务执行失败: {}", e);
                CoreError::InternalServerError("服务内部错误".to_string())
            })
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        self.blocking(|storage| storage.list_all()).await
    }

    pub async fn get_product(&self, id: u64) -> Result<Product, CoreError> {
        self.blocking(move |storage| storage.get_by_id(id))
            .await?
            .ok_or_else(|| StorageError::NotFound(id).into())
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product, CoreError> {
        let product = self.blocking(move |storage| storage.create(input)).await??;
        info!("创建产品 id={} name={:?}", product.id, product.name);
        Ok(product)
    }

    pub async fn update_product(&self, id: u64, input: ProductInput) -> Result<Product, CoreError> {
        let product = self
            .blocking(move |storage| storage.update(id, input))
            .await??;
        info!("更新产品 id={}", product.id);
        Ok(product)
    }

    pub async fn delete_product(&self, id: u64) -> Result<(), CoreError> {
        let product = self.blocking(move |storage| storage.delete(id)).await??;
        info!("删除产品 id={} name={:?}", product.id, product.name);
        Ok(())
    }

    pub async fn product_count(&self) -> Result<usize, CoreError> {
        self.blocking(|storage| storage.len()).await
    }
}
