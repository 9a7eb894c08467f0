//! JSON 文件存储基础设施
//!
//! 全部产品与 ID 计数器保存在同一个 JSON 文档中。读操作持有读锁，
//! 写操作在写锁内完成内存修改与整文件重写，写盘失败时回滚内存修改。

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::app::product::model::{Product, ProductInput};

/// 存储错误类型
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 启动时数据文件无法读取或格式错误
    #[error("存储初始化失败 ({path}): {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("产品 {0} 不存在")]
    NotFound(u64),
    /// 变更已回滚，内存与磁盘保持一致
    #[error("数据持久化失败 ({path}): {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// 计数器已到达 `u64::MAX`，无法再分配新 ID
    #[error("产品 ID 已耗尽")]
    IdExhausted,
}

/// 磁盘文件格式：`{"products": {"1": {...}}, "next_id": 2}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    products: BTreeMap<u64, Product>,
    #[serde(default = "first_id")]
    next_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            products: BTreeMap::new(),
            next_id: first_id(),
        }
    }
}

impl StoreState {
    /// 以映射键为准修正产品 ID，并保证计数器大于所有已存在的 ID
    fn normalized(mut self) -> io::Result<Self> {
        for (id, product) in self.products.iter_mut() {
            product.id = *id;
        }

        let min_next = match self.products.keys().next_back() {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("产品 ID {} 之后无法再分配新 ID", max),
                )
            })?,
            None => first_id(),
        };
        if self.next_id < min_next {
            warn!(
                "数据文件中的 next_id={} 不大于已有 ID，调整为 {}",
                self.next_id, min_next
            );
            self.next_id = min_next;
        }

        Ok(self)
    }
}

/// 基于 JSON 文件的产品存储
#[derive(Debug)]
pub struct JsonStorage {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonStorage {
    /// 从数据文件构造存储；文件不存在时返回空存储
    pub fn initialize(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let state = match fs::read(&path) {
            Ok(bytes) => {
                let state = serde_json::from_slice::<StoreState>(&bytes)
                    .map_err(io::Error::from)
                    .and_then(StoreState::normalized)
                    .map_err(|source| StorageError::Init {
                        path: path.clone(),
                        source,
                    })?;
                info!(
                    "从 {} 加载了 {} 个产品，next_id={}",
                    path.display(),
                    state.products.len(),
                    state.next_id
                );
                state
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("数据文件 {} 不存在，使用空存储", path.display());
                StoreState::default()
            }
            Err(source) => return Err(StorageError::Init { path, source }),
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 返回所有产品的快照，按 ID 升序
    pub fn list_all(&self) -> Vec<Product> {
        self.state.read().products.values().cloned().collect()
    }

    pub fn get_by_id(&self, id: u64) -> Option<Product> {
        self.state.read().products.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 下一个将被分配的 ID
    pub fn next_id(&self) -> u64 {
        self.state.read().next_id
    }

    /// 分配新 ID 并写入产品
    pub fn create(&self, input: ProductInput) -> Result<Product, StorageError> {
        let mut state = self.state.write();

        let id = state.next_id;
        let next_id = id.checked_add(1).ok_or(StorageError::IdExhausted)?;
        let now = Utc::now();
        let product = Product {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            created_at: now,
            updated_at: now,
        };

        state.products.insert(id, product.clone());
        state.next_id = next_id;

        if let Err(e) = self.persist(&state) {
            state.products.remove(&id);
            state.next_id = id;
            return Err(e);
        }

        Ok(product)
    }

    /// 替换可变字段，保留 `created_at`
    pub fn update(&self, id: u64, input: ProductInput) -> Result<Product, StorageError> {
        let mut state = self.state.write();

        let previous = state
            .products
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))?;

        let updated = Product {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            created_at: previous.created_at,
            updated_at: Utc::now(),
        };
        state.products.insert(id, updated.clone());

        if let Err(e) = self.persist(&state) {
            state.products.insert(id, previous);
            return Err(e);
        }

        Ok(updated)
    }

    /// 删除产品并返回被删除的记录，ID 不会被复用
    pub fn delete(&self, id: u64) -> Result<Product, StorageError> {
        let mut state = self.state.write();

        let removed = state
            .products
            .remove(&id)
            .ok_or(StorageError::NotFound(id))?;

        if let Err(e) = self.persist(&state) {
            state.products.insert(id, removed);
            return Err(e);
        }

        Ok(removed)
    }

    /// 调用方必须持有写锁
    fn persist(&self, state: &StoreState) -> Result<(), StorageError> {
        let persistence_error = |source: io::Error| StorageError::Persistence {
            path: self.path.clone(),
            source,
        };

        let bytes = serde_json::to_vec_pretty(state).map_err(|e| persistence_error(e.into()))?;
        write_atomically(&self.path, &bytes).map_err(persistence_error)?;

        debug!(
            "已写入 {} 个产品到 {} ({} 字节)",
            state.products.len(),
            self.path.display(),
            bytes.len()
        );
        Ok(())
    }
}

/// 先写入 `<file>.tmp` 并同步到磁盘，再重命名覆盖目标文件
fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);

    let result = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("products.json"));
    name.push(".tmp");
    path.with_file_name(name)
}
