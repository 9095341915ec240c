use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::cache::store::{SharedStore, StoreError};

/// Values are JSON. A miss is always key absence: `put` refuses to store a
/// JSON `null`, so "not found" can never be cached as a value.
#[derive(Clone)]
pub struct KeyValueCache {
    store: Arc<dyn SharedStore>,
}

impl KeyValueCache {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store }
    }

    /// 读取原始字节
    pub async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.store.get(key).await
    }

    /// 写入原始字节，空值不写入
    pub async fn put_bytes(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<bool, StoreError> {
        if value.is_empty() || value == b"null" {
            return Ok(false);
        }
        self.store.set_ex(key, value, ttl).await?;
        Ok(true)
    }

    /// 读取并反序列化
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_bytes(key).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// 序列化并写入；返回是否真正写入
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> Result<bool, StoreError> {
        let json = serde_json::to_vec(value)?;
        self.put_bytes(key, json, ttl).await
    }

    /// 按前缀批量删除
    pub async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, StoreError> {
        self.store.delete_by_prefix(prefix).await
    }
}
