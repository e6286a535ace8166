//! 載具清單的短效快取。
//!
//! 以查詢條件的標準序列化為鍵，寫入即取代舊項目。過期只在讀取時檢查，
//! 不主動清除。本層不合併同時進行的相同請求，後寫入者勝出。

use crate::domain::model::{Container, ContainerPage};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    page: ContainerPage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup {
    pub page: ContainerPage,
    pub is_fresh: bool,
}

#[derive(Debug)]
pub struct BoundedCache {
    freshness: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl Default for BoundedCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}

impl BoundedCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            freshness,
            entries: HashMap::new(),
        }
    }

    /// 未命中回傳 None；過期項目仍會回傳，但 `is_fresh` 為 false
    pub fn get(&self, signature: &str) -> Option<CacheLookup> {
        self.entries.get(signature).map(|entry| CacheLookup {
            page: entry.page.clone(),
            is_fresh: entry.stored_at.elapsed() < self.freshness,
        })
    }

    pub fn insert(&mut self, signature: impl Into<String>, page: ContainerPage) {
        self.entries.insert(
            signature.into(),
            CacheEntry {
                stored_at: Instant::now(),
                page,
            },
        );
    }

    /// 在仍新鮮的項目裡找指定載具
    pub fn find_fresh_container(&self, container_id: i64) -> Option<Container> {
        self.entries
            .values()
            .filter(|entry| entry.stored_at.elapsed() < self.freshness)
            .flat_map(|entry| entry.page.items.iter())
            .find(|container| container.id == container_id)
            .cloned()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
