//! In-memory staging store
//!
//! Same observable semantics as the Postgres repo: missing ids are
//! skipped, the batch is applied under one write lock.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{DbError, StagingStore};
use crate::models::{Disposition, ItemId, Paginated, Pagination, ReviewedItem, StagingItem};

/// Seed record for a new pending item
#[derive(Debug, Clone, Deserialize)]
pub struct NewStagingItem {
    pub title: String,
    #[serde(default)]
    pub raw_content: serde_json::Value,
}

#[derive(Default)]
struct Inner {
    next_id: ItemId,
    items: BTreeMap<ItemId, StagingItem>,
}

/// Staging store held in process memory
#[derive(Default)]
pub struct MemoryStagingStore {
    inner: RwLock<Inner>,
}

impl MemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pending item, returning its id (ids start at 1)
    pub async fn insert(&self, item: NewStagingItem) -> ItemId {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.items.insert(
            id,
            StagingItem {
                id,
                title: item.title,
                status: Disposition::Pending,
                reviewed_at: None,
                raw_content: item.raw_content,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StagingStore for MemoryStagingStore {
    async fn set_disposition(
        &self,
        ids: &[ItemId],
        disposition: Disposition,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Vec<ReviewedItem>, DbError> {
        let mut inner = self.inner.write().await;
        let mut updated = BTreeMap::new();

        for id in ids {
            if let Some(item) = inner.items.get_mut(id) {
                item.status = disposition;
                item.reviewed_at = Some(reviewed_at);
                updated.insert(
                    *id,
                    ReviewedItem {
                        id: item.id,
                        title: item.title.clone(),
                        status: item.status,
                        reviewed_at: item.reviewed_at,
                    },
                );
            }
        }

        Ok(updated.into_values().collect())
    }

    async fn list(
        &self,
        status: Option<Disposition>,
        page: Pagination,
    ) -> Result<Paginated<StagingItem>, DbError> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&StagingItem> = inner
            .items
            .values()
            .filter(|item| status.map_or(true, |s| item.status == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn get(&self, id: ItemId) -> Result<StagingItem, DbError> {
        self.inner
            .read()
            .await
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::NotFound {
                resource: "staging item",
                id: id.to_string(),
            })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
