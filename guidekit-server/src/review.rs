//! Staging review gateway
//!
//! The only state-changing operation of the moderation workflow: move a
//! batch of staging items to `approved` or `rejected` in one bulk update.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::repos::{DbError, StagingStore};
use crate::models::{Disposition, ItemId, ReviewAction, ReviewBatch};

/// Why a validated review batch failed
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("no staging items matched the supplied ids")]
    NotFound { requested: Vec<ItemId> },

    #[error("failed to update staging items: {0}")]
    Persistence(#[source] DbError),
}

/// Row summary returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedItem {
    pub id: ItemId,
    pub title: String,
    pub status: Disposition,
    pub reviewed_at: DateTime<Utc>,
}

/// Result of a successful batch
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub action: ReviewAction,
    pub updated_items: Vec<UpdatedItem>,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewOutcome {
    pub fn count(&self) -> usize {
        self.updated_items.len()
    }

    /// Ids in the batch that matched no record
    pub fn skipped<'a>(&'a self, requested: &'a [ItemId]) -> impl Iterator<Item = ItemId> + 'a {
        requested
            .iter()
            .copied()
            .filter(|id| !self.updated_items.iter().any(|item| item.id == *id))
    }
}

/// Apply a validated batch at `reviewed_at`.
///
/// Ids with no record are skipped silently. Zero matches is `NotFound`.
/// Store failures abort the whole batch; nothing is retried.
pub async fn review_batch(
    store: &dyn StagingStore,
    batch: &ReviewBatch,
    reviewed_at: DateTime<Utc>,
) -> Result<ReviewOutcome, ReviewError> {
    let action = batch.action();
    let updated = store
        .set_disposition(batch.items(), action.disposition(), reviewed_at)
        .await
        .map_err(ReviewError::Persistence)?;

    if updated.is_empty() {
        return Err(ReviewError::NotFound {
            requested: batch.items().to_vec(),
        });
    }

    let outcome = ReviewOutcome {
        action,
        updated_items: updated
            .into_iter()
            .map(|item| UpdatedItem {
                id: item.id,
                title: item.title,
                status: item.status,
                reviewed_at: item.reviewed_at.unwrap_or(reviewed_at),
            })
            .collect(),
        reviewed_at,
    };

    let skipped = outcome.skipped(batch.items()).count();
    tracing::info!(
        action = action.as_str(),
        updated = outcome.count(),
        skipped,
        "staging batch reviewed"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::memory::NewStagingItem;
    use crate::db::repos::MemoryStagingStore;

    async fn store_with(titles: &[&str]) -> MemoryStagingStore {
        let store = MemoryStagingStore::new();
        for title in titles {
            store
                .insert(NewStagingItem {
                    title: (*title).to_owned(),
                    raw_content: serde_json::Value::Null,
                })
                .await;
        }
        store
    }

    #[tokio::test]
    async fn approves_existing_and_skips_missing() {
        let store = store_with(&["Hagia Sophia", "Blue Mosque"]).await;
        let batch = ReviewBatch::new(Some("approve"), Some(vec![1, 2, 3])).unwrap();

        let now = Utc::now();
        let outcome = review_batch(&store, &batch, now).await.unwrap();

        assert_eq!(outcome.count(), 2);
        assert!(outcome
            .updated_items
            .iter()
            .all(|i| i.status == Disposition::Approved && i.reviewed_at == now));
        assert_eq!(outcome.skipped(batch.items()).collect::<Vec<_>>(), vec![3]);
        assert!(store.get(1).await.unwrap().reviewed_at.is_some());
    }

    #[tokio::test]
    async fn reject_sets_rejected() {
        let store = store_with(&["Hagia Sophia"]).await;
        let batch = ReviewBatch::new(Some("reject"), Some(vec![1])).unwrap();

        let outcome = review_batch(&store, &batch, Utc::now()).await.unwrap();
        assert_eq!(outcome.updated_items[0].status, Disposition::Rejected);
    }

    #[tokio::test]
    async fn no_matches_is_not_found() {
        let store = store_with(&["Hagia Sophia"]).await;
        let batch = ReviewBatch::new(Some("approve"), Some(vec![999])).unwrap();

        let err = review_batch(&store, &batch, Utc::now()).await.unwrap_err();
        assert!(matches!(err, ReviewError::NotFound { ref requested } if requested == &[999]));
    }
}
