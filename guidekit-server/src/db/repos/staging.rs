//! Staging queue repository (Postgres)
//!
//! The review update is a single `UPDATE ... WHERE id = ANY($n) RETURNING`
//! statement, so a batch is atomic without an explicit transaction.
//! Overlapping concurrent batches are last-write-wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{DbError, StagingStore};
use crate::models::{Disposition, ItemId, Paginated, Pagination, ReviewedItem, StagingItem};

/// Staging repository backed by a connection pool
#[derive(Clone)]
pub struct PgStagingRepo {
    pool: PgPool,
}

impl PgStagingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_status(row: &PgRow) -> Result<Disposition, DbError> {
    let status: String = row.try_get("status")?;
    status
        .parse()
        .map_err(|e: crate::models::ValidationError| DbError::InvalidData(e.to_string()))
}

fn staging_item_from_row(row: &PgRow) -> Result<StagingItem, DbError> {
    let raw_content: Option<serde_json::Value> = row.try_get("raw_content")?;
    Ok(StagingItem {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        status: parse_status(row)?,
        reviewed_at: row.try_get("reviewed_at")?,
        raw_content: raw_content.unwrap_or(serde_json::Value::Null),
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl StagingStore for PgStagingRepo {
    async fn set_disposition(
        &self,
        ids: &[ItemId],
        disposition: Disposition,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Vec<ReviewedItem>, DbError> {
        let rows = sqlx::query(
            r#"
            UPDATE staging_queue
            SET status = $1, reviewed_at = $2
            WHERE id = ANY($3)
            RETURNING id, title, status, reviewed_at
            "#,
        )
        .bind(disposition.as_str())
        .bind(reviewed_at)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items = rows
            .iter()
            .map(|r| -> Result<ReviewedItem, DbError> {
                Ok(ReviewedItem {
                    id: r.try_get("id")?,
                    title: r.try_get("title")?,
                    status: parse_status(r)?,
                    reviewed_at: r.try_get("reviewed_at")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // RETURNING order is unspecified
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn list(
        &self,
        status: Option<Disposition>,
        page: Pagination,
    ) -> Result<Paginated<StagingItem>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                title,
                status,
                reviewed_at,
                raw_content,
                created_at,
                COUNT(*) OVER() as total
            FROM staging_queue
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let total = match rows.first() {
            Some(r) => r.try_get::<i64, _>("total")?,
            None => 0,
        };
        let items = rows
            .iter()
            .map(staging_item_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn get(&self, id: ItemId) -> Result<StagingItem, DbError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, status, reviewed_at, raw_content, created_at
            FROM staging_queue
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "staging item",
            id: id.to_string(),
        })?;

        staging_item_from_row(&row)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
