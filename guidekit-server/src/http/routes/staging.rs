//! Staging review endpoints
//!
//! - POST /api/admin/staging/approve  bulk approve/reject
//! - GET  /api/admin/staging          paginated listing
//! - GET  /api/admin/staging/{id}     single item

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{
    Disposition, ItemId, Paginated, Pagination, PaginationParams, ReviewAction, ReviewBatch,
    StagingItem, ValidationError,
};
use crate::review::{review_batch, UpdatedItem};

/// Review request body; fields are optional so absence maps to a 400
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: Option<String>,
    pub items: Option<Vec<ItemId>>,
}

/// Review response body
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub message: String,
    pub updated_items: Vec<UpdatedItem>,
    pub action: ReviewAction,
    pub count: usize,
}

/// Listing query: optional status filter plus pagination
#[derive(Debug, Default, Deserialize)]
pub struct StagingQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// POST /api/admin/staging/approve
async fn review_items(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let Json(req) = body?;
    let batch = ReviewBatch::new(req.action.as_deref(), req.items)?;

    let outcome = review_batch(state.store.as_ref(), &batch, Utc::now()).await?;

    let verb = match outcome.action {
        ReviewAction::Approve => "approved",
        ReviewAction::Reject => "rejected",
    };
    let count = outcome.count();
    let noun = if count == 1 { "item" } else { "items" };

    Ok(Json(ReviewResponse {
        success: true,
        message: format!("Successfully {} {} {}", verb, count, noun),
        updated_items: outcome.updated_items,
        action: outcome.action,
        count,
    }))
}

/// GET /api/admin/staging
async fn list_items(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StagingQuery>, QueryRejection>,
) -> Result<Json<Paginated<StagingItem>>, ApiError> {
    let Query(query) = query?;
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<Disposition>)
        .transpose()?;
    let page = Pagination::from(PaginationParams {
        page: query.page,
        per_page: query.per_page,
    });

    let items = state.store.list(status, page).await?;
    Ok(Json(items))
}

/// GET /api/admin/staging/{id}
async fn get_item(
    State(state): State<Arc<AppState>>,
    id: Result<Path<ItemId>, PathRejection>,
) -> Result<Json<StagingItem>, ApiError> {
    let Path(id) = id.map_err(|_| {
        ApiError::InvalidRequest(ValidationError::InvalidFormat {
            field: "id",
            reason: "must be an integer".into(),
        })
    })?;

    let item = state.store.get(id).await?;
    Ok(Json(item))
}

/// Staging routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/staging", get(list_items))
        .route("/api/admin/staging/approve", post(review_items))
        .route("/api/admin/staging/{id}", get(get_item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::DateTime;
    use tower::ServiceExt;

    use crate::db::repos::memory::NewStagingItem;
    use crate::db::repos::{DbError, MemoryStagingStore, StagingStore};
    use crate::http::server::build_router;
    use crate::models::ReviewedItem;

    async fn seeded_store(titles: &[&str]) -> Arc<MemoryStagingStore> {
        let store = Arc::new(MemoryStagingStore::new());
        for title in titles {
            store
                .insert(NewStagingItem {
                    title: (*title).to_owned(),
                    raw_content: serde_json::json!({ "source": "firecrawl" }),
                })
                .await;
        }
        store
    }

    fn app(store: Arc<dyn StagingStore>) -> Router {
        build_router(AppState::new(store))
    }

    async fn post_review(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/admin/staging/approve")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn returned_stamp(body: &serde_json::Value, index: usize) -> DateTime<Utc> {
        body["updated_items"][index]["reviewed_at"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap()
    }

    struct FailingStore;

    #[async_trait]
    impl StagingStore for FailingStore {
        async fn set_disposition(
            &self,
            _ids: &[ItemId],
            _disposition: Disposition,
            _reviewed_at: DateTime<Utc>,
        ) -> Result<Vec<ReviewedItem>, DbError> {
            Err(DbError::InvalidData("connection reset".into()))
        }

        async fn list(
            &self,
            _status: Option<Disposition>,
            _page: Pagination,
        ) -> Result<Paginated<StagingItem>, DbError> {
            Err(DbError::InvalidData("connection reset".into()))
        }

        async fn get(&self, _id: ItemId) -> Result<StagingItem, DbError> {
            Err(DbError::InvalidData("connection reset".into()))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn approve_existing_skips_missing() {
        let store = seeded_store(&["Hagia Sophia", "Blue Mosque"]).await;
        let (status, body) =
            post_review(app(store.clone()), r#"{"action": "approve", "items": [1, 2, 3]}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["action"], "approve");
        assert_eq!(body["count"], 2);
        assert_eq!(body["message"], "Successfully approved 2 items");

        let items = body["updated_items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i["status"] == "approved"));
        assert!(items.iter().all(|i| i["id"] != 3));
        assert_eq!(items[0]["title"], "Hagia Sophia");
        assert!(items.iter().all(|i| i["reviewed_at"].is_string()));

        for id in [1, 2] {
            let item = store.get(id).await.unwrap();
            assert_eq!(item.status, Disposition::Approved);
            assert!(item.reviewed_at.is_some());
        }
    }

    #[tokio::test]
    async fn reject_sets_rejected() {
        let store = seeded_store(&["Hagia Sophia"]).await;
        let (status, body) =
            post_review(app(store.clone()), r#"{"action": "reject", "items": [1]}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Successfully rejected 1 item");
        assert_eq!(body["updated_items"][0]["status"], "rejected");
        assert_eq!(store.get(1).await.unwrap().status, Disposition::Rejected);
    }

    #[tokio::test]
    async fn empty_items_is_400() {
        let store = seeded_store(&["Hagia Sophia"]).await;
        let (status, body) =
            post_review(app(store.clone()), r#"{"action": "approve", "items": []}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
        assert_eq!(store.get(1).await.unwrap().status, Disposition::Pending);
    }

    #[tokio::test]
    async fn unknown_action_is_400() {
        let store = seeded_store(&["Hagia Sophia"]).await;
        let (status, body) =
            post_review(app(store), r#"{"action": "delete", "items": [1]}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid action value: 'delete'");
    }

    #[tokio::test]
    async fn missing_fields_are_400() {
        let store = seeded_store(&[]).await;
        let (status, _) = post_review(app(store.clone()), r#"{"items": [1]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_review(app(store), r#"{"action": "approve"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let store = seeded_store(&[]).await;
        let (status, body) = post_review(app(store.clone()), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");

        let (status, _) =
            post_review(app(store), r#"{"action": "approve", "items": ["one"]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn no_matching_items_is_404() {
        let store = seeded_store(&["Hagia Sophia"]).await;
        let (status, body) =
            post_review(app(store), r#"{"action": "approve", "items": [999]}"#).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn store_failure_is_500_with_details() {
        let (status, body) =
            post_review(app(Arc::new(FailingStore)), r#"{"action": "approve", "items": [1]}"#)
                .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "persistence_error");
        assert_eq!(body["message"], "Failed to update items");
        assert!(body["details"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn repeat_approval_rewrites_and_restamps() {
        let store = seeded_store(&["Hagia Sophia", "Blue Mosque"]).await;
        let body = r#"{"action": "approve", "items": [1, 2]}"#;

        let (status, first) = post_review(app(store.clone()), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["count"], 2);
        let first_stamp = returned_stamp(&first, 0);
        assert_eq!(Some(first_stamp), store.get(1).await.unwrap().reviewed_at);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let (status, second) = post_review(app(store.clone()), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["count"], 2);
        let second_stamp = returned_stamp(&second, 0);
        assert_eq!(Some(second_stamp), store.get(1).await.unwrap().reviewed_at);

        assert!(second_stamp > first_stamp);
        assert!(returned_stamp(&second, 1) > returned_stamp(&first, 1));
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let store = seeded_store(&["a", "b", "c"]).await;
        store
            .set_disposition(&[2], Disposition::Approved, Utc::now())
            .await
            .unwrap();

        let (status, body) = get_json(app(store.clone()), "/api/admin/staging?status=pending").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);

        let (status, body) = get_json(app(store), "/api/admin/staging?per_page=1&page=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["page"], 2);
        assert_eq!(body["items"][0]["id"], 2);
    }

    #[tokio::test]
    async fn list_rejects_unknown_status() {
        let store = seeded_store(&["a"]).await;
        let (status, body) = get_json(app(store), "/api/admin/staging?status=archived").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid status value: 'archived'");
    }

    #[tokio::test]
    async fn get_single_item() {
        let store = seeded_store(&["Galata Tower"]).await;
        let (status, body) = get_json(app(store.clone()), "/api/admin/staging/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Galata Tower");
        assert_eq!(body["status"], "pending");
        assert_eq!(body["raw_content"]["source"], "firecrawl");

        let (status, _) = get_json(app(store.clone()), "/api/admin/staging/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_json(app(store), "/api/admin/staging/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
