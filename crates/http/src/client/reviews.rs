//! Review and loyalty point client methods

use super::{BukloadClient, ClientError, RequestOptions};
use crate::types::{
    CreateReviewRequest, PointsHistory, PointsSummary, ReviewCursor, ReviewPage,
    ReviewPageRequest,
};
use reqwest::Method;
use serde_json::Value;

impl BukloadClient {
    /// Post a review for a course segment
    pub async fn create_review(&self, request: &CreateReviewRequest) -> Result<Value, ClientError> {
        self.call(
            Method::POST,
            "/reviews",
            Some(serde_json::to_value(request)?),
            RequestOptions::new(),
        )
        .await
    }

    /// One page of the current user's reviews
    pub async fn my_reviews(&self, page: &ReviewPageRequest) -> Result<ReviewPage, ClientError> {
        let options = match &page.position {
            ReviewCursor::Page(number) => RequestOptions::new().query("page", number),
            ReviewCursor::Cursor(cursor) => RequestOptions::new().query("cursor", cursor),
        }
        .query("pageSize", page.page_size);

        self.call(Method::GET, "/reviews/me", None, options).await
    }

    /// Delete one of the current user's reviews
    pub async fn delete_review(&self, review_id: i64) -> Result<Value, ClientError> {
        self.call(
            Method::DELETE,
            &format!("/reviews/{review_id}"),
            None,
            RequestOptions::new(),
        )
        .await
    }

    /// Current point balance
    pub async fn points_summary(&self) -> Result<PointsSummary, ClientError> {
        self.call(Method::GET, "/points/summary", None, RequestOptions::new())
            .await
    }

    /// Point earning and spending entries
    pub async fn points_history(&self) -> Result<PointsHistory, ClientError> {
        self.call(Method::GET, "/points/history", None, RequestOptions::new())
            .await
    }
}
