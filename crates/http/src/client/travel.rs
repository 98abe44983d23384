//! Travel request and recommendation client methods

use super::{BukloadClient, ClientError, RequestOptions};
use crate::types::{
    CreateTravelRequest, RecommendCoursesRequest, RecommendCoursesResponse, RegionRecommendation,
};
use reqwest::Method;

impl BukloadClient {
    /// Submit questionnaire answers; returns the new request id
    pub async fn create_travel_request(
        &self,
        request: &CreateTravelRequest,
    ) -> Result<i64, ClientError> {
        self.call(
            Method::POST,
            "/travel-requests",
            Some(serde_json::to_value(request)?),
            RequestOptions::new(),
        )
        .await
    }

    /// Ask which region fits a travel request
    pub async fn recommend_region(
        &self,
        request_id: i64,
    ) -> Result<RegionRecommendation, ClientError> {
        self.call(
            Method::POST,
            "/recommendations/region",
            None,
            RequestOptions::new().query("requestId", request_id),
        )
        .await
    }

    /// Ask for candidate courses in the recommended region
    pub async fn recommend_courses(
        &self,
        request: &RecommendCoursesRequest,
    ) -> Result<RecommendCoursesResponse, ClientError> {
        self.call(
            Method::POST,
            "/recommendations/courses",
            Some(serde_json::to_value(request)?),
            RequestOptions::new(),
        )
        .await
    }
}
