//! Saved course client methods

use super::{BukloadClient, ClientError, RequestOptions};
use crate::types::{
    AddSegmentRequest, CourseDetail, CourseListItem, ReorderSegmentsRequest, SaveCourseRequest,
};
use reqwest::Method;
use serde_json::Value;

impl BukloadClient {
    /// Courses saved by the current user
    pub async fn my_courses(&self) -> Result<Vec<CourseListItem>, ClientError> {
        self.call(
            Method::GET,
            "/courses",
            None,
            RequestOptions::new().query("mine", true),
        )
        .await
    }

    /// A course with its segments
    pub async fn course_detail(&self, course_id: i64) -> Result<CourseDetail, ClientError> {
        self.call(
            Method::GET,
            &format!("/courses/{course_id}"),
            None,
            RequestOptions::new(),
        )
        .await
    }

    /// Confirm a recommended course and save it
    pub async fn save_course(
        &self,
        request: &SaveCourseRequest,
    ) -> Result<CourseDetail, ClientError> {
        self.call(
            Method::POST,
            "/courses",
            Some(serde_json::to_value(request)?),
            RequestOptions::new(),
        )
        .await
    }

    /// Add a place to a course
    pub async fn add_segment(
        &self,
        course_id: i64,
        request: &AddSegmentRequest,
    ) -> Result<Value, ClientError> {
        self.call(
            Method::POST,
            &format!("/courses/{course_id}/segments"),
            Some(serde_json::to_value(request)?),
            RequestOptions::new(),
        )
        .await
    }

    /// Remove a place from a course
    pub async fn delete_segment(
        &self,
        course_id: i64,
        segment_id: i64,
    ) -> Result<Value, ClientError> {
        self.call(
            Method::DELETE,
            &format!("/courses/{course_id}/segments/{segment_id}"),
            None,
            RequestOptions::new(),
        )
        .await
    }

    /// Replace the visiting order of a course's segments in one call
    pub async fn reorder_segments(
        &self,
        course_id: i64,
        order: Vec<i64>,
    ) -> Result<Value, ClientError> {
        let body = ReorderSegmentsRequest { order };
        self.call(
            Method::PUT,
            &format!("/courses/{course_id}/segments/fullupdate"),
            Some(serde_json::to_value(&body)?),
            RequestOptions::new(),
        )
        .await
    }
}
