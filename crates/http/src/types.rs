//! Request and response bodies of the Bukload API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

/// Signup request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub login_id: String,
    pub password: String,
    pub password_confirm: String,
    pub name: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub email: String,
}

/// Credentials issued by login and signup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Body of `POST /auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response of `POST /auth/refresh`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    /// Present only when the server rotates refresh tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Travel requests and recommendations
// ---------------------------------------------------------------------------

/// Questionnaire answers submitted before asking for recommendations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTravelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<i64>,
    pub departure_location: String,
    pub travel_days: u32,
    pub budget: u64,
    /// `"F"`, `"M"`, `"OTHER"`
    pub gender: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub companions: String,
    pub style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_request: Option<String>,
}

/// Region picked for a travel request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRecommendation {
    pub region: String,
    pub anchor_id: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `POST /recommendations/courses`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendCoursesRequest {
    pub request_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_id: Option<String>,
}

/// A stop inside a recommended course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedPlace {
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
}

/// A candidate itinerary proposed by the recommendation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub places: Vec<RecommendedPlace>,
    /// e.g. `"7km"`
    #[serde(default)]
    pub total_distance: String,
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub local_currency_merchants: u32,
}

/// Candidate courses for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendCoursesResponse {
    pub region: String,
    pub courses: Vec<RecommendedCourse>,
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// Entry of `GET /courses?mine=true`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListItem {
    pub course_id: i64,
    pub title: String,
    pub region: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub total_distance_km: Option<f64>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
}

/// One stop of a saved course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSegment {
    #[serde(default)]
    pub id: Option<i64>,
    pub order_no: u32,
    #[serde(default)]
    pub place_id: Option<String>,
    pub place_name: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
    /// `"CAR"`, `"WALK"`, `"TRANSIT"`, or anything newer the server sends
    pub transport_mode: String,
    #[serde(default)]
    pub has_local_currency: Option<bool>,
}

/// `GET /courses/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub region: String,
    #[serde(default)]
    pub total_distance_km: f64,
    #[serde(default)]
    pub estimated_minutes: u32,
    #[serde(default)]
    pub segments: Vec<CourseSegment>,
}

impl CourseDetail {
    /// Segment ids in visiting order, as expected by the reorder endpoint
    pub fn segment_order(&self) -> Vec<i64> {
        let mut segments: Vec<&CourseSegment> = self.segments.iter().collect();
        segments.sort_by_key(|s| s.order_no);
        segments.iter().filter_map(|s| s.id).collect()
    }
}

/// Body of `POST /courses/{id}/segments`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSegmentRequest {
    pub place_id: String,
    pub order_no: u32,
}

/// One stop of a course being saved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCoursePlace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub order_no: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<String>,
}

/// Body of `POST /courses`, confirming a recommended course
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCourseRequest {
    pub request_id: i64,
    pub anchor_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub places: Vec<SaveCoursePlace>,
}

impl SaveCourseRequest {
    /// Build the save request for one of the recommended courses
    pub fn from_recommendation(
        request_id: i64,
        anchor_id: impl Into<String>,
        course: &RecommendedCourse,
    ) -> Self {
        let places = course
            .places
            .iter()
            .zip(1u32..)
            .map(|(place, order_no)| SaveCoursePlace {
                place_id: None,
                name: place.name.clone(),
                category: place.category.clone(),
                lat: Some(place.lat),
                lng: Some(place.lng),
                order_no,
                transport_mode: None,
            })
            .collect();
        Self {
            request_id,
            anchor_id: anchor_id.into(),
            title: course.title.clone(),
            description: Some(course.description.clone()).filter(|d| !d.is_empty()),
            places,
        }
    }
}

/// Body of `PUT /courses/{id}/segments/fullupdate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderSegmentsRequest {
    pub order: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Reviews and points
// ---------------------------------------------------------------------------

/// Body of `POST /reviews`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub course_segment_id: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// A review written by the current user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub course_id: Option<i64>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Where to continue listing `GET /reviews/me`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCursor {
    Page(u32),
    Cursor(String),
}

/// Which page of reviews to fetch, and how many per page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPageRequest {
    pub position: ReviewCursor,
    pub page_size: u32,
}

impl ReviewPageRequest {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    pub const fn first() -> Self {
        Self {
            position: ReviewCursor::Page(1),
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for ReviewPageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// One page of the user's reviews
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    #[serde(default)]
    pub items: Vec<Review>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl ReviewPage {
    /// Request for the following page, if there is one.
    ///
    /// A server cursor wins over page numbers.
    pub fn next_request(&self, current: &ReviewPageRequest) -> Option<ReviewPageRequest> {
        if let Some(cursor) = self.next_cursor.as_ref().filter(|c| !c.is_empty()) {
            return Some(ReviewPageRequest {
                position: ReviewCursor::Cursor(cursor.clone()),
                page_size: current.page_size,
            });
        }
        if !self.has_more {
            return None;
        }
        let next = match &current.position {
            ReviewCursor::Page(page) => page + 1,
            // Server switched from cursors back to pages; start over from page 2.
            ReviewCursor::Cursor(_) => 2,
        };
        Some(ReviewPageRequest {
            position: ReviewCursor::Page(next),
            page_size: current.page_size,
        })
    }
}

/// Loyalty point totals; shape is owned by the server
pub type PointsSummary = JsonValue;
/// Loyalty point history; shape is owned by the server
pub type PointsHistory = JsonValue;

// ---------------------------------------------------------------------------
// Places
// ---------------------------------------------------------------------------

/// A place returned by `GET /api/places/search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Identifier accepted by `POST /courses/{id}/segments`
    #[serde(default, alias = "id", deserialize_with = "string_or_number")]
    pub place_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Lot-number address
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub road_address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl Place {
    /// Road address when known, else the lot-number address
    pub fn display_address(&self) -> Option<&str> {
        self.road_address
            .as_deref()
            .or(self.address.as_deref())
            .filter(|a| !a.trim().is_empty())
    }
}

/// Search results come back either as one place or as a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum PlaceSearchResult {
    Many(Vec<Place>),
    One(Place),
    Empty(()),
}

impl From<PlaceSearchResult> for Vec<Place> {
    fn from(result: PlaceSearchResult) -> Self {
        match result {
            PlaceSearchResult::Many(places) => places,
            PlaceSearchResult::One(place) => vec![place],
            PlaceSearchResult::Empty(()) => Vec::new(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::String(id)) => Some(id),
        Some(JsonValue::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// `GET /users/me`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub login_id: String,
    pub name: String,
    pub birth_date: String,
    pub email: String,
    pub nickname: Option<String>,
    pub preferred_theme: Option<String>,
    pub home_location: Option<String>,
}

/// `PATCH /users/me`; only the fields that are set are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_location: Option<String>,
}

impl UpdateProfileRequest {
    pub const fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.preferred_theme.is_none() && self.home_location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn travel_request_uses_camel_case_and_skips_unset() {
        let body = serde_json::to_value(CreateTravelRequest {
            departure_location: "Seoul".into(),
            travel_days: 2,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body["departureLocation"], "Seoul");
        assert_eq!(body["travelDays"], 2);
        assert!(body.get("themeId").is_none());
        assert!(body.get("additionalRequest").is_none());
    }

    #[test]
    fn segment_order_follows_order_no() {
        let detail: CourseDetail = serde_json::from_value(json!({
            "courseId": 7,
            "title": "Yangju day trip",
            "region": "Yangju",
            "segments": [
                {
                    "id": 30, "orderNo": 2, "placeName": "b", "category": "cafe",
                    "lat": 0.0, "lng": 0.0, "transportMode": "WALK"
                },
                {
                    "id": 10, "orderNo": 1, "placeName": "a", "category": "park",
                    "lat": 0.0, "lng": 0.0, "transportMode": "CAR"
                },
                {
                    "orderNo": 3, "placeName": "c", "category": "food",
                    "lat": 0.0, "lng": 0.0, "transportMode": "TRANSIT"
                }
            ]
        }))
        .unwrap();
        assert_eq!(detail.segment_order(), vec![10, 30]);
    }

    #[test]
    fn save_request_numbers_places_from_one() {
        let course = RecommendedCourse {
            title: "Riverside".into(),
            description: String::new(),
            places: vec![
                RecommendedPlace { name: "A".into(), category: "park".into(), lat: 1.0, lng: 2.0 },
                RecommendedPlace { name: "B".into(), category: "cafe".into(), lat: 3.0, lng: 4.0 },
            ],
            total_distance: "7km".into(),
            estimated_time: "4h".into(),
            tags: vec![],
            local_currency_merchants: 0,
        };
        let req = SaveCourseRequest::from_recommendation(5, "yangju", &course);
        assert_eq!(req.places[0].order_no, 1);
        assert_eq!(req.places[1].order_no, 2);
        assert!(req.description.is_none());
        assert_eq!(req.anchor_id, "yangju");
    }

    #[test]
    fn review_paging_prefers_cursor() {
        let first = ReviewPageRequest::first();
        let page = ReviewPage { items: vec![], next_cursor: Some("abc".into()), has_more: true };
        assert_eq!(
            page.next_request(&first).unwrap().position,
            ReviewCursor::Cursor("abc".into())
        );

        let page = ReviewPage { items: vec![], next_cursor: None, has_more: true };
        assert_eq!(page.next_request(&first).unwrap().position, ReviewCursor::Page(2));

        let page = ReviewPage { items: vec![], next_cursor: None, has_more: false };
        assert!(page.next_request(&first).is_none());
    }

    #[test]
    fn place_search_accepts_object_list_or_null() {
        let one: PlaceSearchResult =
            serde_json::from_value(json!({"id": 42, "name": "Cafe Onda", "address": "Yangju 1"}))
                .unwrap();
        let places = Vec::<Place>::from(one);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].place_id.as_deref(), Some("42"));
        assert_eq!(places[0].display_address(), Some("Yangju 1"));

        let many: PlaceSearchResult = serde_json::from_value(json!([
            {"placeId": "p-1", "name": "A", "roadAddress": "Road 1", "address": "Lot 1"},
            {"name": "B"}
        ]))
        .unwrap();
        let places = Vec::<Place>::from(many);
        assert_eq!(places[0].place_id.as_deref(), Some("p-1"));
        assert_eq!(places[0].display_address(), Some("Road 1"));
        assert!(places[1].place_id.is_none());

        let none: PlaceSearchResult = serde_json::from_value(JsonValue::Null).unwrap();
        assert!(Vec::<Place>::from(none).is_empty());
    }

    #[test]
    fn profile_tolerates_missing_fields() {
        let profile: UserProfile = serde_json::from_value(json!({"loginId": "traveler"})).unwrap();
        assert_eq!(profile.login_id, "traveler");
        assert!(profile.nickname.is_none());
        assert!(UpdateProfileRequest::default().is_empty());
    }
}
