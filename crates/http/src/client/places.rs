//! Place search client methods

use super::{ApiOutcome, BukloadClient, ClientError, RequestOptions};
use crate::types::{Place, PlaceSearchResult};
use reqwest::Method;
use serde_json::Value;

impl BukloadClient {
    /// Look up places by name.
    ///
    /// The server answers with a single place, a list, or either of those
    /// wrapped in the usual envelope. All shapes come back as a list; an empty
    /// list means nothing matched.
    pub async fn search_places(&self, query: &str) -> Result<Vec<Place>, ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::Validation(vec![
                "search query must not be empty".to_string(),
            ]));
        }

        let response = self
            .request(
                Method::GET,
                "/api/places/search",
                None,
                RequestOptions::new().query("query", query),
            )
            .await?
            .error_for_status()?;
        if response.body.trim_ascii().is_empty() {
            return Ok(Vec::new());
        }

        let body: Value = response.json()?;
        let result: PlaceSearchResult = if body.get("success").is_some_and(Value::is_boolean) {
            ApiOutcome::<PlaceSearchResult>::decode(&response.body)?.into_result()?
        } else {
            serde_json::from_value(body)?
        };
        let places = Vec::from(result);
        debug!(query, matches = places.len(), "place search");
        Ok(places)
    }
}
