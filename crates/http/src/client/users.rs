//! Account client methods

use super::{BukloadClient, ClientError, RequestOptions};
use crate::types::{UpdateProfileRequest, UserProfile};
use reqwest::Method;
use serde_json::Value;

impl BukloadClient {
    /// Get the current user's account
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        self.call(Method::GET, "/users/me", None, RequestOptions::new())
            .await
    }

    /// Update editable account fields; unset fields are left unchanged
    pub async fn update_me(&self, request: &UpdateProfileRequest) -> Result<Value, ClientError> {
        if request.is_empty() {
            return Err(ClientError::Validation(vec![
                "nothing to update".to_string(),
            ]));
        }
        self.call(
            Method::PATCH,
            "/users/me",
            Some(serde_json::to_value(request)?),
            RequestOptions::new(),
        )
        .await
    }
}
