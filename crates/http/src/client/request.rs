//! Request descriptors and raw responses

use bytes::Bytes;
use reqwest::{Method, StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ClientError;

/// Extra per-request settings
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query string parameters, in order
    pub query: Vec<(String, String)>,
    /// Additional headers; `Authorization` is managed by the client
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// No query parameters, no extra headers
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A request captured so it can be sent again after a token refresh
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub options: RequestOptions,
    /// Token handed over by a refresh; overrides the stored token when set
    pub bearer: Option<String>,
    /// Set once the request has been resubmitted after a refresh
    pub retried: bool,
}

impl PendingRequest {
    /// A first attempt, sent with whatever token is stored at send time
    pub fn new(
        method: Method,
        path: impl Into<String>,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            options,
            bearer: None,
            retried: false,
        }
    }

    /// Attach a freshly issued access token and mark the request as retried
    pub fn reauthorize(&mut self, token: &str) {
        self.bearer = Some(token.to_string());
        self.retried = true;
    }
}

/// A response as received from the server, before envelope decoding
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 401 and 403 both mean the access token was not accepted
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self.status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        )
    }

    /// Body as UTF-8, lossy
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body text, or the status reason when the body is empty
    pub(crate) fn error_message(&self) -> String {
        let text = self.text();
        if text.trim().is_empty() {
            self.status.to_string()
        } else {
            text
        }
    }

    /// Turn a non-2xx response into the matching error
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::from_status(self.status, self.error_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> ApiResponse {
        ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn reauthorize_marks_retry() {
        let mut req = PendingRequest::new(Method::GET, "/courses", None, RequestOptions::new());
        assert!(!req.retried);
        req.reauthorize("fresh-token");
        assert!(req.retried);
        assert_eq!(req.bearer.as_deref(), Some("fresh-token"));
    }

    #[test]
    fn only_401_and_403_are_auth_rejections() {
        assert!(response(401, "").is_auth_rejection());
        assert!(response(403, "").is_auth_rejection());
        assert!(!response(404, "").is_auth_rejection());
        assert!(!response(500, "").is_auth_rejection());
    }

    #[test]
    fn error_for_status_keeps_body() {
        let err = response(404, "no such course").error_for_status().unwrap_err();
        assert!(matches!(err, ClientError::NotFound(m) if m == "no such course"));

        let err = response(500, "").error_for_status().unwrap_err();
        assert!(matches!(
            err,
            ClientError::ServerError { status: 500, message } if message.contains("500")
        ));
    }
}
