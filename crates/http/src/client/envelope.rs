//! Decoding of the `{success, data, message}` response envelope

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ClientError;

#[derive(Deserialize)]
struct RawEnvelope {
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
}

/// Outcome reported by the server inside a 2xx response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    Success(T),
    Failure { message: Option<String> },
}

impl<T: DeserializeOwned> ApiOutcome<T> {
    /// Parse an envelope. `data` is only decoded when `success` is true.
    ///
    /// An empty body (e.g. `204 No Content`) counts as success with `null` data.
    pub fn decode(body: &[u8]) -> Result<Self, ClientError> {
        if body.trim_ascii().is_empty() {
            return Ok(Self::Success(serde_json::from_value(Value::Null)?));
        }
        let raw: RawEnvelope = serde_json::from_slice(body)?;
        if raw.success {
            Ok(Self::Success(serde_json::from_value(raw.data)?))
        } else {
            Ok(Self::Failure {
                message: raw.message,
            })
        }
    }
}

impl<T> ApiOutcome<T> {
    /// `Failure` becomes [`ClientError::Application`]
    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure { message } => Err(ClientError::Application {
                message: message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "request was not successful".to_string()),
            }),
        }
    }
}
