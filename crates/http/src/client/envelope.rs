//! Response envelope used by the CMS backend
//!
//! Every payload arrives as `{ "status": 200, "message": "Success", "data": ... }`.
//! Error bodies use the same shape without `data`.

use super::ClientError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check the embedded status and return the message, ignoring any payload
    pub fn into_message(self) -> Result<Option<String>, ClientError> {
        if self.is_success() {
            Ok(self.message)
        } else {
            Err(ClientError::Envelope {
                status: self.status,
                message: self.message.unwrap_or_default(),
            })
        }
    }

    /// Unwrap the payload, failing when the envelope reports an error
    pub fn into_data(self) -> Result<T, ClientError> {
        if !self.is_success() {
            return Err(ClientError::Envelope {
                status: self.status,
                message: self.message.unwrap_or_default(),
            });
        }

        self.data.ok_or_else(|| ClientError::Envelope {
            status: self.status,
            message: "response envelope carried no data".into(),
        })
    }
}

/// Message to report for an error response body.
///
/// Uses the envelope's `message` when the body is one, the raw body otherwise.
pub(crate) fn error_message(body: &str) -> Option<String> {
    if let Ok(envelope) = serde_json::from_str::<ApiResponse<serde_json::Value>>(body) {
        if let Some(message) = envelope.message.filter(|m| !m.is_empty()) {
            return Some(message);
        }
    }

    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_data_success() {
        let envelope: ApiResponse<Vec<u32>> = serde_json::from_value(json!({
            "status": 200,
            "message": "Success",
            "data": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(envelope.into_data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_into_data_error_status() {
        let envelope: ApiResponse<serde_json::Value> = serde_json::from_value(json!({
            "status": 409,
            "message": "Semester already exists"
        }))
        .unwrap();
        match envelope.into_data() {
            Err(ClientError::Envelope { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Semester already exists");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_into_data_missing_payload() {
        let envelope: ApiResponse<String> =
            serde_json::from_value(json!({ "status": 200, "message": "Success", "data": null }))
                .unwrap();
        assert!(matches!(
            envelope.into_data(),
            Err(ClientError::Envelope { status: 200, .. })
        ));
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        let body = r#"{"status":401,"message":"Token expired","data":null}"#;
        assert_eq!(error_message(body).as_deref(), Some("Token expired"));
        assert_eq!(error_message("  plain text  ").as_deref(), Some("plain text"));
        assert_eq!(error_message(""), None);
    }
}
