/// Response envelope shared by every JSON endpoint
///
/// Every JSON endpoint wraps its payload in `{code, message, data}`. A code
/// of zero means the platform accepted the request; anything else is a
/// rejection whose `message` field explains why.
use serde::Deserialize;
use serde_json::Value;

use crate::{BiliError, Result};

fn default_code() -> i64 {
    -1
}

fn default_message() -> String {
    "unknown error".to_string()
}

/// The `{code, message, data}` wrapper on every JSON response
///
/// A missing `code` deserializes to `-1` so a malformed body is treated as a
/// rejection rather than a success, and a missing `message` falls back to a
/// generic one so the resulting error is still printable.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default = "default_code")]
    pub code: i64,
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Returns true if the platform accepted the request
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Unwraps the envelope into its `data` payload
    ///
    /// # Returns
    /// The payload on success (an empty object when the platform sent none),
    /// or `BiliError::DataFetch` carrying the platform's message.
    pub fn into_data(self) -> Result<Value> {
        if self.is_success() {
            Ok(self
                .data
                .unwrap_or_else(|| Value::Object(Default::default())))
        } else {
            Err(BiliError::DataFetch(self.message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_yields_data() {
        let env: Envelope = serde_json::from_value(json!({
            "code": 0,
            "message": "0",
            "data": {"aid": 170_001}
        }))
        .unwrap();

        assert!(env.is_success());
        assert_eq!(env.into_data().unwrap(), json!({"aid": 170_001}));
    }

    #[test]
    fn test_error_envelope_carries_message() {
        let env: Envelope = serde_json::from_value(json!({
            "code": -400,
            "message": "请求错误",
            "data": null
        }))
        .unwrap();

        assert!(!env.is_success());
        let err = env.into_data().unwrap_err();
        assert!(matches!(err, BiliError::DataFetch(m) if m == "请求错误"));
    }

    #[test]
    fn test_empty_body_is_a_rejection() {
        let env: Envelope = serde_json::from_value(json!({})).unwrap();

        assert_eq!(env.code, -1);
        let err = env.into_data().unwrap_err();
        assert!(matches!(err, BiliError::DataFetch(m) if m == "unknown error"));
    }

    #[test]
    fn test_missing_data_defaults_to_empty_object() {
        let env: Envelope = serde_json::from_value(json!({"code": 0, "message": "0"})).unwrap();

        assert_eq!(env.into_data().unwrap(), json!({}));
    }

    #[test]
    fn test_null_data_defaults_to_empty_object() {
        let env: Envelope =
            serde_json::from_value(json!({"code": 0, "message": "0", "data": null})).unwrap();

        assert_eq!(env.into_data().unwrap(), json!({}));
    }
}
