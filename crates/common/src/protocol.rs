//! Payload types carried inside a Multipass token.
//!
//! The token pipeline treats the payload as opaque bytes. [`CustomerData`] is
//! the JSON object a store conventionally hands over for single sign-on; any
//! other serialisable value works just as well.

use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::MultipassError;

// ---------------------------------------------------------------------------
// Customer data
// ---------------------------------------------------------------------------

/// Customer session data embedded in a Multipass token.
///
/// `created_at` is carried as text; nothing in this workspace interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerData {
    /// Customer email address. **Required.**
    pub email: String,
    /// ISO-8601 timestamp of when the data was generated. **Required.**
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Comma-separated tags applied to the customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_string: Option<String>,
    /// Stable identifier from the issuing system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Client IP the token is bound to by the receiver, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,
    /// URL the receiver redirects to after login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
}

impl CustomerData {
    /// Construct [`CustomerData`] with only the required fields set.
    pub fn new(email: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            created_at: created_at.into(),
            first_name: None,
            last_name: None,
            tag_string: None,
            identifier: None,
            remote_ip: None,
            return_to: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Opaque plaintext bytes sealed into a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Bytes);

impl Payload {
    /// Serialise `value` to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MultipassError::Encoding`] if `value` cannot be serialised.
    pub fn from_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, MultipassError> {
        serde_json::to_vec(value)
            .map(|v| Self(Bytes::from(v)))
            .map_err(|e| MultipassError::Encoding(format!("payload is not serialisable: {e}")))
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the payload bytes back as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MultipassError::Encoding`] if the bytes are not valid JSON for `T`.
    pub fn to_json<T: DeserializeOwned>(&self) -> Result<T, MultipassError> {
        serde_json::from_slice(&self.0)
            .map_err(|e| MultipassError::Encoding(format!("payload is not valid JSON: {e}")))
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn customer_data_skips_absent_fields() {
        let c = CustomerData::new("a@example.com", "2015-07-24T12:36:40-0400");
        let s = serde_json::to_string(&c).unwrap();
        assert_eq!(
            s,
            r#"{"email":"a@example.com","created_at":"2015-07-24T12:36:40-0400"}"#
        );
        assert_eq!(s.len(), 65);
    }

    #[test]
    fn customer_data_keeps_optional_fields() {
        let mut c = CustomerData::new("a@example.com", "2015-07-24T12:36:40-0400");
        c.return_to = Some("https://store.example.com/account".into());
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["return_to"], "https://store.example.com/account");
        assert!(v.get("first_name").is_none());
    }

    #[test]
    fn payload_json_round_trip() {
        let p = Payload::from_json(&json!({"email": "a@example.com"})).unwrap();
        let back: serde_json::Value = p.to_json().unwrap();
        assert_eq!(back["email"], "a@example.com");
    }

    #[test]
    fn payload_to_json_rejects_garbage() {
        let p = Payload::from(b"\xffnot json".to_vec());
        let err = p.to_json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, MultipassError::Encoding(_)));
    }
}
