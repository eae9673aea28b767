//! The single JSON document each command prints on stdout.

use chrono::{DateTime, Utc};
use log::error;
use serde::Serialize;

use crate::error::{Error, Operation};

const ENCODE_FAILURE: &str = r#"{"success":false,"error":"failed to encode result"}"#;

/// A rendered result document and whether it reports success.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    success: bool,
    json: String,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    success: bool,
    #[serde(flatten)]
    body: &'a T,
}

#[derive(Serialize)]
struct Message<'a> {
    error: &'a str,
}

#[derive(Serialize)]
struct CommandFailure<'a> {
    error: &'a str,
    error_type: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct NotFound<'a> {
    error: &'a str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct MfaRequired {
    requires_mfa: bool,
    message: &'static str,
}

impl Document {
    /// `{"success": true, ...body}`.
    pub fn success<T: Serialize>(body: &T) -> Self {
        Self::encode(true, body)
    }

    /// `{"success": false, "error": message}`.
    pub fn failure(message: &str) -> Self {
        Self::encode(false, &Message { error: message })
    }

    /// A command that ended before producing a report.
    pub fn command_error(err: &Error, operation: Operation, timestamp: DateTime<Utc>) -> Self {
        let message = err.to_string();
        Self::encode(
            false,
            &CommandFailure {
                error: &message,
                error_type: err.error_type(operation),
                timestamp,
            },
        )
    }

    pub fn order_not_found(order_id: &str, timestamp: DateTime<Utc>) -> Self {
        let message = format!("Order {order_id} not found");
        Self::encode(
            false,
            &NotFound {
                error: &message,
                timestamp,
            },
        )
    }

    pub fn mfa_required() -> Self {
        Self::encode(
            false,
            &MfaRequired {
                requires_mfa: true,
                message: "MFA required",
            },
        )
    }

    fn encode<T: Serialize>(success: bool, body: &T) -> Self {
        match serde_json::to_string(&Envelope { success, body }) {
            Ok(json) => Self { success, json },
            Err(e) => {
                error!("Failed to encode result: {e}");
                Self {
                    success: false,
                    json: ENCODE_FAILURE.to_string(),
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn as_str(&self) -> &str {
        &self.json
    }

    /// 0 iff the document reports success.
    pub fn exit_code(&self) -> i32 {
        if self.success { 0 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn parse(doc: &Document) -> Value {
        serde_json::from_str(doc.as_str()).unwrap()
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 26, 16, 0, 0).unwrap()
    }

    #[derive(Serialize)]
    struct Body {
        orders: Vec<u32>,
    }

    #[test]
    fn success_flattens_body() {
        let doc = Document::success(&Body { orders: vec![1, 2] });
        assert!(doc.is_success());
        assert_eq!(doc.exit_code(), 0);
        assert!(doc.as_str().starts_with(r#"{"success":true,"orders""#));
        assert_eq!(parse(&doc)["orders"][1], 2);
    }

    #[test]
    fn bare_failure() {
        let doc = Document::failure("Invalid arguments");
        assert_eq!(doc.exit_code(), 1);
        assert_eq!(
            doc.as_str(),
            r#"{"success":false,"error":"Invalid arguments"}"#
        );
    }

    #[test]
    fn command_error_carries_type_and_timestamp() {
        let doc = Document::command_error(&Error::SessionInvalid, Operation::Sell, ts());
        let v = parse(&doc);
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "Authentication required or has expired");
        assert_eq!(v["error_type"], "authentication_error");
        assert_eq!(v["timestamp"], "2024-02-26T16:00:00Z");
    }

    #[test]
    fn not_found_shape() {
        let v = parse(&Document::order_not_found("abc", ts()));
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "Order abc not found");
        assert!(v.get("error_type").is_none());
    }

    #[test]
    fn mfa_shape() {
        let v = parse(&Document::mfa_required());
        assert_eq!(v["requires_mfa"], true);
        assert_eq!(v["message"], "MFA required");
        assert_eq!(v["success"], false);
    }
}
