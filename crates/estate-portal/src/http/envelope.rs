use serde::Deserialize;
use serde_json::Value;

/// How the hook contract treats a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Rejected,
    ServerFault,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            500..=u16::MAX => StatusClass::ServerFault,
            400..=499 => StatusClass::Rejected,
            _ => StatusClass::Success,
        }
    }
}

/// Error body returned by the backend: `{ message, details? }`.
///
/// Validation failures send `message` as a list of strings, so both fields are
/// kept loosely typed and flattened by [`ErrorEnvelope::user_message`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub details: Option<Value>,
}

impl ErrorEnvelope {
    /// Parse an error body; anything that is not an envelope reads as empty.
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// `message` when it carries text, otherwise `details`.
    pub fn user_message(&self) -> Option<String> {
        self.message
            .as_ref()
            .and_then(flatten_text)
            .or_else(|| self.details.as_ref().and_then(flatten_text))
    }
}

fn flatten_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(flatten_text)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Object(_) => value.to_string(),
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_boundaries() {
        assert_eq!(StatusClass::of(200), StatusClass::Success);
        assert_eq!(StatusClass::of(399), StatusClass::Success);
        assert_eq!(StatusClass::of(400), StatusClass::Rejected);
        assert_eq!(StatusClass::of(499), StatusClass::Rejected);
        assert_eq!(StatusClass::of(500), StatusClass::ServerFault);
        assert_eq!(StatusClass::of(503), StatusClass::ServerFault);
    }

    #[test]
    fn message_wins_over_details() {
        let envelope = ErrorEnvelope::parse(r#"{"message":"Estate not found","details":"id=4"}"#);
        assert_eq!(envelope.user_message().as_deref(), Some("Estate not found"));
    }

    #[test]
    fn empty_message_falls_back_to_details() {
        let envelope = ErrorEnvelope::parse(r#"{"message":"","details":"phone is taken"}"#);
        assert_eq!(envelope.user_message().as_deref(), Some("phone is taken"));
    }

    #[test]
    fn validation_lists_are_joined() {
        let envelope =
            ErrorEnvelope::parse(r#"{"message":["title should not be empty","price must be positive"]}"#);
        assert_eq!(
            envelope.user_message().as_deref(),
            Some("title should not be empty; price must be positive")
        );
    }

    #[test]
    fn non_json_body_has_no_message() {
        let envelope = ErrorEnvelope::parse("<html>Bad Gateway</html>");
        assert_eq!(envelope, ErrorEnvelope::default());
        assert!(envelope.user_message().is_none());
    }
}
