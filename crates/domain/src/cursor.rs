use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use netscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Opaque pagination token encoding the sort key of the last returned record.
///
/// The cursor carries a key position, never an offset, so resumption stays
/// correct under concurrent inserts beyond the current page: a follow-up query
/// ranges strictly after `(occurred_at, event_id)` in the same ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    occurred_at: DateTime<Utc>,
    event_id: String,
}

impl PageCursor {
    /// Creates a cursor positioned at the given sort key.
    #[must_use]
    pub fn new(occurred_at: DateTime<Utc>, event_id: impl Into<String>) -> Self {
        Self {
            occurred_at,
            event_id: event_id.into(),
        }
    }

    /// Returns the timestamp component of the sort key.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the event identifier component of the sort key.
    #[must_use]
    pub fn event_id(&self) -> &str {
        self.event_id.as_str()
    }

    /// Encodes the cursor into its opaque transport form.
    #[must_use]
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes an opaque token back into a cursor.
    ///
    /// Any failure maps to [`AppError::InvalidCursor`]; the caller restarts
    /// pagination from the beginning of the range.
    pub fn decode(token: &str) -> AppResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.as_bytes())
            .map_err(|error| AppError::InvalidCursor(format!("token is not base64: {error}")))?;
        let cursor: Self = serde_json::from_slice(&bytes)
            .map_err(|error| AppError::InvalidCursor(format!("token payload invalid: {error}")))?;

        if cursor.event_id.trim().is_empty() {
            return Err(AppError::InvalidCursor(
                "token is missing an event identifier".to_owned(),
            ));
        }

        Ok(cursor)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use netscope_core::AppError;
    use proptest::prelude::*;

    use super::PageCursor;

    #[test]
    fn encode_then_decode_preserves_sort_key() {
        let occurred_at = Utc
            .with_ymd_and_hms(2026, 1, 22, 15, 55, 0)
            .single()
            .unwrap_or_else(|| unreachable!());
        let cursor = PageCursor::new(occurred_at, "e1");

        let decoded = PageCursor::decode(cursor.encode().as_str());
        assert!(decoded.is_ok());
        if let Ok(decoded) = decoded {
            assert_eq!(decoded, cursor);
        }
    }

    #[test]
    fn garbage_token_is_rejected() {
        let result = PageCursor::decode("not-a-cursor!");
        assert!(matches!(result, Err(AppError::InvalidCursor(_))));
    }

    #[test]
    fn valid_base64_with_wrong_payload_is_rejected() {
        use base64::Engine;
        let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"{\"page\":3}");
        let result = PageCursor::decode(token.as_str());
        assert!(matches!(result, Err(AppError::InvalidCursor(_))));
    }

    proptest! {
        #[test]
        fn decode_never_panics_on_arbitrary_input(token in ".*") {
            let _ = PageCursor::decode(token.as_str());
        }
    }
}
