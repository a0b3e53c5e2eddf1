//! Note records and delete selectors.
//!
//! A note is a schemaless JSON document with two typed fields, `Title` and
//! `Content`. Every other field a client sends is kept verbatim in
//! [`Note::extra`] and written back out unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire name of the title field.
pub const TITLE_FIELD: &str = "Title";

/// Wire name of the content field.
pub const CONTENT_FIELD: &str = "Content";

/// Title of the placeholder returned when no note matches.
pub const PLACEHOLDER_TITLE: &str = "Untitled";

/// A titled text record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Business key; the first stored match for a title is authoritative.
    #[serde(rename = "Title")]
    pub title: String,

    /// Opaque text, usually markdown rendered by the client.
    #[serde(rename = "Content", default)]
    pub content: String,

    /// Client-supplied fields other than `Title` and `Content`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Why a request payload could not be turned into a note or selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// Nothing was sent.
    #[error("request body is empty")]
    Empty,
    /// Body is not valid JSON of the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
    /// `Title` is present but empty.
    #[error("note title must not be empty")]
    EmptyTitle,
    /// Selector object has no fields.
    #[error("selector must name at least one field")]
    EmptySelector,
    /// Query string is not valid percent-encoded UTF-8.
    #[error("malformed query: {0}")]
    MalformedQuery(String),
}

impl Note {
    /// Create a note with no extra fields.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            extra: Map::new(),
        }
    }

    /// The transient `{Title: "Untitled", Content: ""}` note.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_TITLE, "")
    }

    /// Parse a request body into a note.
    ///
    /// The body must be a JSON object carrying a non-empty string `Title`.
    /// A missing `Content` becomes the empty string.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] describing why the body was rejected.
    pub fn from_json(body: &[u8]) -> Result<Self, PayloadError> {
        if body.is_empty() {
            return Err(PayloadError::Empty);
        }
        let note: Self =
            serde_json::from_slice(body).map_err(|e| PayloadError::Malformed(e.to_string()))?;
        if note.title.is_empty() {
            return Err(PayloadError::EmptyTitle);
        }
        Ok(note)
    }

    /// Rebuild a note from a stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document lacks a string `Title`.
    pub fn from_document(document: Map<String, Value>) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(document))
    }

    /// Flatten the note into the document persisted by a store.
    #[must_use]
    pub fn to_document(&self) -> Map<String, Value> {
        let mut document = self.extra.clone();
        document.insert(TITLE_FIELD.to_string(), Value::String(self.title.clone()));
        document.insert(
            CONTENT_FIELD.to_string(),
            Value::String(self.content.clone()),
        );
        document
    }
}

/// A partial document addressing notes by field equality.
///
/// `{"Title": "A"}` matches every note titled `A`; a full note record
/// matches only notes equal to it in every listed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(Map<String, Value>);

impl Selector {
    /// Selector matching on title alone.
    #[must_use]
    pub fn by_title(title: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TITLE_FIELD.to_string(), Value::String(title.into()));
        Self(fields)
    }

    /// Parse a request body into a selector.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] if the body is empty, is not a JSON
    /// object, or names no fields.
    pub fn from_json(body: &[u8]) -> Result<Self, PayloadError> {
        if body.is_empty() {
            return Err(PayloadError::Empty);
        }
        let fields: Map<String, Value> =
            serde_json::from_slice(body).map_err(|e| PayloadError::Malformed(e.to_string()))?;
        if fields.is_empty() {
            return Err(PayloadError::EmptySelector);
        }
        Ok(Self(fields))
    }

    /// Selector fields.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The `Title` this selector pins, if it pins one as a string.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.0.get(TITLE_FIELD).and_then(Value::as_str)
    }

    /// Whether every selector field is present and equal in `document`.
    ///
    /// Numbers compare by value, so `1` and `1.0` are the same field value.
    #[must_use]
    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        self.0.iter().all(|(key, expected)| {
            document
                .get(key)
                .is_some_and(|actual| values_equal(expected, actual))
        })
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

impl From<Map<String, Value>> for Selector {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholder() {
        let note = Note::placeholder();
        assert_eq!(note.title, "Untitled");
        assert_eq!(note.content, "");
        assert!(note.extra.is_empty());
    }

    #[test]
    fn test_placeholder_wire_shape() {
        let value = serde_json::to_value(Note::placeholder()).unwrap();
        assert_eq!(value, json!({"Title": "Untitled", "Content": ""}));
    }

    #[test]
    fn test_from_json_keeps_extra_fields() {
        let body = br#"{"Title": "A", "Content": "x", "tags": ["work"], "pinned": true}"#;
        let note = Note::from_json(body).unwrap();

        assert_eq!(note.title, "A");
        assert_eq!(note.content, "x");
        assert_eq!(note.extra.get("tags"), Some(&json!(["work"])));
        assert_eq!(note.extra.get("pinned"), Some(&json!(true)));
        assert!(!note.extra.contains_key("Title"));
    }

    #[test]
    fn test_from_json_defaults_content() {
        let note = Note::from_json(br#"{"Title": "A"}"#).unwrap();
        assert_eq!(note.content, "");
    }

    #[test]
    fn test_from_json_empty_body() {
        assert_eq!(Note::from_json(b""), Err(PayloadError::Empty));
    }

    #[test]
    fn test_from_json_missing_title() {
        let err = Note::from_json(br#"{"Content": "x"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn test_from_json_non_string_title() {
        let err = Note::from_json(br#"{"Title": 42}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn test_from_json_not_json() {
        let err = Note::from_json(b"Title=A").unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn test_from_json_empty_title() {
        assert_eq!(
            Note::from_json(br#"{"Title": "", "Content": "x"}"#),
            Err(PayloadError::EmptyTitle)
        );
    }

    #[test]
    fn test_document_round_trip() {
        let mut note = Note::new("A", "body");
        note.extra.insert("color".to_string(), json!("blue"));

        let document = note.to_document();
        assert_eq!(document.get("Title"), Some(&json!("A")));
        assert_eq!(document.get("Content"), Some(&json!("body")));
        assert_eq!(document.get("color"), Some(&json!("blue")));

        assert_eq!(Note::from_document(document).unwrap(), note);
    }

    #[test]
    fn test_from_document_without_title() {
        let mut document = Map::new();
        document.insert("Content".to_string(), json!("orphan"));
        assert!(Note::from_document(document).is_err());
    }

    #[test]
    fn test_selector_by_title_matches() {
        let selector = Selector::by_title("A");
        assert_eq!(selector.title(), Some("A"));
        assert!(selector.matches(&Note::new("A", "x").to_document()));
        assert!(!selector.matches(&Note::new("B", "x").to_document()));
    }

    #[test]
    fn test_selector_full_record_requires_every_field() {
        let selector = Selector::from_json(br#"{"Title": "A", "Content": "x"}"#).unwrap();
        assert!(selector.matches(&Note::new("A", "x").to_document()));
        assert!(!selector.matches(&Note::new("A", "y").to_document()));
    }

    #[test]
    fn test_selector_missing_field_does_not_match() {
        let selector = Selector::from_json(br#"{"Title": "A", "color": "red"}"#).unwrap();
        assert!(!selector.matches(&Note::new("A", "x").to_document()));
    }

    #[test]
    fn test_selector_from_json_rejections() {
        assert_eq!(Selector::from_json(b""), Err(PayloadError::Empty));
        assert_eq!(Selector::from_json(b"{}"), Err(PayloadError::EmptySelector));
        assert!(matches!(
            Selector::from_json(b"[\"A\"]"),
            Err(PayloadError::Malformed(_))
        ));
        assert!(matches!(
            Selector::from_json(b"{not json"),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn test_selector_title_ignores_non_strings() {
        let selector = Selector::from_json(br#"{"Title": 7}"#).unwrap();
        assert_eq!(selector.title(), None);
    }

    #[test]
    fn test_selector_numbers_compare_by_value() {
        let mut note = Note::new("A", "x");
        note.extra.insert("n".to_string(), json!(1));
        note.extra.insert("dims".to_string(), json!({"w": 2, "h": [3]}));
        let document = note.to_document();

        let selector = Selector::from_json(br#"{"n": 1.0}"#).unwrap();
        assert!(selector.matches(&document));

        let selector = Selector::from_json(br#"{"dims": {"w": 2.0, "h": [3.0]}}"#).unwrap();
        assert!(selector.matches(&document));

        let selector = Selector::from_json(br#"{"n": 1.5}"#).unwrap();
        assert!(!selector.matches(&document));

        let selector = Selector::from_json(br#"{"n": "1"}"#).unwrap();
        assert!(!selector.matches(&document));
    }
}
