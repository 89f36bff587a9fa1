//! Testimonial record schema.
//!
//! The store is schema-agnostic; this module gives documents in the
//! testimonial collection their meaning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use plaudit_core::error::Error;
use plaudit_core::{Document, DocumentId, FieldMap, Result};

/// Field holding the author name.
pub const FIELD_NAME: &str = "name";
/// Field holding the author position.
pub const FIELD_POSITION: &str = "position";
/// Field holding the testimonial text.
pub const FIELD_TESTIMONIAL: &str = "testimonial";
/// Field holding the comment sequence.
pub const FIELD_COMMENTS: &str = "comments";
/// Field holding the server-assigned creation timestamp.
pub const FIELD_CREATED_AT: &str = "createdAt";

/// A testimonial record as held in the view cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    /// The store-assigned id, stable for the record's lifetime.
    pub id: DocumentId,
    /// Author name.
    pub name: String,
    /// Author position.
    pub position: String,
    /// Testimonial text.
    pub testimonial: String,
    /// Append-only comment sequence, in append order.
    pub comments: Vec<String>,
    /// Server-assigned creation time; opaque to the view, shown as-is.
    pub created_at: Option<DateTime<Utc>>,
}

/// Serde shape of the testimonial fields inside a document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestimonialFields {
    name: String,
    position: String,
    testimonial: String,
    #[serde(default)]
    comments: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

/// Accept any value for the creation timestamp, keeping it only if it is
/// an RFC 3339 string. An unresolved server-timestamp sentinel or a
/// foreign encoding becomes `None` rather than poisoning the record.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

impl Testimonial {
    /// Decode a testimonial from a store document.
    ///
    /// Returns `None` for documents that do not carry the testimonial
    /// shape; such documents exist in the store but are not testimonials.
    pub fn from_document(doc: &Document) -> Option<Self> {
        match serde_json::from_value::<TestimonialFields>(doc.fields.as_value().clone()) {
            Ok(fields) => Some(Self {
                id: doc.id.clone(),
                name: fields.name,
                position: fields.position,
                testimonial: fields.testimonial,
                comments: fields.comments,
                created_at: fields.created_at,
            }),
            Err(e) => {
                warn!(id = %doc.id, error = %e, "Skipping document without testimonial shape");
                None
            }
        }
    }
}

/// The pending new-testimonial form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestimonialDraft {
    /// Author name.
    pub name: String,
    /// Author position.
    pub position: String,
    /// Testimonial text.
    pub testimonial: String,
}

impl TestimonialDraft {
    /// Create a draft from its three fields.
    pub fn new(
        name: impl Into<String>,
        position: impl Into<String>,
        testimonial: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
            testimonial: testimonial.into(),
        }
    }

    /// Check that every required field is non-empty after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyField`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            (FIELD_NAME, &self.name),
            (FIELD_POSITION, &self.position),
            (FIELD_TESTIMONIAL, &self.testimonial),
        ] {
            if value.trim().is_empty() {
                return Err(Error::EmptyField { field });
            }
        }
        Ok(())
    }

    /// Encode the draft as the create-command field map: the three fields
    /// as entered, an empty comment sequence, and a server-assigned
    /// creation timestamp.
    pub fn to_fields(&self) -> FieldMap {
        FieldMap::empty()
            .with_field(FIELD_NAME, json!(self.name))
            .with_field(FIELD_POSITION, json!(self.position))
            .with_field(FIELD_TESTIMONIAL, json!(self.testimonial))
            .with_field(FIELD_COMMENTS, json!([]))
            .with_server_timestamp(FIELD_CREATED_AT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, fields: Value) -> Document {
        Document {
            id: DocumentId::new(id).unwrap(),
            fields: FieldMap::new(fields).unwrap(),
        }
    }

    #[test]
    fn decode_full_document() {
        let doc = doc(
            "t1",
            json!({
                "name": "Ada",
                "position": "Engineer",
                "testimonial": "Great to work with.",
                "comments": ["agreed"],
                "createdAt": "2024-03-01T12:00:00Z",
            }),
        );

        let testimonial = Testimonial::from_document(&doc).unwrap();
        assert_eq!(testimonial.name, "Ada");
        assert_eq!(testimonial.comments, vec!["agreed"]);
        assert!(testimonial.created_at.is_some());
    }

    #[test]
    fn decode_defaults_missing_comments() {
        let doc = doc(
            "t1",
            json!({
                "name": "Ada",
                "position": "Engineer",
                "testimonial": "Great to work with.",
            }),
        );

        let testimonial = Testimonial::from_document(&doc).unwrap();
        assert!(testimonial.comments.is_empty());
        assert!(testimonial.created_at.is_none());
    }

    #[test]
    fn decode_tolerates_unresolved_timestamp() {
        let doc = doc(
            "t1",
            json!({
                "name": "Ada",
                "position": "Engineer",
                "testimonial": "Great to work with.",
                "createdAt": {"$serverTimestamp": true},
            }),
        );

        let testimonial = Testimonial::from_document(&doc).unwrap();
        assert!(testimonial.created_at.is_none());
    }

    #[test]
    fn decode_rejects_foreign_document() {
        let doc = doc("t1", json!({"kind": "not-a-testimonial"}));
        assert!(Testimonial::from_document(&doc).is_none());
    }

    #[test]
    fn draft_validation() {
        assert!(TestimonialDraft::new("Ada", "Engineer", "Great.").validate().is_ok());

        let err = TestimonialDraft::new("", "Engineer", "Great.")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::EmptyField { field: "name" }));

        let err = TestimonialDraft::new("Ada", "   ", "Great.")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::EmptyField { field: "position" }));

        let err = TestimonialDraft::new("Ada", "Engineer", "\t\n")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::EmptyField { field: "testimonial" }));
    }

    #[test]
    fn draft_encodes_create_fields() {
        let fields = TestimonialDraft::new("Ada", "Engineer", "Great.").to_fields();
        assert_eq!(fields.get(FIELD_NAME).unwrap(), "Ada");
        assert_eq!(fields.get(FIELD_COMMENTS).unwrap(), &json!([]));
        assert!(FieldMap::is_server_timestamp(
            fields.get(FIELD_CREATED_AT).unwrap()
        ));
    }
}
