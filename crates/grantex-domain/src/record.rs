//! Extraction records - the unit of data flowing through the pipeline

use crate::schema::FieldSchema;
use std::fmt;

/// A single field value as returned by the extraction engine
///
/// The model is instructed to answer with strings only. Anything else is kept
/// as `NonText` so validation can report it instead of silently losing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A string value (possibly empty)
    Text(String),

    /// A non-string JSON value
    NonText {
        /// JSON type name ("number", "bool", "array", "object")
        kind: &'static str,
        /// Compact JSON rendering of the value
        raw: String,
    },
}

impl FieldValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Get the string view of the value, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::NonText { .. } => None,
        }
    }

    /// A value is blank when it is text that is empty after trimming
    ///
    /// Non-text values are never blank: they carry *something*.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::NonText { .. } => false,
        }
    }

    /// Convert into a string, rendering non-text values as their JSON text
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::NonText { raw, .. } => raw,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::NonText { raw, .. } => write!(f, "{}", raw),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// An ordered mapping from field name to value
///
/// Insertion order is preserved so artifacts list fields in schema order.
/// Setting an existing field replaces its value in place.
///
/// # Examples
///
/// ```
/// use grantex_domain::ExtractionRecord;
///
/// let mut record = ExtractionRecord::new();
/// record.set_text("title_name", "2025 Export Voucher Program");
/// record.set_text("tel_number", "");
///
/// assert_eq!(record.text("title_name"), Some("2025 Export Voucher Program"));
/// assert!(record.is_blank("tel_number"));
/// assert!(record.is_blank("area_name"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRecord {
    fields: Vec<(String, FieldValue)>,
}

impl ExtractionRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record with every required and optional field set to `""`
    pub fn empty_for(schema: &FieldSchema) -> Self {
        let mut record = Self::new();
        for spec in schema.fields() {
            record.set_text(&spec.name, "");
        }
        record
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Get a field as a string, `None` when absent or non-text
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    /// Whether the field is present (blank or not)
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Whether the field is absent or blank
    pub fn is_blank(&self, field: &str) -> bool {
        self.get(field).map_or(true, FieldValue::is_blank)
    }

    /// Set a field, replacing any existing value in place
    pub fn set(&mut self, field: &str, value: FieldValue) {
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| name == field) {
            slot.1 = value;
        } else {
            self.fields.push((field.to_string(), value));
        }
    }

    /// Set a field to a string value
    pub fn set_text(&mut self, field: &str, value: impl Into<String>) {
        self.set(field, FieldValue::Text(value.into()));
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(name, _)| name == field)?;
        Some(self.fields.remove(idx).1)
    }

    /// Iterate over fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Merge another record into this one, filling gaps only
    ///
    /// A field from `other` is adopted when its value is non-blank and the
    /// current value is blank or absent. Populated fields are never
    /// overwritten, so merging is idempotent.
    ///
    /// Returns the names of the fields that were filled.
    ///
    /// # Examples
    ///
    /// ```
    /// use grantex_domain::ExtractionRecord;
    ///
    /// let mut base = ExtractionRecord::new();
    /// base.set_text("title_name", "Original title");
    /// base.set_text("notice_date", "");
    ///
    /// let mut fallback = ExtractionRecord::new();
    /// fallback.set_text("title_name", "Other title");
    /// fallback.set_text("notice_date", "2025-03-02");
    ///
    /// let filled = base.merge_from(&fallback);
    /// assert_eq!(filled, vec!["notice_date".to_string()]);
    /// assert_eq!(base.text("title_name"), Some("Original title"));
    /// assert_eq!(base.text("notice_date"), Some("2025-03-02"));
    /// ```
    pub fn merge_from(&mut self, other: &ExtractionRecord) -> Vec<String> {
        let mut filled = Vec::new();
        for (name, value) in other.fields() {
            if value.is_blank() || !self.is_blank(name) {
                continue;
            }
            self.set(name, value.clone());
            filled.push(name.to_string());
        }
        filled
    }
}

impl FromIterator<(String, FieldValue)> for ExtractionRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.set(&name, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(pairs: &[(&str, &str)]) -> ExtractionRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::text(*v)))
            .collect()
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut r = record(&[("a", "1"), ("b", "2")]);
        r.set_text("a", "3");
        let names: Vec<_> = r.field_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(r.text("a"), Some("3"));
    }

    #[test]
    fn test_blank_detection() {
        let mut r = record(&[("a", "   "), ("b", "x")]);
        r.set(
            "c",
            FieldValue::NonText {
                kind: "number",
                raw: "0".to_string(),
            },
        );
        assert!(r.is_blank("a"));
        assert!(!r.is_blank("b"));
        assert!(!r.is_blank("c"));
        assert!(r.is_blank("missing"));
        assert_eq!(r.text("c"), None);
    }

    #[test]
    fn test_remove() {
        let mut r = record(&[("a", "1"), ("b", "2")]);
        assert_eq!(r.remove("a"), Some(FieldValue::text("1")));
        assert_eq!(r.remove("a"), None);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_merge_fills_only_blank_fields() {
        let mut a = record(&[("title", "A"), ("date", " "), ("area", "")]);
        let b = record(&[("title", "B"), ("date", "2025-01-01"), ("url", "http://x")]);

        let filled = a.merge_from(&b);

        assert_eq!(a.text("title"), Some("A"));
        assert_eq!(a.text("date"), Some("2025-01-01"));
        assert_eq!(a.text("area"), Some(""));
        assert_eq!(a.text("url"), Some("http://x"));
        assert_eq!(filled, vec!["date".to_string(), "url".to_string()]);
    }

    #[test]
    fn test_merge_ignores_blank_incoming() {
        let mut a = record(&[("title", "")]);
        let b = record(&[("title", "   ")]);
        assert!(a.merge_from(&b).is_empty());
        assert_eq!(a.text("title"), Some(""));
    }

    fn arb_record() -> impl Strategy<Value = ExtractionRecord> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["title", "date", "area", "url", "phone"]),
                prop::sample::select(vec!["", " ", "x", "2025-01-01", "Seoul"]),
            ),
            0..8,
        )
        .prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), FieldValue::text(v)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_merge_never_overwrites_populated(a in arb_record(), b in arb_record()) {
            let mut merged = a.clone();
            merged.merge_from(&b);

            for (name, value) in a.fields() {
                if !value.is_blank() {
                    prop_assert_eq!(merged.get(name), Some(value));
                }
            }
        }

        #[test]
        fn prop_merge_adopts_into_blank(a in arb_record(), b in arb_record()) {
            let mut merged = a.clone();
            merged.merge_from(&b);

            for (name, value) in b.fields() {
                if !value.is_blank() && a.is_blank(name) {
                    prop_assert_eq!(merged.get(name), Some(value));
                }
            }
        }

        #[test]
        fn prop_merge_is_idempotent(a in arb_record(), b in arb_record()) {
            let mut once = a.clone();
            once.merge_from(&b);
            let mut twice = once.clone();
            twice.merge_from(&b);
            prop_assert_eq!(once, twice);
        }
    }
}
