//! Field vocabulary configuration
//!
//! The set of fields is data, not code: required and optional lists come from
//! configuration, and each field carries an optional prompt hint and a
//! normalization rule.

use crate::record::ExtractionRecord;
use std::collections::HashSet;
use std::fmt;

/// Provenance field holding the source file name (natural key for upserts)
pub const ORIGINAL_FILE_NAME_FIELD: &str = "original_file_name";

/// Provenance field holding the absolute source path
pub const FILE_PATH_FIELD: &str = "file_path";

/// Normalization applied to a field after extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationRule {
    /// Leave the value untouched
    #[default]
    None,
    /// Check the value against the email pattern (warn only)
    Email,
    /// Strip separators and re-hyphenate area-code shaped numbers
    Phone,
}

impl NormalizationRule {
    /// Rule used when configuration does not name one for the field
    pub fn default_for(field: &str) -> Self {
        match field {
            "responsible_person_email" => NormalizationRule::Email,
            "tel_number" => NormalizationRule::Phone,
            _ => NormalizationRule::None,
        }
    }

    /// Parse a rule name ("none", "email", "phone")
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Some(NormalizationRule::None),
            "email" => Some(NormalizationRule::Email),
            "phone" => Some(NormalizationRule::Phone),
            _ => None,
        }
    }
}

/// One entry of the field vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name (also the JSON key and table column)
    pub name: String,

    /// Whether a blank value makes the document incomplete
    pub required: bool,

    /// Extraction hint embedded in the prompt
    pub hint: Option<String>,

    /// Post-extraction normalization
    pub rule: NormalizationRule,
}

impl FieldSpec {
    /// Create a spec with the default rule for its name and no hint
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        let name = name.into();
        let rule = NormalizationRule::default_for(&name);
        Self {
            name,
            required,
            hint: None,
            rule,
        }
    }

    /// Attach a prompt hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Override the normalization rule
    pub fn with_rule(mut self, rule: NormalizationRule) -> Self {
        self.rule = rule;
        self
    }
}

/// Errors building a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Field name is not a plain identifier
    InvalidName(String),
    /// Field listed more than once
    Duplicate(String),
    /// Field collides with a provenance field
    Reserved(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::InvalidName(name) => {
                write!(f, "invalid field name '{}': expected [A-Za-z_][A-Za-z0-9_]*", name)
            }
            SchemaError::Duplicate(name) => write!(f, "field '{}' is listed more than once", name),
            SchemaError::Reserved(name) => {
                write!(f, "field '{}' is a reserved provenance field", name)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// The configured field vocabulary
///
/// Fields keep configuration order: required fields first, then optional.
///
/// # Examples
///
/// ```
/// use grantex_domain::{ExtractionRecord, FieldSchema};
///
/// let schema = FieldSchema::from_names(&["title_name"], &["area_name"]).unwrap();
/// let mut record = ExtractionRecord::empty_for(&schema);
/// assert!(!schema.is_complete(&record));
///
/// record.set_text("title_name", "Smart Factory Support");
/// assert!(schema.is_complete(&record));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    /// Build a schema from field specs, checking names
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for spec in &fields {
            if !is_identifier(&spec.name) {
                return Err(SchemaError::InvalidName(spec.name.clone()));
            }
            if spec.name == ORIGINAL_FILE_NAME_FIELD || spec.name == FILE_PATH_FIELD {
                return Err(SchemaError::Reserved(spec.name.clone()));
            }
            if !seen.insert(spec.name.clone()) {
                return Err(SchemaError::Duplicate(spec.name.clone()));
            }
        }

        // Required fields lead so prompts and artifacts list them first
        let (mut ordered, optional): (Vec<_>, Vec<_>) =
            fields.into_iter().partition(|spec| spec.required);
        ordered.extend(optional);

        Ok(Self { fields: ordered })
    }

    /// Build a schema from plain name lists with default rules
    pub fn from_names<R, O>(required: &[R], optional: &[O]) -> Result<Self, SchemaError>
    where
        R: AsRef<str>,
        O: AsRef<str>,
    {
        let fields = required
            .iter()
            .map(|name| FieldSpec::new(name.as_ref(), true))
            .chain(optional.iter().map(|name| FieldSpec::new(name.as_ref(), false)))
            .collect();
        Self::new(fields)
    }

    /// All field specs, required first
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a spec by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Required field specs
    pub fn required(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|spec| spec.required)
    }

    /// Optional field specs
    pub fn optional(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|spec| !spec.required)
    }

    /// Whether the name belongs to the vocabulary or provenance fields
    pub fn is_known(&self, name: &str) -> bool {
        name == ORIGINAL_FILE_NAME_FIELD || name == FILE_PATH_FIELD || self.field(name).is_some()
    }

    /// Every column persisted for a record: vocabulary then provenance
    pub fn all_columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|spec| spec.name.as_str())
            .chain([ORIGINAL_FILE_NAME_FIELD, FILE_PATH_FIELD])
            .collect()
    }

    /// Every required field is present and non-blank after trimming
    pub fn is_complete(&self, record: &ExtractionRecord) -> bool {
        self.required().all(|spec| !record.is_blank(&spec.name))
    }

    /// Names of required fields that are absent or blank
    pub fn missing_required(&self, record: &ExtractionRecord) -> Vec<&str> {
        self.required()
            .filter(|spec| record.is_blank(&spec.name))
            .map(|spec| spec.name.as_str())
            .collect()
    }
}

/// Plain SQL-safe identifier check
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_come_first() {
        let schema = FieldSchema::new(vec![
            FieldSpec::new("area_name", false),
            FieldSpec::new("title_name", true),
        ])
        .unwrap();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["title_name", "area_name"]);
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert_eq!(
            FieldSchema::from_names(&["title name"], &[] as &[&str]),
            Err(SchemaError::InvalidName("title name".to_string()))
        );
        assert_eq!(
            FieldSchema::from_names(&["1title"], &[] as &[&str]),
            Err(SchemaError::InvalidName("1title".to_string()))
        );
    }

    #[test]
    fn test_duplicates_rejected() {
        let result = FieldSchema::from_names(&["title_name"], &["title_name"]);
        assert_eq!(result, Err(SchemaError::Duplicate("title_name".to_string())));
    }

    #[test]
    fn test_provenance_names_reserved() {
        let result = FieldSchema::from_names(&["original_file_name"], &[] as &[&str]);
        assert!(matches!(result, Err(SchemaError::Reserved(_))));
    }

    #[test]
    fn test_default_rules() {
        let schema =
            FieldSchema::from_names(&["title_name"], &["tel_number", "responsible_person_email"])
                .unwrap();
        assert_eq!(schema.field("tel_number").unwrap().rule, NormalizationRule::Phone);
        assert_eq!(
            schema.field("responsible_person_email").unwrap().rule,
            NormalizationRule::Email
        );
        assert_eq!(schema.field("title_name").unwrap().rule, NormalizationRule::None);
    }

    #[test]
    fn test_missing_required() {
        let schema = FieldSchema::from_names(&["a", "b", "c"], &["d"]).unwrap();
        let mut record = ExtractionRecord::new();
        record.set_text("a", "x");
        record.set_text("b", "  ");
        assert_eq!(schema.missing_required(&record), vec!["b", "c"]);
        assert!(!schema.is_complete(&record));
    }

    #[test]
    fn test_all_columns_include_provenance() {
        let schema = FieldSchema::from_names(&["a"], &["b"]).unwrap();
        assert_eq!(
            schema.all_columns(),
            vec!["a", "b", ORIGINAL_FILE_NAME_FIELD, FILE_PATH_FIELD]
        );
        assert!(schema.is_known(FILE_PATH_FIELD));
        assert!(!schema.is_known("zzz"));
    }

    #[test]
    fn test_rule_parse() {
        assert_eq!(NormalizationRule::parse("Phone"), Some(NormalizationRule::Phone));
        assert_eq!(NormalizationRule::parse("none"), Some(NormalizationRule::None));
        assert_eq!(NormalizationRule::parse("fax"), None);
    }
}
