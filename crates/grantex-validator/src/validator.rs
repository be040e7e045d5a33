//! Record validation logic

use crate::config::{PatternConfig, ValidationConfig, ValidationPolicy};
use crate::error::ValidationError;
use grantex_domain::{
    ExtractionRecord, FieldSchema, FieldValue, NormalizationRule, FILE_PATH_FIELD,
    ORIGINAL_FILE_NAME_FIELD,
};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, warn};

static NON_DIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d+]").expect("dial-character pattern is valid"));

static AREA_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2,3})(\d{3,4})(\d{4})$").expect("area-code pattern is valid")
});

/// Compiled validation patterns
///
/// Built once from `PatternConfig`. The department, date, title and section
/// patterns are not used to reject anything; they are available to callers
/// and feed debug diagnostics.
#[derive(Debug, Clone)]
pub struct ValidatorPatterns {
    /// E-mail address shape
    pub email: Regex,
    /// Telephone number shape
    pub phone: Regex,
    /// Department and person name
    pub department: Regex,
    /// Numeric date
    pub date: Regex,
    /// Markdown title heading
    pub title: Regex,
    /// Contact section
    pub contact_section: Regex,
    /// Application-method section
    pub application_section: Regex,
}

impl ValidatorPatterns {
    /// Compile every configured pattern
    pub fn compile(config: &PatternConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            email: compile("email", &config.email)?,
            phone: compile("phone", &config.phone)?,
            department: compile("department", &config.department)?,
            date: compile("date", &config.date)?,
            title: compile("title", &config.title)?,
            contact_section: compile("contact_section", &config.contact_section)?,
            application_section: compile("application_section", &config.application_section)?,
        })
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, ValidationError> {
    Regex::new(pattern).map_err(|source| ValidationError::InvalidPattern { name, source })
}

/// Whether `re` matches at the very start of `text`
fn matches_at_start(re: &Regex, text: &str) -> bool {
    re.find(text).is_some_and(|m| m.start() == 0)
}

/// A problem found while validating a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A required field was absent or blank
    MissingRequired {
        /// Field name
        field: String,
    },

    /// A field outside the vocabulary was dropped
    UnknownField {
        /// Field name
        field: String,
    },

    /// A field carried a number, bool, array or object
    NonTextValue {
        /// Field name
        field: String,
        /// JSON type name
        kind: &'static str,
    },

    /// An e-mail field did not look like an address (value kept)
    EmailFormat {
        /// Field name
        field: String,
        /// Offending value
        value: String,
    },

    /// A phone field could not be normalized and did not look like a number (value kept)
    PhoneFormat {
        /// Field name
        field: String,
        /// Offending value
        value: String,
    },
}

impl Violation {
    /// Field the violation refers to
    pub fn field(&self) -> &str {
        match self {
            Violation::MissingRequired { field }
            | Violation::UnknownField { field }
            | Violation::NonTextValue { field, .. }
            | Violation::EmailFormat { field, .. }
            | Violation::PhoneFormat { field, .. } => field,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingRequired { field } => {
                write!(f, "required field '{}' is missing", field)
            }
            Violation::UnknownField { field } => write!(f, "unknown field '{}' dropped", field),
            Violation::NonTextValue { field, kind } => {
                write!(f, "field '{}' holds a {} instead of a string", field, kind)
            }
            Violation::EmailFormat { field, value } => {
                write!(f, "invalid e-mail in '{}': {}", field, value)
            }
            Violation::PhoneFormat { field, value } => {
                write!(f, "invalid phone number in '{}': {}", field, value)
            }
        }
    }
}

/// Result of validating a record
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Completed and normalized record, fields in schema order
    pub record: ExtractionRecord,

    /// Problems found, in the order they were detected
    pub violations: Vec<Violation>,
}

impl ValidationOutcome {
    /// Whether validation found nothing to report
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Fields that carried non-text values
    pub fn non_text_fields(&self) -> Vec<String> {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::NonTextValue { .. }))
            .map(|v| v.field().to_string())
            .collect()
    }
}

/// Normalize a telephone number to `area-mid-end` form
///
/// Everything except digits and `+` is stripped; when the remainder is a
/// 2-3 digit area code followed by 3-4 and 4 digits it is rewritten with
/// hyphens. Returns `None` when the number does not fit that shape.
///
/// # Examples
///
/// ```
/// use grantex_validator::normalize_phone;
///
/// assert_eq!(normalize_phone("(053) 655-5609").as_deref(), Some("053-655-5609"));
/// assert_eq!(normalize_phone("031.1234.5678").as_deref(), Some("031-1234-5678"));
/// assert_eq!(normalize_phone("+82 53 655 5609"), None);
/// ```
pub fn normalize_phone(value: &str) -> Option<String> {
    let dialable = NON_DIAL_RE.replace_all(value, "");
    AREA_CODE_RE
        .captures(&dialable)
        .map(|caps| format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

/// The RecordValidator brings records into the shape the artifact and table expect
pub struct RecordValidator {
    schema: FieldSchema,
    policy: ValidationPolicy,
    patterns: ValidatorPatterns,
}

impl RecordValidator {
    /// Create a validator, compiling every configured pattern
    pub fn new(schema: FieldSchema, config: ValidationConfig) -> Result<Self, ValidationError> {
        let patterns = ValidatorPatterns::compile(&config.patterns)?;
        Ok(Self {
            schema,
            policy: config.policy,
            patterns,
        })
    }

    /// Create a validator with default patterns and policy
    pub fn with_defaults(schema: FieldSchema) -> Result<Self, ValidationError> {
        Self::new(schema, ValidationConfig::default())
    }

    /// Compiled patterns
    pub fn patterns(&self) -> &ValidatorPatterns {
        &self.patterns
    }

    /// Configured policy
    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Field vocabulary
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Validate a record without applying the policy
    ///
    /// The returned record contains every vocabulary field in schema order,
    /// followed by whichever provenance fields the input carried. Non-text
    /// values are left in place and reported.
    pub fn validate(&self, record: &ExtractionRecord, label: &str) -> ValidationOutcome {
        let mut violations = Vec::new();
        let mut validated = ExtractionRecord::new();

        for spec in self.schema.fields() {
            let value = match record.get(&spec.name) {
                Some(value) => value.clone(),
                None if spec.required => FieldValue::Text(String::new()),
                None => {
                    debug!("{} Optional field '{}' absent, set to empty", label, spec.name);
                    FieldValue::Text(String::new())
                }
            };

            if spec.required && value.is_blank() {
                warn!("{} Required field '{}' is missing", label, spec.name);
                violations.push(Violation::MissingRequired {
                    field: spec.name.clone(),
                });
            }

            let value = match value {
                FieldValue::Text(text) => FieldValue::Text(self.apply_rule(
                    &spec.name,
                    spec.rule,
                    text,
                    label,
                    &mut violations,
                )),
                FieldValue::NonText { kind, raw } => {
                    warn!(
                        "{} Field '{}' holds a {} instead of a string",
                        label, spec.name, kind
                    );
                    violations.push(Violation::NonTextValue {
                        field: spec.name.clone(),
                        kind,
                    });
                    FieldValue::NonText { kind, raw }
                }
            };

            validated.set(&spec.name, value);
        }

        for provenance in [ORIGINAL_FILE_NAME_FIELD, FILE_PATH_FIELD] {
            if let Some(value) = record.get(provenance) {
                validated.set(provenance, value.clone());
            }
        }

        for name in record.field_names() {
            if !self.schema.is_known(name) && !is_provenance(name) {
                warn!("{} Unknown field '{}' dropped", label, name);
                violations.push(Violation::UnknownField {
                    field: name.to_string(),
                });
            }
        }

        self.log_diagnostics(&validated, label);

        ValidationOutcome {
            record: validated,
            violations,
        }
    }

    /// Validate a record and apply the configured policy
    ///
    /// Under `LogOnly` non-text values are coerced to their JSON text, so the
    /// returned record holds only strings. Under `RejectNonText` any non-text
    /// value yields `ValidationError::Rejected`.
    pub fn validate_and_normalize(
        &self,
        record: &ExtractionRecord,
        label: &str,
    ) -> Result<ExtractionRecord, ValidationError> {
        let outcome = self.validate(record, label);

        let non_text = outcome.non_text_fields();
        if !non_text.is_empty() && self.policy == ValidationPolicy::RejectNonText {
            return Err(ValidationError::Rejected { fields: non_text });
        }

        Ok(outcome
            .record
            .fields()
            .map(|(name, value)| (name.to_string(), FieldValue::Text(value.to_string())))
            .collect())
    }

    fn apply_rule(
        &self,
        field: &str,
        rule: NormalizationRule,
        text: String,
        label: &str,
        violations: &mut Vec<Violation>,
    ) -> String {
        if text.is_empty() {
            return text;
        }

        match rule {
            NormalizationRule::None => text,
            NormalizationRule::Email => {
                if !matches_at_start(&self.patterns.email, &text) {
                    warn!("{} Invalid e-mail format: {}", label, text);
                    violations.push(Violation::EmailFormat {
                        field: field.to_string(),
                        value: text.clone(),
                    });
                }
                text
            }
            NormalizationRule::Phone => match normalize_phone(&text) {
                Some(normalized) => normalized,
                None => {
                    if !matches_at_start(&self.patterns.phone, &text) {
                        warn!("{} Invalid phone number format: {}", label, text);
                        violations.push(Violation::PhoneFormat {
                            field: field.to_string(),
                            value: text.clone(),
                        });
                    }
                    text
                }
            },
        }
    }

    fn log_diagnostics(&self, record: &ExtractionRecord, label: &str) {
        for (name, value) in record.fields() {
            if !name.ends_with("_date") {
                continue;
            }
            if let Some(text) = value.as_text() {
                if !text.trim().is_empty() && !self.patterns.date.is_match(text) {
                    debug!("{} Field '{}' has no numeric date: {}", label, name, text);
                }
            }
        }
    }
}

fn is_provenance(name: &str) -> bool {
    name == ORIGINAL_FILE_NAME_FIELD || name == FILE_PATH_FIELD
}
