//! Validator configuration

use serde::{Deserialize, Serialize};

/// What to do with values the model returned as something other than a string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Report the violation, coerce the value to its JSON text and continue
    #[default]
    LogOnly,

    /// Fail the record
    RejectNonText,
}

impl ValidationPolicy {
    /// Parse a policy name (`log_only` or `reject_non_text`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "log_only" => Some(ValidationPolicy::LogOnly),
            "reject_non_text" => Some(ValidationPolicy::RejectNonText),
            _ => None,
        }
    }
}

/// Regular expressions used by validation and diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// E-mail address shape
    pub email: String,
    /// Telephone number shape, with optional country code
    pub phone: String,
    /// Department name followed by a person's name
    pub department: String,
    /// Numeric date (`2025.03.02`, `2025-3-2`, `2025/03/02`)
    pub date: String,
    /// Markdown level-one heading
    pub title: String,
    /// Contact section heading and its body
    pub contact_section: String,
    /// Application-method section heading and its body
    pub application_section: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            email: r"[\w\.-]+@[\w\.-]+\.\w+".to_string(),
            phone: r"(?:\+\d{1,3}[-\s]?)?\d{2,3}[-\s]?\d{3,4}[-\s]?\d{4}".to_string(),
            department: r"([가-힣]+(?:과|팀|실|국|부))[^\n]*?([가-힣]{2,4})\s*(?:담당|$)"
                .to_string(),
            date: r"\d{4}[./-]\d{1,2}[./-]\d{1,2}".to_string(),
            title: r"(?m)^#\s+(.+)$".to_string(),
            contact_section: r"(?:문의처|담당자|연락처|문의)[\s:]*\n*((?:[^\n]+\n?)+)".to_string(),
            application_section: r"(?:신청방법|접수방법|지원방법)[\s:]*\n*((?:[^\n]+\n?)+)"
                .to_string(),
        }
    }
}

/// Configuration for the RecordValidator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// How non-text values are handled
    pub policy: ValidationPolicy,

    /// Patterns compiled at construction
    pub patterns: PatternConfig,
}

impl ValidationConfig {
    /// Create a strict configuration (non-text values fail the record)
    pub fn strict() -> Self {
        Self {
            policy: ValidationPolicy::RejectNonText,
            ..Default::default()
        }
    }
}
