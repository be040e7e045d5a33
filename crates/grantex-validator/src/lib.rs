//! Grantex Validator
//!
//! Shape and type checks applied to every record before it is written.
//!
//! The RecordValidator provides:
//! - Field completion (every vocabulary field present, blanks as `""`)
//! - Unknown-field removal
//! - Non-text value detection, handled according to a `ValidationPolicy`
//! - E-mail format checks and telephone number normalization
//!
//! Validation never judges whether a value is *true*; it only makes the
//! record well-shaped and reports what it had to fix.
//!
//! # Examples
//!
//! ```
//! use grantex_domain::{ExtractionRecord, FieldSchema};
//! use grantex_validator::{RecordValidator, ValidationConfig};
//!
//! let schema = FieldSchema::from_names(&["title_name"], &["tel_number"]).unwrap();
//! let validator = RecordValidator::new(schema, ValidationConfig::default()).unwrap();
//!
//! let mut record = ExtractionRecord::new();
//! record.set_text("title_name", "Export Voucher");
//! record.set_text("tel_number", "053 655 5609");
//!
//! let record = validator.validate_and_normalize(&record, "[notice.md]").unwrap();
//! assert_eq!(record.text("tel_number"), Some("053-655-5609"));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::{PatternConfig, ValidationConfig, ValidationPolicy};
pub use error::ValidationError;
pub use validator::{
    normalize_phone, RecordValidator, ValidationOutcome, ValidatorPatterns, Violation,
};
