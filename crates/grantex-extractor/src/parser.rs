//! Parse LLM output into an extraction record

use crate::error::ExtractorError;
use grantex_domain::{ExtractionRecord, FieldValue};
use serde_json::Value;

/// Parse an LLM response into an `ExtractionRecord`
///
/// The response must be a single JSON object, optionally wrapped in a fenced
/// code block. `null` values are treated as absent, strings become
/// `FieldValue::Text`, and any other JSON type becomes `FieldValue::NonText`.
///
/// # Examples
///
/// ```
/// use grantex_extractor::parse_llm_response;
///
/// let response = "```json\n{\"title_name\": \"Export Voucher\", \"support_amount\": 5000}\n```";
/// let record = parse_llm_response(response).unwrap();
///
/// assert_eq!(record.text("title_name"), Some("Export Voucher"));
/// assert!(record.text("support_amount").is_none());
/// assert!(record.contains("support_amount"));
/// ```
pub fn parse_llm_response(response: &str) -> Result<ExtractionRecord, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)?;

    let object = json
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON object".to_string()))?;

    let mut record = ExtractionRecord::new();
    for (name, value) in object {
        if let Some(value) = field_value(value) {
            record.set(name, value);
        }
    }

    Ok(record)
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if !trimmed.starts_with("```") {
        return Ok(trimmed);
    }

    // Skip the opening fence line (``` or ```json), or the bare fence
    // marker when the whole block sits on one line
    let body = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed),
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body).trim();

    if body.is_empty() {
        return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
    }
    Ok(body)
}

fn field_value(value: &Value) -> Option<FieldValue> {
    let kind = match value {
        Value::Null => return None,
        Value::String(s) => return Some(FieldValue::Text(s.clone())),
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    Some(FieldValue::NonText {
        kind,
        raw: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let record = parse_llm_response(r#"{"title_name": "Smart Factory", "tel_number": ""}"#)
            .unwrap();
        assert_eq!(record.text("title_name"), Some("Smart Factory"));
        assert_eq!(record.text("tel_number"), Some(""));
    }

    #[test]
    fn test_parse_fenced_json() {
        let response = "```json\n{\"area_name\": \"Daegu\"}\n```";
        let record = parse_llm_response(response).unwrap();
        assert_eq!(record.text("area_name"), Some("Daegu"));
    }

    #[test]
    fn test_parse_bare_fence() {
        let response = "  ```\n{\"area_name\": \"Ulsan\"}\n```  ";
        let record = parse_llm_response(response).unwrap();
        assert_eq!(record.text("area_name"), Some("Ulsan"));
    }

    #[test]
    fn test_parse_single_line_fence() {
        let record = parse_llm_response(r#"```json{"title_name":"x"}```"#).unwrap();
        assert_eq!(record.text("title_name"), Some("x"));

        let record = parse_llm_response(r#"```{"area_name": "Busan"}```"#).unwrap();
        assert_eq!(record.text("area_name"), Some("Busan"));
    }

    #[test]
    fn test_empty_fence_is_malformed() {
        assert!(matches!(
            parse_llm_response("```json\n```"),
            Err(ExtractorError::InvalidFormat(_))
        ));
        assert!(parse_llm_response("```").is_err());
    }

    #[test]
    fn test_array_is_malformed() {
        assert!(matches!(
            parse_llm_response(r#"[{"title_name": "x"}]"#),
            Err(ExtractorError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_prose_is_malformed() {
        assert!(matches!(
            parse_llm_response("I could not find any fields."),
            Err(ExtractorError::JsonParse(_))
        ));
    }

    #[test]
    fn test_null_is_absent() {
        let record = parse_llm_response(r#"{"title_name": null, "area_name": "Jeju"}"#).unwrap();
        assert!(!record.contains("title_name"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_non_text_values_kept() {
        let record =
            parse_llm_response(r#"{"support_amount": 5000, "area_name": ["Seoul", "Busan"]}"#)
                .unwrap();
        assert_eq!(
            record.get("support_amount"),
            Some(&FieldValue::NonText {
                kind: "number",
                raw: "5000".to_string()
            })
        );
        assert_eq!(
            record.get("area_name"),
            Some(&FieldValue::NonText {
                kind: "array",
                raw: r#"["Seoul","Busan"]"#.to_string()
            })
        );
    }

    #[test]
    fn test_non_ascii_preserved() {
        let record = parse_llm_response(r#"{"responsible_division_name": "기업지원과"}"#).unwrap();
        assert_eq!(record.text("responsible_division_name"), Some("기업지원과"));
    }
}
