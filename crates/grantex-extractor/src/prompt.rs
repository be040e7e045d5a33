//! LLM prompt engineering for announcement extraction

use grantex_domain::{FieldSchema, FieldSpec};

/// System message sent alongside every extraction prompt
pub const SYSTEM_INSTRUCTIONS: &str =
    "Extract the requested information from the announcement text and answer with a single JSON object.";

/// Builds prompts for the LLM to extract announcement fields
pub struct PromptBuilder<'a> {
    text: &'a str,
    schema: &'a FieldSchema,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a str, schema: &'a FieldSchema) -> Self {
        Self { text, schema }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Role and task
        prompt.push_str(TASK_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Field vocabulary with hints
        prompt.push_str("Extract the following fields from the announcement:\n");
        for spec in self.schema.fields() {
            prompt.push_str(&format!("- {}: {}\n", spec.name, hint_for(spec)));
        }
        prompt.push('\n');

        // 3. Required / optional split
        prompt.push_str("These fields are required and must always be present:\n");
        prompt.push_str(&join_names(self.schema.required()));
        prompt.push_str("\n\n");
        prompt.push_str("Include these fields as well whenever the information exists:\n");
        prompt.push_str(&join_names(self.schema.optional()));
        prompt.push_str("\n\n");

        // 4. Output contract
        prompt.push_str(OUTPUT_RULES);
        prompt.push_str("\n\n");

        // 5. The text to analyze
        prompt.push_str("Announcement text:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        // 6. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

fn hint_for(spec: &FieldSpec) -> String {
    spec.hint
        .clone()
        .or_else(|| default_hint(&spec.name).map(str::to_string))
        .unwrap_or_else(|| spec.name.replace('_', " "))
}

fn join_names<'s>(specs: impl Iterator<Item = &'s FieldSpec>) -> String {
    let names: Vec<&str> = specs.map(|spec| spec.name.as_str()).collect();
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

/// Built-in extraction hint for a well-known field name
pub fn default_hint(field: &str) -> Option<&'static str> {
    let hint = match field {
        "sme_subvention_id" => {
            "announcement or subsidy number as printed in the notice (e.g. \"제2025-095호\")"
        }
        "title_name" => "title of the support program or announcement",
        "reception_institution_name" => {
            "institution that issues or runs the program (e.g. a technopark or agency name)"
        }
        "business_overview_content" => "summary of the program's purpose and main content",
        "support_content" => {
            "details of the support provided: budget breakdown, amounts, project or agreement period"
        }
        "notice_date" => "date the announcement was published",
        "support_qualification_content" => "eligible applicants and conditions",
        "reception_start_date" => "date (and time) applications open",
        "reception_end_date" => "date (and time) applications close",
        "registered_at" => "date the announcement was first registered, written or posted",
        "support_amount" => "support budget or maximum support amount, with its unit",
        "area_name" => "region the program applies to (e.g. Seoul, Chungnam)",
        "url_address" => "homepage or announcement URL",
        "application_way_content" => {
            "how to apply (visit, online, e-mail, ...) and required documents"
        }
        "responsible_division_name" => "department in charge of the announcement",
        "responsible_person_name" => "name of the contact person",
        "responsible_person_email" => "contact e-mail address",
        "tel_number" => "contact telephone number",
        _ => return None,
    };
    Some(hint)
}

const TASK_INSTRUCTIONS: &str = r#"You are a specialised data extraction system.
Your task is to read the support program announcement below and extract specific information from it as JSON."#;

const OUTPUT_RULES: &str = r#"Rules:
1. Every value must be a string.
2. When a field has several values, join them with commas (",").
3. State amounts with their numbers and units.
4. Give URLs in full.
5. Keep e-mail addresses and telephone numbers exactly as written.
6. Keep department and person names exactly as written.
7. Keep dates in their original format.
8. When a field does not appear in the text, use an empty string "".
9. Only extract information that is actually stated in the announcement; never invent values.
10. Required fields must always be present; include optional fields whenever possible."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (a single JSON object only, no additional text):
{
  "field_name": "value",
  ...
}"#;
