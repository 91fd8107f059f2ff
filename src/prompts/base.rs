use anyhow::Result;
use chrono::{FixedOffset, Utc};
use serde_json::Value;

use crate::models::ClientDetails;

/// Support contact printed in every generated prompt footer.
pub const SUPPORT_EMAIL: &str = "support@legallyllegit.ai";

/// The 8 Australian states and territories accepted in client details.
pub const AUSTRALIAN_STATES: [&str; 8] = ["NSW", "VIC", "QLD", "WA", "SA", "TAS", "ACT", "NT"];

/// Fields every document type requires regardless of template.
pub const BASE_REQUIRED_FIELDS: [&str; 4] = ["businessName", "abn", "businessAddress", "state"];

/// Strategy for assembling the system prompt of one document type.
///
/// Implementations override `build_base_prompt` with the type-specific
/// instructions and `extra_validation` with any fields the type needs beyond
/// the shared base set. `build_prompt` and `validate_client_details` are the
/// entry points callers use; they fold in the jurisdiction-wide behavior so
/// no template can ship without the mandatory Australian clauses.
pub trait PromptTemplate: Send + Sync {
    fn document_type(&self) -> &'static str;

    fn build_base_prompt(
        &self,
        details: &ClientDetails,
        custom_requirements: Option<&str>,
    ) -> String;

    fn extra_validation(&self, _details: &ClientDetails) -> Vec<String> {
        Vec::new()
    }

    /// Full prompt: type-specific instructions plus the mandatory compliance
    /// sections appended to every document type.
    fn build_prompt(&self, details: &ClientDetails, custom_requirements: Option<&str>) -> String {
        let mut prompt = self.build_base_prompt(details, custom_requirements);
        prompt.push_str("\n\n");
        prompt.push_str(&compliance_sections());
        prompt
    }

    /// Base field/format checks plus the template's own requirements.
    /// Returns an empty vector when the details are acceptable.
    fn validate_client_details(&self, details: &ClientDetails) -> Vec<String> {
        let mut errors = base_validation(details);
        errors.extend(self.extra_validation(details));
        errors
    }
}

/// Mandatory sections appended to every generated prompt: Spam Act and
/// Privacy Act references, the Consumer Law disclaimer, the AI-assistance
/// notice, output formatting rules and the support contact footer.
pub fn compliance_sections() -> String {
    format!(
        r#"MANDATORY COMPLIANCE CLAUSES (include in every generated document):

1. Electronic Communications: any clause covering marketing or electronic
   messages must state compliance with the Australian Spam Act 2003, including
   sender identification and a functional unsubscribe facility.
2. Privacy Notice: reference the business's obligations under the
   Australian Privacy Act 1988 when handling personal information.
3. Australian Consumer Law Disclaimer: include a section titled
   "Australian Consumer Law Disclaimer" stating that nothing in the document
   excludes, restricts or modifies any Australian Consumer Law protections
   that cannot lawfully be excluded.
4. Professional Standards: include a "Professional Standards" notice
   disclosing that the document was prepared with the assistance of
   AI technology and should be reviewed by a qualified Australian legal
   practitioner before use.

OUTPUT RULES:
- The document MUST comply with Australian law as at {date}.
- Use Australian spelling throughout.
- Format all dates as DD/MM/YYYY.
- Express all monetary amounts in AUD.

FOOTER: state that questions about the document may be directed to {support}."#,
        date = current_australian_date(),
        support = SUPPORT_EMAIL,
    )
}

/// Shared validation: required base fields, 11-digit ABN, valid state code.
pub fn base_validation(details: &ClientDetails) -> Vec<String> {
    let mut errors = Vec::new();

    for field in BASE_REQUIRED_FIELDS {
        if !has_value(details, field) {
            errors.push(format!("Missing required field: {}", field));
        }
    }

    if let Some(abn) = text_field(details, "abn") {
        if !is_valid_abn(&abn) {
            errors.push("ABN must be 11 digits".to_string());
        }
    }

    if let Some(state) = text_field(details, "state") {
        if !AUSTRALIAN_STATES.contains(&state.to_uppercase().as_str()) {
            errors.push("State must be a valid Australian state or territory".to_string());
        }
    }

    errors
}

fn is_valid_abn(abn: &str) -> bool {
    let digits: String = abn.chars().filter(|c| !c.is_whitespace()).collect();
    digits.len() == 11 && digits.chars().all(|c| c.is_ascii_digit())
}

/// Format an ABN as `NN NNN NNN NNN`. Accepts input with or without spaces.
pub fn format_abn(abn: &str) -> Result<String> {
    let digits: String = abn.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != 11 || !digits.chars().all(|c| c.is_ascii_digit()) {
        anyhow::bail!("ABN must be 11 digits");
    }
    Ok(format!(
        "{} {} {} {}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..11]
    ))
}

/// Render a business address for prompt text. Accepts either a plain string
/// or the structured `{streetAddress, suburb, state, postcode}` object the
/// onboarding wizard submits.
pub fn format_australian_address(details: &ClientDetails) -> String {
    match details.get("businessAddress") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Object(addr)) => {
            let part = |key: &str| {
                addr.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            let street = part("streetAddress");
            let suburb = part("suburb");
            let state = part("state");
            let postcode = part("postcode");
            format!("{}, {} {} {}", street, suburb, state, postcode)
                .trim_matches(|c: char| c == ',' || c.is_whitespace())
                .to_string()
        }
        _ => "[Business Address]".to_string(),
    }
}

/// Current date in Australian Eastern Standard Time, `DD/MM/YYYY`.
pub fn current_australian_date() -> String {
    let aest = FixedOffset::east_opt(10 * 3600).expect("AEST offset is in range");
    Utc::now().with_timezone(&aest).format("%d/%m/%Y").to_string()
}

/// Optional user-supplied requirements, rendered under their own heading.
/// Returns a bare newline when absent so templates splice it unconditionally.
pub fn custom_requirements_block(custom_requirements: Option<&str>) -> String {
    match custom_requirements {
        Some(requirements) if !requirements.is_empty() => {
            format!("\nADDITIONAL REQUIREMENTS:\n{}\n", requirements)
        }
        _ => "\n".to_string(),
    }
}

/// Field present with a non-empty, non-null value.
pub fn has_value(details: &ClientDetails, key: &str) -> bool {
    match details.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Field rendered as text; numbers are accepted for values like the ABN.
pub fn text_field(details: &ClientDetails, key: &str) -> Option<String> {
    match details.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Field value for prompt substitution, falling back to a placeholder.
pub fn detail_or(details: &ClientDetails, key: &str, placeholder: &str) -> String {
    match text_field(details, key) {
        Some(value) if !value.is_empty() => value,
        _ => placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details(value: serde_json::Value) -> ClientDetails {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn format_abn_groups_digits() {
        assert_eq!(format_abn("12345678901").unwrap(), "12 345 678 901");
    }

    #[test]
    fn format_abn_accepts_existing_spaces() {
        assert_eq!(format_abn("12 345 678 901").unwrap(), "12 345 678 901");
    }

    #[test]
    fn format_abn_rejects_short_input() {
        let err = format_abn("123").unwrap_err();
        assert_eq!(err.to_string(), "ABN must be 11 digits");
    }

    #[test]
    fn base_validation_reports_missing_fields() {
        let errors = base_validation(&details(json!({ "businessName": "Test Business" })));
        assert!(errors.contains(&"Missing required field: abn".to_string()));
        assert!(errors.contains(&"Missing required field: businessAddress".to_string()));
        assert!(errors.contains(&"Missing required field: state".to_string()));
    }

    #[test]
    fn base_validation_rejects_bad_abn_and_state() {
        let errors = base_validation(&details(json!({
            "businessName": "Test Business",
            "abn": "123",
            "businessAddress": "1 Test St",
            "state": "INVALID",
        })));
        assert!(errors.contains(&"ABN must be 11 digits".to_string()));
        assert!(errors
            .contains(&"State must be a valid Australian state or territory".to_string()));
    }

    #[test]
    fn base_validation_accepts_complete_details() {
        let errors = base_validation(&details(json!({
            "businessName": "Test Business Pty Ltd",
            "abn": "12345678901",
            "businessAddress": "123 Collins Street",
            "state": "VIC",
        })));
        assert!(errors.is_empty());
    }

    #[test]
    fn address_formats_structured_object() {
        let d = details(json!({
            "businessAddress": {
                "streetAddress": "123 Collins Street",
                "suburb": "Melbourne",
                "state": "VIC",
                "postcode": "3000",
            }
        }));
        assert_eq!(
            format_australian_address(&d),
            "123 Collins Street, Melbourne VIC 3000"
        );
    }

    #[test]
    fn address_passes_plain_string_through() {
        let d = details(json!({ "businessAddress": "Level 2, 1 George St, Sydney" }));
        assert_eq!(format_australian_address(&d), "Level 2, 1 George St, Sydney");
    }

    #[test]
    fn compliance_sections_carry_mandatory_clauses() {
        let text = compliance_sections();
        assert!(text.contains("Australian Spam Act 2003"));
        assert!(text.contains("Australian Privacy Act 1988"));
        assert!(text.contains("Australian Consumer Law Disclaimer"));
        assert!(text.contains("Australian Consumer Law protections"));
        assert!(text.contains("Professional Standards"));
        assert!(text.contains("AI technology"));
        assert!(text.contains("qualified Australian legal practitioner"));
        assert!(text.contains("MUST comply with Australian law"));
        assert!(text.contains("Australian spelling"));
        assert!(text.contains("DD/MM/YYYY"));
        assert!(text.contains("AUD"));
        assert!(text.contains(SUPPORT_EMAIL));
    }

    #[test]
    fn current_date_is_slash_separated() {
        let date = current_australian_date();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[2..3], "/");
        assert_eq!(&date[5..6], "/");
    }
}
