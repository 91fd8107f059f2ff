pub mod base;
pub mod privacy_policy;
pub mod service_agreement;
pub mod terms_of_service;
pub mod website_disclaimer;

pub use base::{
    current_australian_date, format_abn, format_australian_address, PromptTemplate,
    AUSTRALIAN_STATES, SUPPORT_EMAIL,
};
pub use privacy_policy::PrivacyPolicyTemplate;
pub use service_agreement::ServiceAgreementTemplate;
pub use terms_of_service::TermsOfServiceTemplate;
pub use website_disclaimer::WebsiteDisclaimerTemplate;

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::models::ClientDetails;

/// Registry of all available prompt templates, keyed by document type.
pub struct TemplateRegistry {
    templates: HashMap<&'static str, Arc<dyn PromptTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        let mut templates: HashMap<&'static str, Arc<dyn PromptTemplate>> = HashMap::new();

        let tos = Arc::new(TermsOfServiceTemplate::new());
        templates.insert(tos.document_type(), tos);

        let privacy = Arc::new(PrivacyPolicyTemplate::new());
        templates.insert(privacy.document_type(), privacy);

        let disclaimer = Arc::new(WebsiteDisclaimerTemplate::new());
        templates.insert(disclaimer.document_type(), disclaimer);

        let agreement = Arc::new(ServiceAgreementTemplate::new());
        templates.insert(agreement.document_type(), agreement);

        Self { templates }
    }

    pub fn get(&self, document_type: &str) -> Option<Arc<dyn PromptTemplate>> {
        self.templates.get(document_type).cloned()
    }

    pub fn contains(&self, document_type: &str) -> bool {
        self.templates.contains_key(document_type)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: Lazy<TemplateRegistry> = Lazy::new(TemplateRegistry::new);

/// Look up the prompt-building strategy for a document type. Unknown types
/// fail softly with a warning so callers can report the unsupported type.
pub fn get_prompt_template(document_type: &str) -> Option<Arc<dyn PromptTemplate>> {
    let template = REGISTRY.get(document_type);
    if template.is_none() {
        tracing::warn!(document_type, "unknown document type");
    }
    template
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Validate client details against a document type's requirements.
pub fn validate_client_details_for_document(
    document_type: &str,
    details: &ClientDetails,
) -> ValidationOutcome {
    let Some(template) = get_prompt_template(document_type) else {
        return ValidationOutcome {
            is_valid: false,
            errors: vec![format!("Unsupported document type: {}", document_type)],
        };
    };

    let errors = template.validate_client_details(details);
    ValidationOutcome {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Legal,
    Business,
    Compliance,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Legal => "legal",
            DocumentCategory::Business => "business",
            DocumentCategory::Compliance => "compliance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

/// Static, compile-time metadata describing a document type for UI display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: DocumentCategory,
    pub complexity: Complexity,
    pub estimated_time: &'static str,
    pub required_fields: &'static [&'static str],
}

pub const DOCUMENT_METADATA: [DocumentTypeMetadata; 4] = [
    DocumentTypeMetadata {
        id: "terms-of-service",
        name: "Terms of Service",
        description: "Comprehensive terms and conditions for your Australian business",
        category: DocumentCategory::Legal,
        complexity: Complexity::Intermediate,
        estimated_time: "2-3 minutes",
        required_fields: &[
            "businessName",
            "abn",
            "businessAddress",
            "state",
            "serviceDescription",
            "contactEmail",
        ],
    },
    DocumentTypeMetadata {
        id: "privacy-policy",
        name: "Privacy Policy",
        description: "Australian Privacy Act compliant privacy policy with APPs coverage",
        category: DocumentCategory::Compliance,
        complexity: Complexity::Intermediate,
        estimated_time: "2-3 minutes",
        required_fields: &[
            "businessName",
            "abn",
            "businessAddress",
            "state",
            "contactEmail",
            "website",
        ],
    },
    DocumentTypeMetadata {
        id: "website-disclaimer",
        name: "Website Disclaimer",
        description: "Legal disclaimer for your Australian business website",
        category: DocumentCategory::Legal,
        complexity: Complexity::Basic,
        estimated_time: "1-2 minutes",
        required_fields: &["businessName", "abn", "businessAddress", "state"],
    },
    DocumentTypeMetadata {
        id: "service-agreement",
        name: "Service Agreement",
        description: "Professional service agreement for Australian businesses",
        category: DocumentCategory::Business,
        complexity: Complexity::Advanced,
        estimated_time: "3-5 minutes",
        required_fields: &[
            "businessName",
            "abn",
            "businessAddress",
            "state",
            "serviceDescription",
        ],
    },
];

/// Document type identifiers in display order.
pub fn available_document_types() -> Vec<&'static str> {
    DOCUMENT_METADATA.iter().map(|m| m.id).collect()
}

pub fn document_metadata(document_type: &str) -> Option<&'static DocumentTypeMetadata> {
    DOCUMENT_METADATA.iter().find(|m| m.id == document_type)
}

/// Metadata grouped by category name, in stable key order.
pub fn documents_by_category() -> BTreeMap<&'static str, Vec<&'static DocumentTypeMetadata>> {
    let mut categories: BTreeMap<&'static str, Vec<&'static DocumentTypeMetadata>> =
        BTreeMap::new();
    for metadata in DOCUMENT_METADATA.iter() {
        categories
            .entry(metadata.category.as_str())
            .or_default()
            .push(metadata);
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn australian_business() -> ClientDetails {
        json!({
            "businessName": "Test Business Pty Ltd",
            "abn": "12345678901",
            "businessAddress": {
                "streetAddress": "123 Collins Street",
                "suburb": "Melbourne",
                "state": "VIC",
                "postcode": "3000",
            },
            "state": "VIC",
            "contactEmail": "test@testbusiness.com.au",
            "website": "https://testbusiness.com.au",
            "serviceDescription": "Digital consulting services",
        })
        .as_object()
        .cloned()
        .expect("object literal")
    }

    #[test]
    fn registry_lists_all_document_types() {
        let types = available_document_types();
        assert!(!types.is_empty());
        assert!(types.contains(&"terms-of-service"));
        assert!(types.contains(&"privacy-policy"));
    }

    #[test]
    fn registry_returns_template_instances() {
        for document_type in available_document_types() {
            let template = get_prompt_template(document_type).expect("registered template");
            assert_eq!(template.document_type(), document_type);
        }
    }

    #[test]
    fn unknown_document_type_returns_none() {
        assert!(get_prompt_template("invalid-type").is_none());
    }

    #[test]
    fn unknown_document_type_reported_in_validation() {
        let outcome = validate_client_details_for_document("invalid-type", &australian_business());
        assert!(!outcome.is_valid);
        assert_eq!(
            outcome.errors,
            vec!["Unsupported document type: invalid-type".to_string()]
        );
    }

    #[test]
    fn complete_details_validate() {
        let outcome =
            validate_client_details_for_document("terms-of-service", &australian_business());
        assert!(outcome.is_valid, "errors: {:?}", outcome.errors);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn empty_details_report_missing_base_fields() {
        let outcome =
            validate_client_details_for_document("terms-of-service", &ClientDetails::new());
        assert!(!outcome.is_valid);
        assert!(outcome
            .errors
            .contains(&"Missing required field: abn".to_string()));
        assert!(outcome
            .errors
            .contains(&"Missing required field: businessAddress".to_string()));
        assert!(outcome
            .errors
            .contains(&"Missing required field: state".to_string()));
    }

    #[test]
    fn invalid_abn_rejected() {
        let mut details = australian_business();
        details.insert("abn".to_string(), json!("123"));
        let outcome = validate_client_details_for_document("terms-of-service", &details);
        assert!(!outcome.is_valid);
        assert!(outcome.errors.contains(&"ABN must be 11 digits".to_string()));
    }

    #[test]
    fn invalid_state_rejected() {
        let mut details = australian_business();
        details.insert("state".to_string(), json!("INVALID"));
        let outcome = validate_client_details_for_document("terms-of-service", &details);
        assert!(!outcome.is_valid);
        assert!(outcome
            .errors
            .contains(&"State must be a valid Australian state or territory".to_string()));
    }

    #[test]
    fn terms_of_service_requires_service_description_and_email() {
        let mut details = australian_business();
        details.remove("serviceDescription");
        details.remove("contactEmail");
        let outcome = validate_client_details_for_document("terms-of-service", &details);
        assert!(!outcome.is_valid);
        assert!(outcome
            .errors
            .contains(&"Service description is required for Terms of Service".to_string()));
        assert!(outcome
            .errors
            .contains(&"Contact email is required for Terms of Service".to_string()));
    }

    #[test]
    fn privacy_policy_requires_email_and_recommends_website() {
        let mut details = australian_business();
        details.remove("contactEmail");
        details.remove("website");
        let outcome = validate_client_details_for_document("privacy-policy", &details);
        assert!(!outcome.is_valid);
        assert!(outcome
            .errors
            .contains(&"Contact email is required for Privacy Policy".to_string()));
        assert!(outcome
            .errors
            .contains(&"Website URL is strongly recommended for Privacy Policy".to_string()));
    }

    #[test]
    fn every_prompt_carries_mandatory_compliance_clauses() {
        let details = australian_business();
        for document_type in available_document_types() {
            let template = get_prompt_template(document_type).expect("registered template");
            let prompt = template.build_prompt(&details, None);
            assert!(prompt.contains("Australian Spam Act 2003"), "{}", document_type);
            assert!(prompt.contains("Australian Privacy Act 1988"), "{}", document_type);
            assert!(prompt.contains(SUPPORT_EMAIL), "{}", document_type);
            assert!(
                prompt.contains("MUST comply with Australian law"),
                "{}",
                document_type
            );
            assert!(prompt.contains("Australian spelling"), "{}", document_type);
            assert!(prompt.contains("DD/MM/YYYY"), "{}", document_type);
            assert!(prompt.contains("AUD"), "{}", document_type);
        }
    }

    #[test]
    fn terms_of_service_prompt_covers_consumer_law() {
        let prompt = TermsOfServiceTemplate::new().build_prompt(&australian_business(), None);
        assert!(prompt.contains("Australian Consumer Law"));
        assert!(prompt.contains("Competition and Consumer Act 2010"));
        assert!(prompt.contains("Consumer guarantees cannot be excluded"));
        assert!(prompt.contains("ACCC"));
        assert!(prompt.contains("Australian Consumer Law Disclaimer"));
        assert!(prompt.contains("Australian Consumer Law protections"));
        assert!(prompt.contains("Professional Standards"));
        assert!(prompt.contains("AI technology"));
        assert!(prompt.contains("qualified Australian legal practitioner"));
    }

    #[test]
    fn terms_of_service_prompt_is_state_specific() {
        let prompt = TermsOfServiceTemplate::new().build_prompt(&australian_business(), None);
        assert!(prompt.contains("Fair Trading Acts (state-specific for VIC)"));
        assert!(prompt.contains("VIC jurisdiction"));
    }

    #[test]
    fn privacy_policy_prompt_covers_all_thirteen_apps() {
        let prompt = PrivacyPolicyTemplate::new().build_prompt(&australian_business(), None);
        for i in 1..=13 {
            assert!(prompt.contains(&format!("APP {}:", i)), "missing APP {}", i);
        }
        assert!(prompt.contains("Notifiable Data Breaches (NDB) scheme"));
        assert!(prompt.contains("Office of the Australian Information Commissioner (OAIC)"));
    }

    #[test]
    fn custom_requirements_are_incorporated() {
        let template = get_prompt_template("terms-of-service").expect("registered");
        let custom = "Include specific industry regulations for financial services";
        let prompt = template.build_prompt(&australian_business(), Some(custom));
        assert!(prompt.contains("ADDITIONAL REQUIREMENTS:"));
        assert!(prompt.contains(custom));
    }

    #[test]
    fn prompt_without_custom_requirements_omits_the_heading() {
        let template = get_prompt_template("terms-of-service").expect("registered");
        let prompt = template.build_prompt(&australian_business(), None);
        assert!(!prompt.contains("ADDITIONAL REQUIREMENTS:"));
        assert!(prompt.contains("Generate a complete, professional"));
    }

    #[test]
    fn metadata_is_complete_for_every_type() {
        for document_type in available_document_types() {
            let metadata = document_metadata(document_type).expect("metadata");
            assert!(!metadata.name.is_empty());
            assert!(!metadata.description.is_empty());
            assert!(!metadata.required_fields.is_empty());
            assert!(metadata.required_fields.contains(&"businessName"));
            assert!(metadata.required_fields.contains(&"abn"));
            assert!(metadata.required_fields.contains(&"businessAddress"));
            assert!(metadata.required_fields.contains(&"state"));
        }
    }

    #[test]
    fn categories_partition_the_metadata() {
        let grouped = documents_by_category();
        let total: usize = grouped.values().map(Vec::len).sum();
        assert_eq!(total, DOCUMENT_METADATA.len());
        assert!(grouped.contains_key("legal"));
        assert!(grouped.contains_key("compliance"));
    }
}
