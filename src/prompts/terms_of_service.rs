use crate::models::ClientDetails;
use crate::prompts::base::{
    custom_requirements_block, detail_or, format_australian_address, has_value, PromptTemplate,
};

pub struct TermsOfServiceTemplate;

impl TermsOfServiceTemplate {
    pub fn new() -> Self {
        Self
    }
}

impl PromptTemplate for TermsOfServiceTemplate {
    fn document_type(&self) -> &'static str {
        "terms-of-service"
    }

    fn build_base_prompt(
        &self,
        details: &ClientDetails,
        custom_requirements: Option<&str>,
    ) -> String {
        let state = detail_or(details, "state", "[State/Territory]");

        format!(
            r#"You are an expert Australian legal document writer. Generate comprehensive Terms of Service for an Australian business that complies with all relevant Australian consumer protection laws.

BUSINESS DETAILS:
- Business Name: {}
- ABN: {}
- Address: {}
- Website: {}
- Contact Email: {}
- Services: {}
- Pricing: {}
- Refund Policy: {}
- State/Territory: {}

MANDATORY AUSTRALIAN LAW COMPLIANCE:
1. Australian Consumer Law (Competition and Consumer Act 2010)
2. Privacy Act 1988
3. Spam Act 2003
4. Electronic Transactions Act 1999
5. Fair Trading Acts (state-specific for {})

REQUIRED SECTIONS TO INCLUDE:
1. Introduction and Acceptance
2. Description of Services
3. User Accounts and Registration
4. Payment Terms and Pricing
5. Refund and Cancellation Policy (ACL compliant)
6. Intellectual Property Rights
7. User Conduct and Prohibited Activities
8. Limitation of Liability (within ACL limits)
9. Consumer Guarantees (Australian Consumer Law)
10. Privacy and Data Protection
11. Third-Party Services and Links
12. Termination and Suspension
13. Dispute Resolution (including access to ACCC)
14. Governing Law (Australian law, {} jurisdiction)
15. Changes to Terms
16. Contact Information

CRITICAL AUSTRALIAN LAW REQUIREMENTS:
- Consumer guarantees cannot be excluded or limited
- Unfair contract terms provisions must be considered
- Cooling-off periods where applicable
- Clear dispute resolution pathways
- ACCC enforcement rights
- State-specific consumer protection laws for {}

DOCUMENT TONE AND STYLE:
- Professional but accessible language
- Clear, plain English as required by Australian consumer law
- Avoid overly complex legal jargon
- Include helpful explanations of key terms
- Use Australian spelling throughout (e.g., "favour", "colour", "organisation")
{}
Generate a complete, professional Terms of Service document that provides strong legal protection while remaining fair and compliant with Australian consumer protection laws."#,
            detail_or(details, "businessName", "[Business Name]"),
            detail_or(details, "abn", "[ABN]"),
            format_australian_address(details),
            detail_or(details, "website", "[Website URL]"),
            detail_or(details, "contactEmail", "[Contact Email]"),
            detail_or(details, "serviceDescription", "Digital services"),
            detail_or(details, "pricingModel", "Standard pricing applies"),
            detail_or(details, "refundPolicy", "Standard refund policy"),
            state,
            state,
            state,
            state,
            custom_requirements_block(custom_requirements),
        )
    }

    fn extra_validation(&self, details: &ClientDetails) -> Vec<String> {
        let mut errors = Vec::new();
        if !has_value(details, "serviceDescription") {
            errors.push("Service description is required for Terms of Service".to_string());
        }
        if !has_value(details, "contactEmail") {
            errors.push("Contact email is required for Terms of Service".to_string());
        }
        errors
    }
}
