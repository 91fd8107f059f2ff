use crate::models::ClientDetails;
use crate::prompts::base::{
    custom_requirements_block, detail_or, format_australian_address, has_value, text_field,
    PromptTemplate,
};

pub struct PrivacyPolicyTemplate;

impl PrivacyPolicyTemplate {
    pub fn new() -> Self {
        Self
    }
}

impl PromptTemplate for PrivacyPolicyTemplate {
    fn document_type(&self) -> &'static str {
        "privacy-policy"
    }

    fn build_base_prompt(
        &self,
        details: &ClientDetails,
        custom_requirements: Option<&str>,
    ) -> String {
        let business_name = detail_or(details, "businessName", "[Business Name]");
        // The business itself is the data controller unless one is named.
        let data_controller =
            text_field(details, "dataController").unwrap_or_else(|| business_name.clone());
        let state = detail_or(details, "state", "[State/Territory]");

        format!(
            r#"You are an expert Australian privacy law writer. Generate a comprehensive Privacy Policy for an Australian business that fully complies with the Privacy Act 1988 (Cth) and the Australian Privacy Principles (APPs).

BUSINESS DETAILS:
- Business Name: {}
- ABN: {}
- Address: {}
- Website: {}
- Contact Email: {}
- Data Controller: {}
- Data Types Collected: {}
- Third-Party Services: {}
- International Data Transfers: {}
- State/Territory: {}

MANDATORY AUSTRALIAN PRIVACY LAW COMPLIANCE:
1. Privacy Act 1988 (Cth)
2. Australian Privacy Principles (APPs)
3. Notifiable Data Breaches (NDB) scheme
4. Telecommunications Consumer Protections Code
5. State-specific privacy legislation for {}

REQUIRED AUSTRALIAN PRIVACY PRINCIPLES (APPs) COVERAGE:
APP 1: Open and transparent management of personal information
APP 2: Anonymity and pseudonymity
APP 3: Collection of solicited personal information
APP 4: Dealing with unsolicited personal information
APP 5: Notification of the collection of personal information
APP 6: Use or disclosure of personal information
APP 7: Direct marketing
APP 8: Cross-border disclosure of personal information
APP 9: Adoption, use or disclosure of government related identifiers
APP 10: Quality of personal information
APP 11: Security of personal information
APP 12: Access to personal information
APP 13: Correction of personal information

REQUIRED SECTIONS TO INCLUDE:
1. Introduction and Scope
2. What Personal Information We Collect
3. How We Collect Personal Information
4. Why We Collect Personal Information
5. How We Use and Disclose Personal Information
6. Direct Marketing (APP 7 compliance)
7. Data Quality and Security (APPs 10 & 11)
8. Access and Correction Rights (APPs 12 & 13)
9. Cross-Border Data Transfers (APP 8)
10. Data Breach Notification
11. Cookies and Tracking Technologies
12. Third-Party Services and Links
13. Children's Privacy
14. Changes to Privacy Policy
15. Complaints and Contact Information
16. Office of the Australian Information Commissioner (OAIC) Rights

CRITICAL AUSTRALIAN PRIVACY REQUIREMENTS:
- Clear notice at or before collection (APP 5)
- Consent mechanisms compliant with APPs
- Individual access and correction rights
- Data breach notification procedures
- Cross-border transfer protections
- Direct marketing opt-out mechanisms
- Complaint handling procedures
- OAIC enforcement rights and complaint pathways

SPECIAL CONSIDERATIONS:
- Small business exemptions (if applicable)
- Health information requirements (if applicable)
- Employee privacy considerations
- Credit reporting provisions (if applicable)
- Telecommunications privacy (if applicable)

DOCUMENT TONE AND STYLE:
- Clear, plain English as required by APP 1
- Accessible language for general public
- Comprehensive but not overwhelming
- Use Australian spelling throughout
- Include practical examples where helpful
{}
Generate a complete, professional Privacy Policy that provides transparency about data practices while ensuring full compliance with Australian privacy law."#,
            business_name,
            detail_or(details, "abn", "[ABN]"),
            format_australian_address(details),
            detail_or(details, "website", "[Website URL]"),
            detail_or(details, "contactEmail", "[Contact Email]"),
            data_controller,
            detail_or(details, "dataTypes", "Personal and business information"),
            detail_or(details, "thirdPartyServices", "Standard third-party integrations"),
            detail_or(details, "internationalTransfers", "None specified"),
            state,
            state,
            custom_requirements_block(custom_requirements),
        )
    }

    fn extra_validation(&self, details: &ClientDetails) -> Vec<String> {
        let mut errors = Vec::new();
        if !has_value(details, "contactEmail") {
            errors.push("Contact email is required for Privacy Policy".to_string());
        }
        if !has_value(details, "website") {
            errors.push("Website URL is strongly recommended for Privacy Policy".to_string());
        }
        errors
    }
}
