use crate::models::ClientDetails;
use crate::prompts::base::{
    custom_requirements_block, detail_or, format_australian_address, has_value, PromptTemplate,
};

pub struct ServiceAgreementTemplate;

impl ServiceAgreementTemplate {
    pub fn new() -> Self {
        Self
    }
}

impl PromptTemplate for ServiceAgreementTemplate {
    fn document_type(&self) -> &'static str {
        "service-agreement"
    }

    fn build_base_prompt(
        &self,
        details: &ClientDetails,
        custom_requirements: Option<&str>,
    ) -> String {
        let state = detail_or(details, "state", "[State/Territory]");

        format!(
            r#"You are an expert Australian commercial lawyer. Generate a professional service agreement between an Australian business and its client that is enforceable under Australian contract law.

BUSINESS DETAILS:
- Business Name: {}
- ABN: {}
- Address: {}
- Contact Email: {}
- Services: {}
- Pricing: {}
- Payment Terms: {}
- State/Territory: {}

MANDATORY AUSTRALIAN LAW COMPLIANCE:
1. Australian Consumer Law (Competition and Consumer Act 2010)
2. Privacy Act 1988
3. Independent Contractors Act 2006 (where applicable)
4. Fair Trading Acts (state-specific for {})

REQUIRED SECTIONS TO INCLUDE:
1. Parties and Recitals
2. Definitions and Interpretation
3. Scope of Services and Deliverables
4. Term and Commencement
5. Fees, Invoicing and Payment Terms
6. Variations and Change Requests
7. Client Obligations and Dependencies
8. Intellectual Property Ownership and Licences
9. Confidentiality
10. Warranties and Consumer Guarantees (Australian Consumer Law)
11. Limitation of Liability and Indemnities (within ACL limits)
12. Subcontracting and Assignment
13. Suspension and Termination
14. Dispute Resolution and Escalation
15. GST Treatment (A New Tax System (Goods and Services Tax) Act 1999)
16. Governing Law (Australian law, {} jurisdiction)
17. Execution Blocks for Both Parties

CRITICAL AUSTRALIAN LAW REQUIREMENTS:
- Consumer guarantees cannot be excluded or limited where the client is a consumer
- Unfair contract terms provisions apply to standard-form small business contracts
- Indemnities must not offend public policy or statutory protections
- GST amounts must be expressed and identified separately

DOCUMENT TONE AND STYLE:
- Formal commercial drafting, numbered clauses and sub-clauses
- Clear, plain English preferred over archaic legalese
- Use Australian spelling throughout
{}
Generate a complete, professional service agreement ready for review and execution by both parties."#,
            detail_or(details, "businessName", "[Business Name]"),
            detail_or(details, "abn", "[ABN]"),
            format_australian_address(details),
            detail_or(details, "contactEmail", "[Contact Email]"),
            detail_or(details, "serviceDescription", "Professional services"),
            detail_or(details, "pricingModel", "As quoted per engagement"),
            detail_or(details, "paymentTerms", "14 days from invoice"),
            state,
            state,
            state,
            custom_requirements_block(custom_requirements),
        )
    }

    fn extra_validation(&self, details: &ClientDetails) -> Vec<String> {
        let mut errors = Vec::new();
        if !has_value(details, "serviceDescription") {
            errors.push("Service description is required for Service Agreement".to_string());
        }
        errors
    }
}
