use crate::models::ClientDetails;
use crate::prompts::base::{
    custom_requirements_block, detail_or, format_australian_address, PromptTemplate,
};

pub struct WebsiteDisclaimerTemplate;

impl WebsiteDisclaimerTemplate {
    pub fn new() -> Self {
        Self
    }
}

impl PromptTemplate for WebsiteDisclaimerTemplate {
    fn document_type(&self) -> &'static str {
        "website-disclaimer"
    }

    fn build_base_prompt(
        &self,
        details: &ClientDetails,
        custom_requirements: Option<&str>,
    ) -> String {
        let state = detail_or(details, "state", "[State/Territory]");

        format!(
            r#"You are an expert Australian legal document writer. Generate a website disclaimer for an Australian business that limits liability to the extent Australian law allows.

BUSINESS DETAILS:
- Business Name: {}
- ABN: {}
- Address: {}
- Website: {}
- State/Territory: {}

MANDATORY AUSTRALIAN LAW COMPLIANCE:
1. Australian Consumer Law (Competition and Consumer Act 2010)
2. Privacy Act 1988
3. Fair Trading Acts (state-specific for {})

REQUIRED SECTIONS TO INCLUDE:
1. General Information Disclaimer (content is general information, not professional advice)
2. Accuracy and Currency of Information
3. External Links Disclaimer
4. Limitation of Liability (within ACL limits)
5. Consumer Guarantees Preservation (Australian Consumer Law)
6. Copyright and Intellectual Property Notice
7. Testimonials and Results Disclaimer
8. Governing Law (Australian law, {} jurisdiction)

CRITICAL AUSTRALIAN LAW REQUIREMENTS:
- Consumer guarantees cannot be excluded or limited
- Liability disclaimers must carve out non-excludable statutory rights
- Misleading and deceptive conduct provisions apply to website content

DOCUMENT TONE AND STYLE:
- Short, direct paragraphs suitable for a website footer page
- Clear, plain English
- Use Australian spelling throughout
{}
Generate a complete, professional website disclaimer that protects the business while preserving the rights Australian law grants visitors."#,
            detail_or(details, "businessName", "[Business Name]"),
            detail_or(details, "abn", "[ABN]"),
            format_australian_address(details),
            detail_or(details, "website", "[Website URL]"),
            state,
            state,
            state,
            custom_requirements_block(custom_requirements),
        )
    }
}
