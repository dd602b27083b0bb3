use crate::domain::assistant::AssistantReply;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::llm_clients::{ask, require_client, SharedLLMClient, UPSTREAM_ERROR_REPLY};
use tracing::{debug, warn};

/// Keyword → landing page anchor, checked in this order.
pub const SECTION_KEYWORDS: [(&str, &str); 9] = [
    ("overview", "section-overview"),
    ("features", "section-features"),
    ("pricing", "section-pricing"),
    ("faq", "section-faq"),
    ("integrations", "section-integrations"),
    ("support", "section-support"),
    ("contact", "section-contact"),
    ("onboarding", "section-onboarding"),
    ("security", "section-security"),
];

const PRODUCT_CONTEXT: &str = r#"
You are the assistant for an AI-driven platform for automated web, mobile, and API testing and quality assurance.

Sections of the landing page (with scrollable IDs):
- Overview (section-overview): introduction and value proposition
- Why us (section-why): key differentiators
- How it works (section-how): workflow steps
- Features (section-features): detailed capabilities
- QA cost calculator (section-calculator): ROI estimator
- Testimonials (section-testimonials): customer stories
- FAQ (section-faq): common questions
- Integrations (section-integrations): CI/CD, notifications, issue trackers
- Support (section-support): help channels and SLAs
- Pricing (section-pricing): plan tiers
- Onboarding (section-onboarding): setup guide
- Security (section-security): compliance and data protection

Answer crisply using only the information below. If you are unsure, reply:
"I'm not certain, please contact our support team."

Overview: write tests in plain English, no code or scripts required. AI agents click, scroll, swipe, and validate like real users, with screenshots, videos, and performance metrics for every run.
How it works: describe scenarios in natural language, run them on real iOS and Android devices in the cloud, then review detailed reports.
Features: test case generation from user stories, self-healing tests that adapt to UI changes, parallel execution on real devices, multi-lingual testing, end-to-end flows including OTP and payments, and collaboration through comments and versioning.
Integrations: Jenkins, GitHub Actions, GitLab CI, CircleCI; Slack, email, and webhooks; Jira, Azure DevOps, and GitHub Issues.
Support: 24/7 email and chat, SLA-based response times for enterprise, dedicated customer success managers.
Pricing: Starter for small teams, Growth with unlimited users and analytics, Enterprise with custom SLAs and on-prem deployment.
Onboarding: sign up and create a project, upload the app binary (IPA/APK), write a first plain-English test, run it and review the report.
Security: SOC 2 Type II, encryption in transit and at rest, role-based access control with audit logging.
"#;

pub struct AssistantUseCase {
    llm_client: Option<SharedLLMClient>,
}

impl AssistantUseCase {
    pub fn new(llm_client: Option<SharedLLMClient>) -> Self {
        Self { llm_client }
    }

    /// Navigates when the message names a section, otherwise asks the
    /// generative backend. Each call is independent; no history is kept.
    pub async fn respond(&self, message: &str) -> Result<AssistantReply> {
        if message.trim().is_empty() {
            return Err(AppError::ValidationError("Invalid message".to_string()));
        }

        if let Some(section) = match_section(message) {
            debug!(section, "Routing assistant message to section");
            return Ok(AssistantReply::Scroll(section.to_string()));
        }

        let llm_client = match require_client(self.llm_client.as_ref()) {
            Ok(client) => client,
            // Unconfigured is an error reply; upstream failures stay answers.
            Err(err) => {
                warn!(error = %err, "Assistant backend is not configured");
                return Ok(AssistantReply::Error(UPSTREAM_ERROR_REPLY.to_string()));
            }
        };

        let answer = ask(llm_client.as_ref(), &build_assistant_prompt(message)).await;
        Ok(AssistantReply::Answer(answer))
    }
}

/// First keyword (in table order) contained in the message, case-insensitively.
pub fn match_section(message: &str) -> Option<&'static str> {
    let lowered = message.to_lowercase();
    SECTION_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, section)| *section)
}

fn build_assistant_prompt(message: &str) -> String {
    format!("{}\nUser: {}\nAssistant:", PRODUCT_CONTEXT, message)
}
