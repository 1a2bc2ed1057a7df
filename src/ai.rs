use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;

use crate::models::{Company, Hunt, PersonalDetails};
use crate::reconcile::{CompanyFields, NewHuntInput};
use crate::resume::ResumeDoc;

// --- Provider trait ---

pub trait AIProvider {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
    #[allow(dead_code)]
    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
    ClaudeCode,
}

#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub provider: ProviderKind,
    pub model_id: String,
    pub short_name: String,
}

pub fn resolve_model(name: &str) -> Result<ModelSpec> {
    let spec = |provider, model_id: &str, short_name: &str| ModelSpec {
        provider,
        model_id: model_id.to_string(),
        short_name: short_name.to_string(),
    };

    match name {
        // Claude Code provider (uses the `claude` CLI, no API key needed)
        "claude-sonnet" | "sonnet" => Ok(spec(
            ProviderKind::ClaudeCode,
            "claude-sonnet-4-5-20250929",
            "claude-sonnet",
        )),
        "claude-opus" | "opus" => Ok(spec(
            ProviderKind::ClaudeCode,
            "claude-opus-4-6",
            "claude-opus",
        )),
        "claude-haiku" | "haiku" => Ok(spec(
            ProviderKind::ClaudeCode,
            "claude-haiku-4-5-20251001",
            "claude-haiku",
        )),
        // Direct Anthropic API (requires ANTHROPIC_API_KEY)
        "api-sonnet" => Ok(spec(
            ProviderKind::Anthropic,
            "claude-sonnet-4-5-20250929",
            "api-sonnet",
        )),
        "api-opus" => Ok(spec(ProviderKind::Anthropic, "claude-opus-4-6", "api-opus")),
        "api-haiku" => Ok(spec(
            ProviderKind::Anthropic,
            "claude-haiku-4-5-20251001",
            "api-haiku",
        )),
        // OpenAI (requires OPENAI_API_KEY)
        "gpt-5.2" | "gpt5" => Ok(spec(ProviderKind::OpenAI, "gpt-5.2", "gpt-5.2")),
        "gpt-4o" => Ok(spec(ProviderKind::OpenAI, "gpt-4o", "gpt-4o")),
        _ => Err(anyhow!(
            "Unknown model '{}'. Available: claude-sonnet (default), claude-opus, claude-haiku, \
             api-sonnet, api-opus, api-haiku, gpt-5.2, gpt-4o",
            name
        )),
    }
}

pub fn create_provider(spec: &ModelSpec) -> Result<Box<dyn AIProvider>> {
    match spec.provider {
        ProviderKind::ClaudeCode => Ok(Box::new(ClaudeCodeProvider::new(spec.model_id.clone())?)),
        ProviderKind::Anthropic => Ok(Box::new(AnthropicProvider::new(spec.model_id.clone())?)),
        ProviderKind::OpenAI => Ok(Box::new(OpenAIProvider::new(spec.model_id.clone())?)),
    }
}

// --- Anthropic provider ---

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug)]
pub struct AnthropicProvider {
    api_key: String,
    model_id: String,
    client: reqwest::blocking::Client,
}

impl AnthropicProvider {
    pub fn new(model_id: String) -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;
        Ok(Self {
            api_key,
            model_id,
            client: reqwest::blocking::Client::new(),
        })
    }
}

impl AIProvider for AnthropicProvider {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model_id.clone(),
            max_tokens,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow!(
                "Anthropic API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let api_response: AnthropicResponse = response
            .json()
            .context("Failed to parse Anthropic API response")?;

        api_response
            .content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| anyhow!("No content in Anthropic API response"))
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

// --- Claude Code provider (shells out to `claude` CLI) ---

#[derive(Debug)]
pub struct ClaudeCodeProvider {
    model_id: String,
}

impl ClaudeCodeProvider {
    pub fn new(model_id: String) -> Result<Self> {
        std::process::Command::new("claude")
            .arg("--version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .context("'claude' CLI not found. Install Claude Code or use api-sonnet instead.")?;
        Ok(Self { model_id })
    }
}

impl AIProvider for ClaudeCodeProvider {
    fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        let output = std::process::Command::new("claude")
            .arg("-p")
            .arg(prompt)
            .arg("--model")
            .arg(&self.model_id)
            .output()
            .context("Failed to run 'claude' CLI")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("claude CLI failed: {}", stderr));
        }

        let response =
            String::from_utf8(output.stdout).context("Invalid UTF-8 in claude CLI output")?;
        if response.trim().is_empty() {
            return Err(anyhow!("Empty response from claude CLI"));
        }
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

// --- OpenAI provider ---

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<OpenAIMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug)]
pub struct OpenAIProvider {
    api_key: String,
    model_id: String,
    client: reqwest::blocking::Client,
}

impl OpenAIProvider {
    pub fn new(model_id: String) -> Result<Self> {
        let api_key =
            env::var("OPENAI_API_KEY").context("OPENAI_API_KEY environment variable not set")?;
        Ok(Self {
            api_key,
            model_id,
            client: reqwest::blocking::Client::new(),
        })
    }
}

impl AIProvider for OpenAIProvider {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model_id.clone(),
            max_tokens,
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .context("Failed to send request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow!(
                "OpenAI API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let api_response: OpenAIResponse = response
            .json()
            .context("Failed to parse OpenAI API response")?;

        api_response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("No choices in OpenAI API response"))
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

// --- Generation context ---

/// Optional steering the user can give any generation.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    pub tone: String,
    pub skills_to_emphasise: String,
    pub notes: String,
}

/// The plain key/value bundle every generation receives: who the applicant
/// is, which hunt, which company (if bound), and the preferences.
pub struct GenContext<'a> {
    pub personal: &'a PersonalDetails,
    pub hunt: &'a Hunt,
    pub company: Option<&'a Company>,
    pub prefs: &'a Preferences,
}

fn context_summary(ctx: &GenContext) -> String {
    let mut lines = Vec::new();

    lines.push("PERSONAL".to_string());
    lines.push(format!("  Name:     {}", ctx.personal.name));
    lines.push(format!("  Email:    {}", ctx.personal.email));
    lines.push(format!("  Phone:    {}", ctx.personal.phone));
    lines.push(format!("  LinkedIn: {}", ctx.personal.linkedin_id));
    lines.push(format!("  GitHub:   {}", ctx.personal.github_acc));
    lines.push(format!("  About:    {}", ctx.personal.about));

    lines.push(String::new());
    lines.push("WORK HISTORY".to_string());
    for entry in &ctx.personal.work {
        lines.push(format!(
            "  - {} at {}: {}",
            entry.position, entry.company, entry.description
        ));
    }
    lines.push("EDUCATION".to_string());
    for entry in &ctx.personal.education {
        lines.push(format!(
            "  - {} ({}): {}",
            entry.education, entry.almamater, entry.description
        ));
    }
    lines.push("SKILLS".to_string());
    for entry in &ctx.personal.skills {
        lines.push(format!("  - {}: {}", entry.skill, entry.description));
    }

    lines.push(String::new());
    lines.push("JOB".to_string());
    lines.push(format!("  Title:       {}", ctx.hunt.job_title));
    lines.push(format!("  Source:      {}", ctx.hunt.job_source));
    lines.push(format!("  Arrangement: {}", ctx.hunt.work_arrangement));
    lines.push(format!("  Description: {}", ctx.hunt.job_description));

    if let Some(company) = ctx.company {
        lines.push(String::new());
        lines.push("COMPANY".to_string());
        lines.push(format!("  Name:        {}", company.name));
        lines.push(format!("  Industry:    {}", company.industry));
        lines.push(format!("  Address:     {}", company.address));
        lines.push(format!("  Description: {}", company.description));
    }

    let prefs = ctx.prefs;
    if !prefs.tone.is_empty() || !prefs.skills_to_emphasise.is_empty() || !prefs.notes.is_empty() {
        lines.push(String::new());
        lines.push("PREFERENCES".to_string());
        if !prefs.tone.is_empty() {
            lines.push(format!("  Tone: {}", prefs.tone));
        }
        if !prefs.skills_to_emphasise.is_empty() {
            lines.push(format!("  Emphasise: {}", prefs.skills_to_emphasise));
        }
        if !prefs.notes.is_empty() {
            lines.push(format!("  Notes: {}", prefs.notes));
        }
    }

    lines.join("\n")
}

// --- JSON plumbing for model replies ---

fn extract_json_object(text: &str) -> Result<Value> {
    // Prefer a fenced ```json block, then fall back to the widest {...}
    // span. Models decorate their replies; the payload is in there somewhere.
    if let Some(caps) = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```")
        .ok()
        .and_then(|re| re.captures(text))
    {
        if let Ok(value) = serde_json::from_str(caps[1].trim()) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&text[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(anyhow!("No JSON object found in model reply"))
}

/// Read a field as a string whatever JSON type the model chose. Booleans
/// map onto the stored Yes/No literals.
fn str_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => if *b { "Yes" } else { "No" }.to_string(),
        _ => String::new(),
    }
}

// --- Application email ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

fn email_draft_from_value(value: &Value) -> EmailDraft {
    EmailDraft {
        subject: str_field(value, "subject"),
        body: str_field(value, "body"),
    }
}

pub fn generate_application_email(provider: &dyn AIProvider, ctx: &GenContext) -> Result<EmailDraft> {
    let prompt = format!(
        "Write a job application email for the applicant below.\n\
         Keep it specific to this job and company; do not invent facts that are \
         not in the context.\n\n\
         Return ONLY a JSON object, no other text:\n\
         {{\"subject\": \"...\", \"body\": \"...\"}}\n\n\
         {}",
        context_summary(ctx)
    );

    let response = provider.complete(&prompt, 4096)?;
    let draft = email_draft_from_value(&extract_json_object(&response)?);
    if draft.body.is_empty() {
        return Err(anyhow!("Model reply carried no email body"));
    }
    Ok(draft)
}

// --- Job ad parsing ---

/// What the model pulled out of a pasted job advertisement, shaped to feed
/// straight into the create-hunt flow.
#[derive(Debug, Clone, Default)]
pub struct ParsedJobAd {
    pub hunt: NewHuntInput,
    pub company: CompanyFields,
}

fn parsed_job_ad_from_value(value: &Value) -> ParsedJobAd {
    let empty = Value::Null;
    let hunt = value.get("hunt").unwrap_or(&empty);
    let company = value.get("company").unwrap_or(&empty);

    ParsedJobAd {
        hunt: NewHuntInput {
            job_title: str_field(hunt, "jobTitle"),
            job_description: str_field(hunt, "jobDescription"),
            job_source: str_field(hunt, "jobSource"),
            salary_base_min: str_field(hunt, "salaryBaseMin"),
            salary_base_max: str_field(hunt, "salaryBaseMax"),
            salary_industry_avg: str_field(hunt, "salaryIndustryAvg"),
            salary_expecting: str_field(hunt, "salaryExpecting"),
            currency: str_field(hunt, "currency"),
            ot_rate_ratio: str_field(hunt, "otRateRatio"),
            work_arrangement: str_field(hunt, "workArrangement"),
            has_health_insurance: str_field(hunt, "hasHealthInsurance"),
            company_name: str_field(company, "name"),
        },
        company: CompanyFields {
            industry: str_field(company, "industry"),
            description: str_field(company, "description"),
            is_mnc: str_field(company, "isMnc"),
            address: str_field(company, "address"),
            website: str_field(company, "website"),
            reputation: str_field(company, "reputation"),
            phone: str_field(company, "phone"),
            email: str_field(company, "email"),
        },
    }
}

pub fn parse_job_ad(provider: &dyn AIProvider, ad_text: &str) -> Result<ParsedJobAd> {
    let prompt = format!(
        "Extract structured fields from this job advertisement. Leave a field \
         as an empty string when the ad does not say.\n\n\
         Return ONLY a JSON object, no other text:\n\
         {{\"hunt\": {{\"jobTitle\": \"\", \"jobDescription\": \"\", \"jobSource\": \"\", \
         \"salaryBaseMin\": \"\", \"salaryBaseMax\": \"\", \"salaryIndustryAvg\": \"\", \
         \"salaryExpecting\": \"\", \"currency\": \"\", \"otRateRatio\": \"\", \
         \"workArrangement\": \"\", \"hasHealthInsurance\": \"Yes|No\"}}, \
         \"company\": {{\"name\": \"\", \"industry\": \"\", \"description\": \"\", \
         \"isMnc\": \"Yes|No\", \"address\": \"\", \"website\": \"\", \"reputation\": \"\", \
         \"phone\": \"\", \"email\": \"\"}}}}\n\n\
         Job advertisement:\n{}",
        ad_text
    );

    let response = provider.complete(&prompt, 4096)?;
    let parsed = parsed_job_ad_from_value(&extract_json_object(&response)?);
    if parsed.hunt.job_title.is_empty() {
        return Err(anyhow!("Model could not find a job title in the ad"));
    }
    Ok(parsed)
}

// --- Structured resume ---

pub fn generate_resume_structure(provider: &dyn AIProvider, ctx: &GenContext) -> Result<ResumeDoc> {
    let prompt = format!(
        "Build a tailored resume for the applicant and job below. Stay 100% \
         truthful: only use facts from the context, reorder and reword for \
         this specific role.\n\n\
         Return ONLY a JSON object, no other text:\n\
         {{\"meta\": {{\"targetRole\": \"\"}}, \
         \"header\": {{\"name\": \"\", \"email\": \"\", \"phone\": \"\", \
         \"linkedin\": \"\", \"github\": \"\", \"location\": \"\"}}, \
         \"summary\": \"\", \"skills\": [], \
         \"experience\": [{{\"title\": \"\", \"company\": \"\", \"location\": \"\", \
         \"start\": \"\", \"end\": \"\", \"bullets\": []}}], \
         \"education\": [{{\"degree\": \"\", \"institution\": \"\", \"bullets\": []}}], \
         \"projects\": [{{\"name\": \"\", \"bullets\": []}}], \"extras\": []}}\n\n\
         {}",
        context_summary(ctx)
    );

    let response = provider.complete(&prompt, 8192)?;
    let value = extract_json_object(&response)?;
    let doc: ResumeDoc =
        serde_json::from_value(value).context("Model resume JSON has the wrong shape")?;
    if doc.header.name.is_empty() && doc.summary.is_empty() && doc.experience.is_empty() {
        return Err(anyhow!("Model reply carried an empty resume"));
    }
    Ok(doc)
}
