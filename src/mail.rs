use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ids::new_id;

// Two ways out: hand the message to the default mail composer via a
// mailto: URL (fire-and-forget, no delivery confirmation), or send it
// directly through the Gmail REST API (returns the provider message id).

#[derive(Debug, Clone, Default)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

pub fn mailto_url(to: &str, subject: &str, body: &str) -> String {
    let mut url = format!("mailto:{}", utf8_percent_encode(to, NON_ALPHANUMERIC));

    let mut params = Vec::new();
    if !subject.is_empty() {
        params.push(format!(
            "subject={}",
            utf8_percent_encode(subject, NON_ALPHANUMERIC)
        ));
    }
    if !body.is_empty() {
        params.push(format!("body={}", utf8_percent_encode(body, NON_ALPHANUMERIC)));
    }
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }
    url
}

/// Open the default mail composer with prefilled fields. Attachments
/// cannot travel over mailto:; callers wanting them use the direct send.
pub fn open_in_composer(email: &OutgoingEmail) -> Result<()> {
    if email.to.trim().is_empty() {
        bail!("Recipient ('To') cannot be empty");
    }
    let url = mailto_url(email.to.trim(), &email.subject, &email.body);

    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = std::process::Command::new("open");
        c.arg(&url);
        c
    };
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]).arg(&url);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut c = std::process::Command::new("xdg-open");
        c.arg(&url);
        c
    };

    command
        .spawn()
        .context("Could not open the default mail client")?;
    Ok(())
}

// --- Direct send via the Gmail API ---

const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

pub struct GmailSender {
    access_token: String,
    client: reqwest::blocking::Client,
}

impl GmailSender {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Read an OAuth access token from a file (one token, whitespace
    /// tolerated). Obtaining the token is the user's problem.
    pub fn from_token_file(path: &Path) -> Result<Self> {
        let token = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?;
        let token = token.trim();
        if token.is_empty() {
            bail!("Token file {} is empty", path.display());
        }
        Ok(Self::new(token))
    }

    /// Send the message; returns the Gmail message id.
    pub fn send(&self, email: &OutgoingEmail) -> Result<String> {
        if email.to.trim().is_empty() {
            bail!("Recipient ('To') cannot be empty");
        }

        let mime = build_mime(email)?;
        let payload = serde_json::json!({ "raw": URL_SAFE.encode(mime.as_bytes()) });

        let response = self
            .client
            .post(GMAIL_SEND_URL)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .context("Failed to send request to Gmail API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow!(
                "Gmail API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let value: serde_json::Value = response
            .json()
            .context("Failed to parse Gmail API response")?;
        value
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("No message id in Gmail API response"))
    }
}

fn build_mime(email: &OutgoingEmail) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("To: {}\r\n", email.to.trim()));
    out.push_str(&format!("Subject: {}\r\n", email.subject.replace(['\r', '\n'], " ")));
    out.push_str("MIME-Version: 1.0\r\n");

    if email.attachments.is_empty() {
        out.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n\r\n");
        out.push_str(&email.body);
        return Ok(out);
    }

    let boundary = format!("part_{}", new_id());
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
        boundary
    ));

    out.push_str(&format!("--{}\r\n", boundary));
    out.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n\r\n");
    out.push_str(&email.body);
    out.push_str("\r\n");

    for path in &email.attachments {
        let data = fs::read(path)
            .with_context(|| format!("Failed to read attachment: {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("attachment");

        out.push_str(&format!("--{}\r\n", boundary));
        out.push_str("Content-Type: application/octet-stream\r\n");
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
            file_name
        ));
        out.push_str(&wrap_base64(&STANDARD.encode(&data)));
        out.push_str("\r\n");
    }

    out.push_str(&format!("--{}--\r\n", boundary));
    Ok(out)
}

// RFC 2045 wants encoded lines no longer than 76 chars.
fn wrap_base64(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(76)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\r\n")
}
