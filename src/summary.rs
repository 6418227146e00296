//! Typed bodies for the code-summarization endpoint.
//!
//! The endpoint takes `{"user_id", "prompts", "model"}` and answers with
//! `{"response": "<markdown>"}` where newlines may arrive as literal `\n`
//! escape sequences.

use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{CallRequest, CallerError, Result};

/// Placeholder replaced by the patch text in a prompt template.
pub const PATCH_PLACEHOLDER: &str = "${patchContent}";

/// Template used when no prompt file is available.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Analyze and summarize the following code changes in this pull request, and response in GitHub Flavored Markdown format:\n\n${patchContent}";

pub const DEFAULT_MODEL: &str = "ollama.deepseek-r1:latest";

const API_KEY_HEADER: &str = "x-api-key";

/// Request body of the summarization endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub user_id: String,
    pub prompts: Vec<String>,
    pub model: String,
}

impl SummaryRequest {
    /// Single-prompt request against [`DEFAULT_MODEL`].
    pub fn new(user_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            prompts: vec![prompt.into()],
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Response body of the summarization endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SummaryResponse {
    pub response: String,
}

impl SummaryResponse {
    /// The reply with literal `\n` sequences turned into real newlines.
    pub fn markdown(&self) -> String {
        self.response.replace("\\n", "\n")
    }
}

/// Endpoint URL plus the API key sent as `x-api-key`.
#[derive(Clone)]
pub struct SummaryEndpoint {
    url: String,
    api_key: String,
}

impl fmt::Debug for SummaryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryEndpoint")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl SummaryEndpoint {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Reads `SUMMARY_API_URL` and `SUMMARY_API_KEY`.
    ///
    /// Returns an error if either variable is missing or blank.
    pub fn from_env() -> Result<Self> {
        let url = required_env("SUMMARY_API_URL")?;
        let api_key = required_env("SUMMARY_API_KEY")?;
        Ok(Self::new(url, api_key))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Builds the JSON call for `body`, authenticated with the API key.
    pub fn request(&self, body: &SummaryRequest) -> Result<CallRequest> {
        CallRequest::json(&self.url, body)?.header(API_KEY_HEADER, &self.api_key)
    }
}

fn required_env(name: &str) -> Result<String> {
    let value = std::env::var(name)
        .map_err(|_| CallerError::Config(format!("missing {name} environment variable")))?;
    if value.trim().is_empty() {
        return Err(CallerError::Config(format!("{name} is set but empty")));
    }
    Ok(value)
}

/// Reads a prompt template from `path`.
pub fn read_prompt_template(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|err| {
        CallerError::Config(format!("cannot read prompt template {}: {err}", path.display()))
    })
}

/// Reads a prompt template from `path`, falling back to
/// [`DEFAULT_PROMPT_TEMPLATE`] when the file cannot be read.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub fn load_prompt_template(path: impl AsRef<Path>) -> String {
    match read_prompt_template(path) {
        Ok(template) => template,
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %err, "using default prompt template");
            DEFAULT_PROMPT_TEMPLATE.to_owned()
        }
    }
}

/// Fills `template` with `patch`.
///
/// Extra instructions, when given, are appended to the template before the
/// placeholder is substituted. Only the first placeholder is replaced.
pub fn render_prompt(template: &str, patch: &str, extra_instructions: Option<&str>) -> String {
    let template = match extra_instructions.map(str::trim).filter(|s| !s.is_empty()) {
        Some(extra) => format!("{template}\n\nAdditional instructions: {extra}"),
        None => template.to_owned(),
    };
    template.replacen(PATCH_PLACEHOLDER, patch, 1)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::{
        load_prompt_template, read_prompt_template, render_prompt, SummaryEndpoint,
        SummaryRequest, SummaryResponse, DEFAULT_MODEL, DEFAULT_PROMPT_TEMPLATE,
    };
    use crate::CallerError;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("resilient-caller-{}-{name}", std::process::id()))
    }

    #[test]
    fn request_serializes_expected_shape() {
        let body = SummaryRequest::new("ftsai", "review this");
        let json = serde_json::to_value(&body).expect("must serialize");
        assert_eq!(json["user_id"], "ftsai");
        assert_eq!(json["prompts"][0], "review this");
        assert_eq!(json["model"], DEFAULT_MODEL);
    }

    #[test]
    fn markdown_unescapes_literal_newlines() {
        let reply = SummaryResponse {
            response: "# Title\\n\\n- item".to_owned(),
        };
        assert_eq!(reply.markdown(), "# Title\n\n- item");
    }

    #[test]
    fn render_prompt_substitutes_patch() {
        let prompt = render_prompt(DEFAULT_PROMPT_TEMPLATE, "+fn main() {}", None);
        assert!(prompt.ends_with("format:\n\n+fn main() {}"));
        assert!(!prompt.contains("${patchContent}"));
    }

    #[test]
    fn render_prompt_appends_extra_instructions_before_substitution() {
        let prompt = render_prompt("Diff: ${patchContent}", "-x", Some("  focus on tests "));
        assert_eq!(prompt, "Diff: -x\n\nAdditional instructions: focus on tests");
    }

    #[test]
    fn load_prompt_template_reads_existing_file() {
        let path = scratch_path("prompt.txt");
        fs::write(&path, "Review carefully:\n${patchContent}").expect("must write template");

        let template = load_prompt_template(&path);
        fs::remove_file(&path).expect("must clean up template");

        assert_eq!(template, "Review carefully:\n${patchContent}");
        assert_eq!(render_prompt(&template, "+a", None), "Review carefully:\n+a");
    }

    #[test]
    fn load_prompt_template_falls_back_when_missing() {
        let path = scratch_path("missing-prompt.txt");
        let _ = fs::remove_file(&path);

        assert_eq!(load_prompt_template(&path), DEFAULT_PROMPT_TEMPLATE);
        let err = read_prompt_template(&path).expect_err("must fail");
        assert!(matches!(err, CallerError::Config(msg) if msg.contains("missing-prompt.txt")));
    }

    #[test]
    fn render_prompt_ignores_blank_instructions() {
        assert_eq!(render_prompt("${patchContent}", "p", Some("   ")), "p");
    }

    #[test]
    fn endpoint_request_carries_api_key_and_json_body() {
        let endpoint = SummaryEndpoint::new("https://api.example.com/v1/api", "secret");
        let request = endpoint
            .request(&SummaryRequest::new("u", "p"))
            .expect("must build");

        assert_eq!(request.header_map()["x-api-key"].to_str().ok(), Some("secret"));
        assert_eq!(
            request.header_map()["content-type"].to_str().ok(),
            Some("application/json")
        );
        let body: SummaryRequest = serde_json::from_slice(request.body()).expect("json body");
        assert_eq!(body.prompts, vec!["p".to_owned()]);
    }

    #[test]
    fn debug_redacts_api_key() {
        let endpoint = SummaryEndpoint::new("https://api.example.com", "secret-key");
        let debug = format!("{endpoint:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }
}
