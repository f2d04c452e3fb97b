//! Extraction oracle client.
//!
//! The classifier only needs "prompt in, text out", so the oracle is a
//! trait; production uses the Gemini generateContent API, tests substitute
//! a stub. Configuration (key, model, endpoint) is injected at construction
//! rather than read from ambient process state.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Where and how to reach the oracle.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl OracleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Anything that can answer an extraction prompt with text.
pub trait ExtractionOracle {
    fn extract(&self, prompt: &str) -> Result<String>;
}

/// Gemini-backed oracle. One synchronous request per call; no retry or
/// timeout policy here, callers impose their own.
#[derive(Debug, Clone)]
pub struct GeminiOracle {
    config: OracleConfig,
}

impl GeminiOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }
}

impl ExtractionOracle for GeminiOracle {
    fn extract(&self, prompt: &str) -> Result<String> {
        // Callers may or may not already be inside a tokio runtime.
        // Creating a nested runtime and calling block_on would panic, so:
        // - runtime already running: block_in_place + Handle::block_on
        // - otherwise: create a runtime and block_on
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| {
                handle.block_on(async { generate_content(&self.config, prompt).await })
            })
        } else {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            rt.block_on(async { generate_content(&self.config, prompt).await })
        }
    }
}

async fn generate_content(config: &OracleConfig, prompt: &str) -> Result<String> {
    #[derive(Serialize)]
    struct Part {
        text: String,
    }

    #[derive(Serialize)]
    struct Content {
        parts: Vec<Part>,
    }

    #[derive(Serialize)]
    struct Req {
        contents: Vec<Content>,
    }

    #[derive(Deserialize)]
    struct Resp {
        #[serde(default)]
        candidates: Vec<Candidate>,
    }

    #[derive(Deserialize)]
    struct Candidate {
        content: Option<RespContent>,
    }

    #[derive(Deserialize)]
    struct RespContent {
        #[serde(default)]
        parts: Vec<RespPart>,
    }

    #[derive(Deserialize)]
    struct RespPart {
        text: Option<String>,
    }

    let body = Req {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        }],
    };

    let url = format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        config.base_url.trim_end_matches('/'),
        config.model,
        config.api_key
    );

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .context("gemini request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("gemini error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse gemini response")?;
    let mut s = String::new();
    for cand in out.candidates {
        if let Some(content) = cand.content {
            for part in content.parts {
                if let Some(t) = part.text {
                    s.push_str(&t);
                }
            }
        }
    }
    Ok(s.trim().to_string())
}
