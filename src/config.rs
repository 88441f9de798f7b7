//! Configuration types for PO/SO comparison.
//!
//! All pipeline behaviour is controlled through [`CompareConfig`], built via
//! its [`CompareConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across threads, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! The API credential is an explicit [`ApiKey`] value passed to the builder,
//! not ambient process state: a missing key fails at construction time,
//! before any file is read or request sent.

use crate::error::CompareError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Environment variable the default [`ApiKey::from_env`] constructor reads.
pub const API_KEY_ENV_VAR: &str = "GROQ_API_KEY";

/// Default chat-completions endpoint (OpenAI-compatible).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Bearer credential for the completion provider.
///
/// Wraps the raw key so it cannot leak through `Debug`/log output, and so a
/// missing or empty key is rejected the moment a config is constructed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key obtained elsewhere (e.g. a secrets manager).
    pub fn new(key: impl Into<String>) -> Result<Self, CompareError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(CompareError::MissingApiKey {
                var: API_KEY_ENV_VAR.to_string(),
            });
        }
        Ok(Self(key))
    }

    /// Read the key from [`API_KEY_ENV_VAR`].
    pub fn from_env() -> Result<Self, CompareError> {
        Self::from_env_var(API_KEY_ENV_VAR)
    }

    /// Read the key from an arbitrary environment variable.
    pub fn from_env_var(var: &str) -> Result<Self, CompareError> {
        match std::env::var(var) {
            Ok(v) if !v.trim().is_empty() => Ok(Self(v)),
            _ => Err(CompareError::MissingApiKey {
                var: var.to_string(),
            }),
        }
    }

    /// The raw key, for the `Authorization` header only.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// Configuration for a comparison run.
///
/// Built via [`CompareConfig::builder`].
///
/// # Example
/// ```rust,no_run
/// use podiff::{ApiKey, CompareConfig};
///
/// let config = CompareConfig::builder(ApiKey::from_env()?)
///     .model("llama3-70b-8192")
///     .max_pages(10)
///     .build()?;
/// # Ok::<(), podiff::CompareError>(())
/// ```
#[derive(Clone)]
pub struct CompareConfig {
    /// Bearer credential for the completion provider.
    pub api_key: ApiKey,

    /// Base URL of the OpenAI-compatible API. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Completion model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low temperature favours deterministic, literal field comparisons over
    /// creative variation — exactly what a diff report needs.
    pub temperature: f32,

    /// Character budget applied to each extracted text independently,
    /// taken as an exact prefix. Default: 10,000.
    ///
    /// The truncation is silent: neither the model nor the user is told it
    /// happened. It bounds each text insertion, not the request as a whole.
    pub max_doc_chars: usize,

    /// Maximum number of pages read per PDF. Default: 10.
    ///
    /// Pages beyond the cap are dropped silently, in document order.
    pub max_pages: usize,

    /// Completion request timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Optional stage-progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for CompareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareConfig")
            .field("api_key", &self.api_key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_doc_chars", &self.max_doc_chars)
            .field("max_pages", &self.max_pages)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("system_prompt", &self.system_prompt.as_ref().map(|_| "<custom>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl CompareConfig {
    /// Create a new builder. The API key is the only required input.
    pub fn builder(api_key: ApiKey) -> CompareConfigBuilder {
        CompareConfigBuilder {
            config: CompareConfig {
                api_key,
                base_url: DEFAULT_BASE_URL.to_string(),
                model: DEFAULT_MODEL.to_string(),
                temperature: 0.2,
                max_doc_chars: 10_000,
                max_pages: 10,
                api_timeout_secs: 120,
                system_prompt: None,
                progress_callback: None,
            },
        }
    }
}

/// Builder for [`CompareConfig`].
#[derive(Debug)]
pub struct CompareConfigBuilder {
    config: CompareConfig,
}

impl CompareConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_doc_chars(mut self, n: usize) -> Self {
        self.config.max_doc_chars = n.max(1);
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = n.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CompareConfig, CompareError> {
        let c = &self.config;
        if c.base_url.trim().is_empty() {
            return Err(CompareError::InvalidConfig("base_url must not be empty".into()));
        }
        if c.model.trim().is_empty() {
            return Err(CompareError::InvalidConfig("model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(CompareError::InvalidConfig(format!(
                "temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        if c.api_timeout_secs == 0 {
            return Err(CompareError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ApiKey {
        ApiKey::new("test-key").unwrap()
    }

    #[test]
    fn defaults_match_contract() {
        let config = CompareConfig::builder(key()).build().unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_doc_chars, 10_000);
        assert_eq!(config.max_pages, 10);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            ApiKey::new(""),
            Err(CompareError::MissingApiKey { .. })
        ));
        assert!(matches!(
            ApiKey::new("   "),
            Err(CompareError::MissingApiKey { .. })
        ));
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let k = ApiKey::new("sk-secret-value").unwrap();
        let dbg = format!("{:?}", k);
        assert!(!dbg.contains("secret"), "key leaked: {dbg}");
    }

    #[test]
    fn temperature_is_clamped() {
        let config = CompareConfig::builder(key())
            .temperature(9.0)
            .build()
            .unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn empty_model_is_rejected() {
        let result = CompareConfig::builder(key()).model("  ").build();
        assert!(matches!(result, Err(CompareError::InvalidConfig(_))));
    }

    #[test]
    fn missing_env_var_fails() {
        let result = ApiKey::from_env_var("PODIFF_TEST_DEFINITELY_UNSET_VAR");
        assert!(matches!(result, Err(CompareError::MissingApiKey { .. })));
    }
}
