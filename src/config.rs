//! Configuration types for table extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads and to diff two runs to
//! understand why their outputs differ.

use crate::error::Pdf2GridError;
use crate::pipeline::service::VisionService;
use crate::progress::ProgressSink;
use std::fmt;
use std::sync::Arc;

/// Default pages per batch.
///
/// 3 balances latency against output-truncation risk: larger batches make the
/// service more likely to exceed its output budget and return a truncated,
/// unparsable payload; smaller batches multiply round trips.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Configuration for a table-extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2grid::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .model("gemini-2.0-flash")
///     .batch_size(3)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// API key for the extraction service. If None, read from
    /// `GEMINI_API_KEY` or `GOOGLE_AI_API_KEY`.
    pub api_key: Option<String>,

    /// Model identifier. Default: "gemini-2.0-flash".
    pub model: String,

    /// Service base URL override; the default is the public
    /// `generativelanguage` endpoint. Useful for proxies and tests.
    pub endpoint: Option<String>,

    /// Pages per batch. Default: [`DEFAULT_BATCH_SIZE`].
    ///
    /// Each batch is one service call covering a contiguous page window.
    /// Raising this reduces round trips but increases the risk that the
    /// service truncates its JSON output mid-row.
    pub batch_size: usize,

    /// Sampling temperature. Default: 0.0.
    ///
    /// Transcription wants determinism; anything above 0 trades accuracy for
    /// creativity the grid model has no use for.
    pub temperature: f32,

    /// Maximum tokens the service may generate per batch. Default: 8192.
    ///
    /// Dense pages produce large JSON payloads. Setting this too low is the
    /// main cause of truncated responses; the parser's repair path recovers
    /// the complete leading rows, but the cut-off trailing rows are lost.
    pub max_output_tokens: usize,

    /// Per-service-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Pre-constructed extraction service. Takes precedence over `api_key`;
    /// mainly for tests and custom transports.
    pub service: Option<Arc<dyn VisionService>>,

    /// Optional sink for advisory status messages.
    pub progress: Option<Arc<dyn ProgressSink>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            endpoint: None,
            batch_size: DEFAULT_BATCH_SIZE,
            temperature: 0.0,
            max_output_tokens: 8192,
            api_timeout_secs: 120,
            service: None,
            progress: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("batch_size", &self.batch_size)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("service", &self.service.as_ref().map(|_| "<dyn VisionService>"))
            .field("progress", &self.progress.as_ref().map(|_| "<dyn ProgressSink>"))
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = Some(url.into());
        self
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n.max(1);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn service(mut self, service: Arc<dyn VisionService>) -> Self {
        self.config.service = Some(service);
        self
    }

    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.config.progress = Some(sink);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Pdf2GridError> {
        let c = &self.config;
        if c.batch_size == 0 {
            return Err(Pdf2GridError::InvalidConfig(
                "Batch size must be ≥ 1".into(),
            ));
        }
        if c.model.is_empty() {
            return Err(Pdf2GridError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.batch_size, 3);
        assert_eq!(c.model, "gemini-2.0-flash");
        assert!(c.api_key.is_none());
    }

    #[test]
    fn builder_clamps_batch_size() {
        let c = ExtractionConfig::builder().batch_size(0).build().unwrap();
        assert_eq!(c.batch_size, 1);
    }

    #[test]
    fn empty_model_rejected() {
        let err = ExtractionConfig::builder().model("").build().unwrap_err();
        assert!(err.to_string().contains("Model"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = ExtractionConfig::builder().api_key("secret-key").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("redacted"));
    }
}
