//! Configuration types for an extraction pass.
//!
//! All per-document behaviour is controlled through [`ExtractionConfig`],
//! built via its [`ExtractionConfigBuilder`]. Keeping every knob in one
//! struct makes it trivial to share configs across tasks and to diff two
//! runs to understand why their outputs differ.
//!
//! Process-wide state — the asset cache — is deliberately *not* part of the
//! config: it is constructed once at startup and passed to the entry points
//! by reference, so ownership of the shared store stays explicit.

use crate::error::ExtractError;
use crate::progress::ExtractionProgress;
use std::fmt;
use std::sync::Arc;

/// Configuration for one extraction pass.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pagelift::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .token("report-2024")
///     .validate(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Namespace for asset ids, so two documents extracted into the same
    /// cache cannot collide. Default: a blake3 hash of the document path.
    pub token: Option<String>,

    /// Run full document validation before extracting. Default: true.
    ///
    /// When false the result carries a trivially-valid
    /// [`crate::output::DocumentValidation`] (`validated_pages ==
    /// total_pages`, no issues) and skips the validation pass entirely —
    /// per-page statuses are still computed during extraction.
    pub validate: bool,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Target width in pixels for the low-resolution corruption-probe
    /// render. Range: 16–512. Default: 64.
    ///
    /// The probe only has to answer "can this page render at all", so the
    /// smallest bitmap pdfium will produce is enough; larger values just
    /// slow validation down.
    pub probe_width: u32,

    /// Progress callback fired per page. Default: none.
    pub progress: Option<Arc<dyn ExtractionProgress>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            token: None,
            validate: true,
            password: None,
            probe_width: 64,
            progress: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("token", &self.token)
            .field("validate", &self.validate)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("probe_width", &self.probe_width)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn ExtractionProgress>"))
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
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn validate(mut self, v: bool) -> Self {
        self.config.validate = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn probe_width(mut self, px: u32) -> Self {
        self.config.probe_width = px.clamp(16, 512);
        self
    }

    pub fn progress(mut self, cb: Arc<dyn ExtractionProgress>) -> Self {
        self.config.progress = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if !(16..=512).contains(&c.probe_width) {
            return Err(ExtractError::InvalidConfig(format!(
                "probe_width must be 16–512, got {}",
                c.probe_width
            )));
        }
        if let Some(ref token) = c.token {
            if token.is_empty() {
                return Err(ExtractError::InvalidConfig(
                    "token must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}
