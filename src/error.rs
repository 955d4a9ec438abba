use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the I/O glue around the normalization core.
///
/// The core itself never produces these; see [`crate::FormatOutcome`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("environment variable {0} is required")]
    MissingEnv(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("analysis endpoint is not configured")]
    MissingEndpoint,

    #[error("analysis service returned {status}: {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("analysis service response had no Operation-Location header")]
    MissingOperationLocation,

    #[error("document analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("document analysis did not finish within {0}s")]
    AnalysisTimeout(u64),

    #[error("only PDF files are allowed: {0}")]
    NotPdf(String),

    #[error("malformed analysis result: {0}")]
    MalformedResult(String),
}
