use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use urlencoding::encode;

use super::{DocumentAnalysis, DocumentAnalyzer};
use crate::config::{AnalysisConfig, secret_from_env};
use crate::error::{Error, Result};

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Fallback when `[analysis] endpoint` is left blank.
const ENDPOINT_ENV: &str = "AZURE_ENDPOINT";

/// Azure Document Intelligence REST client: submit, then poll the
/// `Operation-Location` until the analysis settles.
pub struct AzureAnalyzer {
    client: Client,
    endpoint: String,
    model_id: String,
    api_version: String,
    api_key: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl AzureAnalyzer {
    pub fn from_config(cfg: &AnalysisConfig) -> Result<Self> {
        let endpoint = if cfg.endpoint.is_empty() {
            std::env::var(ENDPOINT_ENV).map_err(|_| Error::MissingEndpoint)?
        } else {
            cfg.endpoint.clone()
        };
        let api_key = secret_from_env(&cfg.api_key_env)?;

        info!(endpoint = %endpoint, model = %cfg.model_id, "Using document analysis service");
        Ok(Self {
            client: Client::new(),
            endpoint,
            model_id: cfg.model_id.clone(),
            api_version: cfg.api_version.clone(),
            api_key,
            timeout: Duration::from_secs(cfg.timeout_secs),
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
        })
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/{}:analyze?api-version={}",
            self.endpoint.trim_end_matches('/'),
            encode(&self.model_id),
            encode(&self.api_version),
        )
    }

    async fn poll(&self, operation_url: &str) -> Result<DocumentAnalysis> {
        let deadline = Instant::now() + self.timeout;

        loop {
            let response = self
                .client
                .get(operation_url)
                .header(KEY_HEADER, &self.api_key)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::ServiceStatus { status, body });
            }

            let body: Value = response.json().await?;
            if let Some(done) = settled(&body) {
                return done;
            }

            if Instant::now() >= deadline {
                warn!(timeout_secs = self.timeout.as_secs(), "Gave up waiting for analysis");
                return Err(Error::AnalysisTimeout(self.timeout.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// `Some` once the operation reached a terminal status.
fn settled(body: &Value) -> Option<Result<DocumentAnalysis>> {
    match body.get("status").and_then(Value::as_str) {
        Some("succeeded") => Some(DocumentAnalysis::from_analyze_result(body)),
        Some("failed") => {
            let detail = body
                .get("error")
                .map(Value::to_string)
                .unwrap_or_else(|| "no error detail".to_string());
            Some(Err(Error::AnalysisFailed(detail)))
        }
        status => {
            debug!(?status, "Analysis still running");
            None
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for AzureAnalyzer {
    async fn analyze(&self, pdf: &[u8]) -> Result<DocumentAnalysis> {
        info!(bytes = pdf.len(), "Submitting document for analysis");

        let response = self
            .client
            .post(self.analyze_url())
            .header(KEY_HEADER, &self.api_key)
            .header("Content-Type", "application/pdf")
            .body(pdf.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ServiceStatus { status, body });
        }

        let operation_url = response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(Error::MissingOperationLocation)?;
        debug!(url = %operation_url, "Polling analysis operation");

        let analysis = self.poll(&operation_url).await?;
        info!(pairs = analysis.fields.len(), chars = analysis.content.len(), "Analysis complete");
        Ok(analysis)
    }
}
