// src/pipeline.rs

use serde_json::Value;
use tracing::{Instrument, info, info_span, warn};

use crate::analysis::{DocumentAnalysis, DocumentAnalyzer};
use crate::config::{AddressBackend, AddressConfig};
use crate::error::{Error, Result};
use crate::llm_address::LlmAddressResolver;
use crate::normalize::address::{ParsedAddress, Prefetched, StateTable};
use crate::normalize::router::{self, Route};
use crate::normalize::{self, CanonicalRecord, FormatOutcome};
use crate::pdf_text;

/// Which collaborator splits the city/state/ZIP field.
pub enum AddressStrategy {
    Table,
    Llm(LlmAddressResolver),
}

impl AddressStrategy {
    pub fn from_config(cfg: &AddressConfig) -> Result<Self> {
        Ok(match cfg.backend {
            AddressBackend::Table => AddressStrategy::Table,
            AddressBackend::Llm => AddressStrategy::Llm(LlmAddressResolver::from_config(&cfg.llm)?),
        })
    }
}

/// Full run for one uploaded file: local PDF check, remote analysis,
/// normalization. Never fails; errors come back as the error outcome.
pub async fn extract_pdf(
    name: &str,
    pdf: &[u8],
    analyzer: &dyn DocumentAnalyzer,
    address: &AddressStrategy,
) -> FormatOutcome {
    let span = info_span!("w9", file = %name);
    let result = async {
        let local = pdf_text::ensure_pdf(name, pdf)?;
        let analysis = analyzer.analyze(pdf).await?;
        Ok::<_, Error>(finish(analysis, local.text(), address).await)
    }
    .instrument(span)
    .await;

    FormatOutcome::from_result(result)
}

/// Normalize a saved analysis result (bare `analyzeResult` or poll envelope).
pub async fn format_saved(value: &Value, address: &AddressStrategy) -> FormatOutcome {
    match DocumentAnalysis::from_analyze_result(value) {
        Ok(analysis) => FormatOutcome::Record(finish(analysis, None, address).await),
        Err(e) => FormatOutcome::from_result(Err(e)),
    }
}

/// Normalize an analysis, filling in missing document text from a local text
/// layer and prefetching the LLM address answer when that backend is active.
pub async fn finish(
    mut analysis: DocumentAnalysis,
    local_text: Option<&str>,
    address: &AddressStrategy,
) -> CanonicalRecord {
    if analysis.content.trim().is_empty()
        && let Some(text) = local_text
    {
        info!(chars = text.len(), "Using embedded text layer for revision scan");
        analysis.content = text.to_string();
    }

    match address {
        AddressStrategy::Table => normalize::format_document(&analysis, &StateTable),
        AddressStrategy::Llm(llm) => {
            let parsed = match address_fragment(&analysis) {
                Some(fragment) => llm.resolve(fragment).await,
                None => {
                    warn!("No city/state/ZIP field to resolve");
                    ParsedAddress::default()
                }
            };
            normalize::format_document(&analysis, &Prefetched(parsed))
        }
    }
}

/// Value of the last field the router sends to address decomposition.
pub fn address_fragment(analysis: &DocumentAnalysis) -> Option<&str> {
    analysis
        .fields
        .iter()
        .rev()
        .find(|f| router::route(&f.label) == Some(Route::Address))
        .and_then(|f| f.value.as_deref())
}
