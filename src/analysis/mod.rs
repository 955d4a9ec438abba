// src/analysis/mod.rs

mod azure;

pub use azure::AzureAnalyzer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One key/value detection from the document-analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    pub label: String,
    pub value: Option<String>,
    pub confidence: Option<f64>,
}

/// Everything the normalizer needs from one analyzed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Detections in service order.
    pub fields: Vec<RawField>,
    /// Full recognized text; only the revision scan reads it.
    pub content: String,
}

/// A service that turns PDF bytes into key/value detections.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, pdf: &[u8]) -> Result<DocumentAnalysis>;
}

// ---------------------------------------------------------------------------
// Wire shapes of the service's `analyzeResult`
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResult {
    #[serde(default)]
    content: String,
    #[serde(default)]
    key_value_pairs: Vec<KeyValuePair>,
}

#[derive(Debug, Deserialize)]
struct KeyValuePair {
    key: Option<DocumentElement>,
    value: Option<DocumentElement>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DocumentElement {
    content: Option<String>,
}

impl DocumentElement {
    fn text(element: Option<&Self>) -> Option<String> {
        element
            .and_then(|e| e.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }
}

impl DocumentAnalysis {
    /// Decode a saved or polled analysis result.
    ///
    /// Accepts the bare `analyzeResult` object or the poll envelope that
    /// wraps it. Pairs whose key text is empty are skipped.
    pub fn from_analyze_result(value: &serde_json::Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(Error::MalformedResult("expected a JSON object".to_string()));
        };
        let inner = obj.get("analyzeResult").unwrap_or(value);
        let result = AnalyzeResult::deserialize(inner)?;

        let fields = result
            .key_value_pairs
            .iter()
            .filter_map(|pair| {
                let label = DocumentElement::text(pair.key.as_ref())?;
                Some(RawField {
                    label,
                    value: DocumentElement::text(pair.value.as_ref()),
                    confidence: pair.confidence,
                })
            })
            .collect();

        Ok(Self {
            fields,
            content: result.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_key_value_pairs() {
        let value = json!({
            "content": "Form W-9 (Rev. October 2018)",
            "keyValuePairs": [
                {"key": {"content": " 1 Name "}, "value": {"content": " Jane Doe "}, "confidence": 0.9},
                {"key": {"content": "Date"}, "value": {"content": "   "}, "confidence": 0.3},
                {"key": {"content": "Signature"}, "confidence": 0.2},
                {"key": {"content": ""}, "value": {"content": "orphan"}, "confidence": 0.1},
                {"value": {"content": "no key"}, "confidence": 0.1}
            ]
        });
        let analysis = DocumentAnalysis::from_analyze_result(&value).unwrap();

        assert_eq!(analysis.content, "Form W-9 (Rev. October 2018)");
        assert_eq!(
            analysis.fields,
            vec![
                RawField { label: "1 Name".into(), value: Some("Jane Doe".into()), confidence: Some(0.9) },
                RawField { label: "Date".into(), value: None, confidence: Some(0.3) },
                RawField { label: "Signature".into(), value: None, confidence: Some(0.2) },
            ]
        );
    }

    #[test]
    fn test_accepts_poll_envelope() {
        let value = json!({
            "status": "succeeded",
            "analyzeResult": {
                "content": "text",
                "keyValuePairs": [{"key": {"content": "EIN"}, "value": {"content": "1"}, "confidence": 1.0}]
            }
        });
        let analysis = DocumentAnalysis::from_analyze_result(&value).unwrap();
        assert_eq!(analysis.fields.len(), 1);
        assert_eq!(analysis.content, "text");
    }

    #[test]
    fn test_missing_sections_default() {
        let analysis = DocumentAnalysis::from_analyze_result(&json!({})).unwrap();
        assert_eq!(analysis, DocumentAnalysis::default());
    }

    #[test]
    fn test_malformed_shapes_rejected() {
        assert!(DocumentAnalysis::from_analyze_result(&json!("text")).is_err());
        assert!(DocumentAnalysis::from_analyze_result(&json!({"keyValuePairs": "nope"})).is_err());
        assert!(DocumentAnalysis::from_analyze_result(&json!({"keyValuePairs": [{"confidence": "high"}]})).is_err());
    }
}
