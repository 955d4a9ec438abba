// src/normalize/mod.rs

pub mod address;
pub mod date;
pub mod router;
pub mod states;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, error, info};

use crate::analysis::DocumentAnalysis;
use address::{AddressResolver, ParsedAddress};
use router::Route;

/// "Rev. October 2018" anywhere in the document text.
static REVISION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bRev\.\s*([A-Za-z]+)\s*([0-9]{4})").expect("valid revision regex")
});

/// A value with the analysis service's confidence for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Option<String>,
    pub confidence: Option<f64>,
}

impl FieldValue {
    pub fn new(value: Option<String>, confidence: Option<f64>) -> Self {
        Self { value, confidence }
    }
}

/// The closed set of per-field entries in a [`CanonicalRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    EntityName,
    BusinessName,
    Address,
    City,
    State,
    ZipCode,
    Ssn,
    Ein,
    Date,
    Signature,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::EntityName,
        CanonicalField::BusinessName,
        CanonicalField::Address,
        CanonicalField::City,
        CanonicalField::State,
        CanonicalField::ZipCode,
        CanonicalField::Ssn,
        CanonicalField::Ein,
        CanonicalField::Date,
        CanonicalField::Signature,
    ];

    /// Key used in the serialized record.
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::EntityName => "Entity Name",
            CanonicalField::BusinessName => "Business Name",
            CanonicalField::Address => "Address",
            CanonicalField::City => "City",
            CanonicalField::State => "State",
            CanonicalField::ZipCode => "ZipCode",
            CanonicalField::Ssn => "SSN",
            CanonicalField::Ein => "EIN",
            CanonicalField::Date => "Date",
            CanonicalField::Signature => "Signature",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-shape output of normalization. Every key is always serialized,
/// with `null`s for fields no raw label matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(rename = "Entity Name")]
    pub entity_name: FieldValue,
    #[serde(rename = "Business Name")]
    pub business_name: FieldValue,
    #[serde(rename = "Address")]
    pub address: FieldValue,
    #[serde(rename = "City")]
    pub city: FieldValue,
    #[serde(rename = "State")]
    pub state: FieldValue,
    #[serde(rename = "ZipCode")]
    pub zip_code: FieldValue,
    #[serde(rename = "SSN")]
    pub ssn: FieldValue,
    #[serde(rename = "EIN")]
    pub ein: FieldValue,
    #[serde(rename = "Date")]
    pub date: FieldValue,
    #[serde(rename = "Signature")]
    pub signature: FieldValue,
    /// "October 2018", or empty when the document carries no revision line.
    #[serde(rename = "W9 Form Revision")]
    pub form_revision: String,
}

impl CanonicalRecord {
    pub fn field(&self, field: CanonicalField) -> &FieldValue {
        match field {
            CanonicalField::EntityName => &self.entity_name,
            CanonicalField::BusinessName => &self.business_name,
            CanonicalField::Address => &self.address,
            CanonicalField::City => &self.city,
            CanonicalField::State => &self.state,
            CanonicalField::ZipCode => &self.zip_code,
            CanonicalField::Ssn => &self.ssn,
            CanonicalField::Ein => &self.ein,
            CanonicalField::Date => &self.date,
            CanonicalField::Signature => &self.signature,
        }
    }

    pub fn field_mut(&mut self, field: CanonicalField) -> &mut FieldValue {
        match field {
            CanonicalField::EntityName => &mut self.entity_name,
            CanonicalField::BusinessName => &mut self.business_name,
            CanonicalField::Address => &mut self.address,
            CanonicalField::City => &mut self.city,
            CanonicalField::State => &mut self.state,
            CanonicalField::ZipCode => &mut self.zip_code,
            CanonicalField::Ssn => &mut self.ssn,
            CanonicalField::Ein => &mut self.ein,
            CanonicalField::Date => &mut self.date,
            CanonicalField::Signature => &mut self.signature,
        }
    }

    /// How many per-field entries carry a value (out of all of them).
    pub fn coverage(&self) -> (usize, usize) {
        let filled = CanonicalField::ALL
            .iter()
            .filter(|f| self.field(**f).value.is_some())
            .count();
        (filled, CanonicalField::ALL.len())
    }

    fn apply_address(&mut self, parsed: ParsedAddress, confidence: Option<f64>) {
        self.city = FieldValue::new(parsed.city, confidence);
        self.state = FieldValue::new(parsed.state, confidence);
        self.zip_code = FieldValue::new(parsed.zip_code, confidence);
    }
}

/// What the formatting boundary hands back: a record, or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormatOutcome {
    Record(CanonicalRecord),
    Error { error: String },
}

impl FormatOutcome {
    /// Collapse a glue-layer result into the caller-facing shape.
    pub fn from_result(result: crate::Result<CanonicalRecord>) -> Self {
        match result {
            Ok(record) => FormatOutcome::Record(record),
            Err(e) => {
                error!(error = %e, "Error during formatting");
                FormatOutcome::Error {
                    error: format!("Error during formatting: {e}"),
                }
            }
        }
    }

    pub fn record(&self) -> Option<&CanonicalRecord> {
        match self {
            FormatOutcome::Record(record) => Some(record),
            FormatOutcome::Error { .. } => None,
        }
    }
}

/// Map raw detections onto the canonical schema.
///
/// Each label is routed independently; labels no marker matches are dropped.
/// A later field routed to the same slot overwrites an earlier one.
pub fn format_document(
    analysis: &DocumentAnalysis,
    resolver: &dyn AddressResolver,
) -> CanonicalRecord {
    let mut record = CanonicalRecord {
        form_revision: scan_revision(&analysis.content),
        ..Default::default()
    };

    for raw in &analysis.fields {
        let Some(route) = router::route(&raw.label) else {
            debug!(label = %raw.label, "No canonical field for label");
            continue;
        };

        match route {
            Route::Field(field) => {
                *record.field_mut(field) = FieldValue::new(raw.value.clone(), raw.confidence);
            }
            Route::Address => {
                let fragment = raw.value.as_deref().unwrap_or_default();
                let parsed = resolver.resolve(fragment);
                info!(?parsed, "Split city/state/ZIP");
                record.apply_address(parsed, raw.confidence);
            }
            Route::Date => {
                let value = raw
                    .value
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(date::normalize_date);
                record.date = FieldValue::new(value, raw.confidence);
            }
        }
    }

    let (filled, total) = record.coverage();
    info!(filled, total, revision = %record.form_revision, "Formatted record");
    record
}

/// Month and year from the form's "Rev." line, as "October 2018".
pub fn scan_revision(content: &str) -> String {
    REVISION_RE
        .captures(content)
        .map(|c| format!("{} {}", &c[1], &c[2]))
        .unwrap_or_default()
}
