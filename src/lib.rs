//! w9_extract: normalizes key/value detections from scanned W-9 forms into a
//! fixed canonical record.
//!
//! ```text
//! PDF ──► pdf_text (pre-check) ──► analysis (document service)
//!                                       │
//!                   llm_address (opt) ──┤
//!                                       ▼
//!                  normalize: router ──► address / date ──► CanonicalRecord
//! ```
//!
//! Everything under [`normalize`] is synchronous and pure; the network
//! collaborators live in [`analysis`] and [`llm_address`] and are driven by
//! [`pipeline`].

pub mod analysis;
pub mod config;
pub mod error;
pub mod llm_address;
pub mod normalize;
pub mod pdf_text;
pub mod pipeline;

pub use error::{Error, Result};
pub use normalize::{CanonicalField, CanonicalRecord, FieldValue, FormatOutcome};
