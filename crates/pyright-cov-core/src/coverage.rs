//! Coverage extraction from the checker's JSON report.
//!
//! Checker versions disagree on where the coverage figure lives, so each known
//! layout is a [`CoverageSchema`] variant. Variants are tried in
//! [`CoverageSchema::ALL`] order and the first one that applies wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CovError, CovResult};

/// Known report layouts carrying a coverage figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageSchema {
    /// `typeCompleteness.completenessScore`, a fraction in `[0, 1]`.
    TypeCompleteness,

    /// `summary.{filesAnalyzed, filesWithTypeErrors, filesWithTypeInformation}`.
    DiagnosticSummary,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeCompletenessSection {
    completeness_score: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarySection {
    files_analyzed: f64,
    files_with_type_errors: f64,
    files_with_type_information: f64,
}

impl CoverageSchema {
    /// Detection order.
    pub const ALL: [CoverageSchema; 2] = [
        CoverageSchema::TypeCompleteness,
        CoverageSchema::DiagnosticSummary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CoverageSchema::TypeCompleteness => "type_completeness",
            CoverageSchema::DiagnosticSummary => "diagnostic_summary",
        }
    }

    /// Coverage percentage according to this layout, or `None` when the
    /// payload does not have it.
    pub fn extract(&self, payload: &Value) -> Option<f64> {
        match self {
            CoverageSchema::TypeCompleteness => {
                let section = payload.get("typeCompleteness")?;
                let section = TypeCompletenessSection::deserialize(section).ok()?;
                Some(section.completeness_score * 100.0)
            }
            CoverageSchema::DiagnosticSummary => {
                let section = payload.get("summary")?;
                let section = SummarySection::deserialize(section).ok()?;
                if section.files_analyzed == 0.0 {
                    return None;
                }
                let covered = section.files_with_type_errors + section.files_with_type_information;
                Some(covered / section.files_analyzed * 100.0)
            }
        }
    }
}

/// A parsed report together with the coverage figure derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    pub payload: Value,
    pub schema: CoverageSchema,
    pub coverage_percent: f64,
}

impl CoverageReport {
    /// Parse report text and extract coverage.
    pub fn from_json(text: &str) -> CovResult<Self> {
        let payload: Value = serde_json::from_str(text)?;
        Self::from_value(payload)
    }

    /// Extract coverage from an already-parsed report.
    pub fn from_value(payload: Value) -> CovResult<Self> {
        let (schema, coverage_percent) = CoverageSchema::ALL
            .iter()
            .find_map(|schema| schema.extract(&payload).map(|percent| (*schema, percent)))
            .ok_or(CovError::UnrecognizedSchema)?;

        Ok(Self {
            payload,
            schema,
            coverage_percent,
        })
    }
}
