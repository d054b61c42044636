//! JSON Output

use crate::report::Report;
use serde::{Deserialize, Serialize};

/// Schema identifier written alongside every JSON report
pub const REPORT_SCHEMA: &str = "pibench-report";
/// Schema version
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Schema information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSchema {
    /// Schema identifier
    pub schema: String,
    /// Schema version
    pub version: u32,
}

impl Default for ReportSchema {
    fn default() -> Self {
        Self {
            schema: REPORT_SCHEMA.to_string(),
            version: REPORT_SCHEMA_VERSION,
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "$schema")]
    schema: ReportSchema,
    #[serde(flatten)]
    report: &'a Report,
}

/// Generate a prettified JSON report.
///
/// The report fields sit at the top level next to a `$schema` tag, so the
/// output loads back as a plain [`Report`].
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Envelope {
        schema: ReportSchema::default(),
        report,
    })
}
