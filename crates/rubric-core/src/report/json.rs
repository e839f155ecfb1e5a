//! JSON report generation

use std::path::Path;

use crate::error::{EvalError, EvalResult};

use super::types::EvalReport;

/// JSON report generator
pub struct JsonReporter;

impl JsonReporter {
    /// Serialize a report to pretty-printed JSON
    pub fn generate(report: &EvalReport) -> EvalResult<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Serialize a report and write it to a file
    pub async fn write_to_file(report: &EvalReport, path: impl AsRef<Path>) -> EvalResult<()> {
        let json = Self::generate(report)?;
        tokio::fs::write(path.as_ref(), json)
            .await
            .map_err(|source| EvalError::ReportIo {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        tracing::info!(path = %path.as_ref().display(), "wrote evaluation report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportAggregator;
    use chrono::Utc;

    #[test]
    fn test_report_round_trips_through_json() {
        let report = ReportAggregator::new(Some("json".to_string()), Utc::now()).aggregate(vec![], 0.0);
        let json = JsonReporter::generate(&report).unwrap();
        let parsed: EvalReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(parsed.experiment.as_deref(), Some("json"));
    }
}
