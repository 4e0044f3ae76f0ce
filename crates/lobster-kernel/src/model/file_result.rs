use crate::model::diagnostic::{Diagnostic, TracingStatus};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

pub const ERROR_PARSING: &str = "error-parsing";

/// The diagnostics produced by one check on one file.
#[derive(Deserialize, Debug, Serialize, Clone, Builder)]
pub struct FileResult {
    pub check_name: String,
    pub filename: String,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: Vec<String>,
    pub parsing_time_ms: u128,
    pub execution_time_ms: u128,
}

impl FileResult {
    /// Number of diagnostics reporting a function without any tracing tag.
    pub fn count_untraced(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| {
                d.subject
                    .as_ref()
                    .is_some_and(|s| s.status == TracingStatus::Untraced)
            })
            .count()
    }
}
