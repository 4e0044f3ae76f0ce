use serde::{Deserialize, Serialize};

// Used internally to pass options to the analysis
#[derive(Clone, Deserialize, Debug, Serialize)]
pub struct AnalysisOptions {
    pub use_debug: bool,
    pub ignore_generated_files: bool,
    pub warnings_as_errors: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            use_debug: false,
            ignore_generated_files: true,
            warnings_as_errors: false,
        }
    }
}
