use indexmap::IndexMap;

use crate::model::config_file::{CheckConfig, PathConfig};
use std::collections::HashMap;

/// An object that provides operations to filter checks by the path of the file to analyze.
#[derive(Default, Clone)]
pub struct PathRestrictions {
    /// Per-check path restrictions.
    checks: HashMap<String, PathConfig>,
}

impl PathRestrictions {
    /// Builds a `PathRestrictions` from a map of check configurations.
    pub fn from_check_configs(checks: &IndexMap<String, CheckConfig>) -> PathRestrictions {
        PathRestrictions {
            checks: checks
                .iter()
                .map(|(name, config)| (name.clone(), config.paths.clone()))
                .collect(),
        }
    }

    /// Returns whether the given check applies to a file.
    pub fn check_applies(&self, check_name: &str, file_path: &str) -> bool {
        match self.checks.get(check_name) {
            None => true,
            Some(paths) => paths.allows_file(file_path),
        }
    }
}
