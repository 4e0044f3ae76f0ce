use sha2::{Digest, Sha256};

use common::analysis_options::AnalysisOptions;
use kernel::checks::ConfiguredCheck;
use kernel::model::common::OutputFormat;
use kernel::model::config_file::PathConfig;
use kernel::path_restrictions::PathRestrictions;

/// represents the CLI configuration
#[derive(Clone)]
pub struct CliConfiguration {
    pub use_debug: bool,
    pub use_configuration_file: bool,
    pub ignore_gitignore: bool,
    pub source_directory: String,
    pub source_subdirectories: Vec<String>,
    pub path_config: PathConfig,
    pub output_format: OutputFormat,
    pub output_file: Option<String>,
    pub num_cpus: usize, // of cpus to use for parallelism
    pub checks: Vec<ConfiguredCheck>,
    pub path_restrictions: PathRestrictions,
    pub max_file_size_kb: u64,
    pub show_performance_statistics: bool,
    pub print_violations: bool,
    pub fail_on_untraced: bool,
    pub ignore_generated_files: bool,
    pub warnings_as_errors: bool,
}

impl CliConfiguration {
    /// Generate a digest to include in SARIF files to indicate what configuration and checks were
    /// used to run the analysis. To compute the digest, we take the attributes that are important
    /// to replicate the analysis such as the ignored paths and enabled checks.
    pub fn generate_digest(&self) -> String {
        let mut checks_string: Vec<String> = self
            .checks
            .iter()
            .map(|c| format!("{}:{}", c.name, c.context.severity))
            .collect();

        // the digest must not depend on the order the checks were enabled.
        checks_string.sort();

        let full_config_string = format!(
            "{}:{}:{}:{}:{}:{}:{}",
            join_patterns(&self.path_config.ignore),
            self.path_config
                .only
                .as_ref()
                .map_or("".to_string(), |v| join_patterns(v)),
            self.ignore_gitignore,
            checks_string.join(","),
            self.max_file_size_kb,
            self.source_subdirectories.join(","),
            self.ignore_generated_files
        );
        // compute the hash using sha2
        format!("{:x}", Sha256::digest(full_config_string.as_bytes()))
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            use_debug: self.use_debug,
            ignore_generated_files: self.ignore_generated_files,
            warnings_as_errors: self.warnings_as_errors,
        }
    }
}

fn join_patterns<T: ToString>(patterns: &[T]) -> String {
    patterns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::checks::{CheckContext, CheckFactories};
    use kernel::model::diagnostic::Severity;

    fn configuration(severity: Option<Severity>) -> CliConfiguration {
        let options = AnalysisOptions::default();
        let check = CheckFactories::with_builtin_modules()
            .unwrap()
            .configure("lobster-tracing", CheckContext::new(severity, &options))
            .unwrap();
        CliConfiguration {
            use_debug: false,
            use_configuration_file: true,
            ignore_gitignore: false,
            source_directory: "myproject".to_string(),
            source_subdirectories: vec![],
            path_config: PathConfig {
                ignore: vec!["third_party".into()],
                only: None,
            },
            output_format: OutputFormat::Sarif,
            output_file: None,
            num_cpus: 2,
            checks: vec![check],
            path_restrictions: PathRestrictions::default(),
            max_file_size_kb: 1,
            show_performance_statistics: false,
            print_violations: false,
            fail_on_untraced: false,
            ignore_generated_files: true,
            warnings_as_errors: false,
        }
    }

    #[test]
    fn test_generate_digest() {
        let config = configuration(None);
        let digest = config.generate_digest();
        assert_eq!(digest.len(), 64);
        // stable across calls and unaffected by the output settings
        let mut other = config.clone();
        other.output_format = OutputFormat::Json;
        other.num_cpus = 8;
        assert_eq!(digest, other.generate_digest());
    }

    #[test]
    fn test_digest_changes_with_analysis_settings() {
        let config = configuration(None);
        assert_ne!(
            config.generate_digest(),
            configuration(Some(Severity::Error)).generate_digest()
        );

        let mut other = config.clone();
        other.max_file_size_kb = 2;
        assert_ne!(config.generate_digest(), other.generate_digest());
    }

    #[test]
    fn test_analysis_options() {
        let mut config = configuration(None);
        config.warnings_as_errors = true;
        config.ignore_generated_files = false;
        let options = config.analysis_options();
        assert!(options.warnings_as_errors);
        assert!(!options.ignore_generated_files);
        assert!(!options.use_debug);
    }
}
