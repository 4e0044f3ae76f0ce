use crate::analysis::generated_content::is_generated_file;
use crate::analysis::translation_unit::TranslationUnit;
use crate::checks::ConfiguredCheck;
use crate::model::common::Language;
use crate::model::file_result::{FileResult, ERROR_PARSING};
use common::analysis_options::AnalysisOptions;
use std::borrow::Borrow;
use std::time::Instant;

// main function
// 1. Parse the file and collect its comments and function definitions
// 2. Run every check with fresh state
// 3. Collect diagnostics, timings and errors
pub fn analyze<I>(
    language: &Language,
    checks: I,
    filename: &str,
    code: &str,
    analysis_option: &AnalysisOptions,
) -> Vec<FileResult>
where
    I: IntoIterator,
    I::Item: Borrow<ConfiguredCheck>,
{
    // check if we should ignore the file before doing any more expensive work.
    if analysis_option.ignore_generated_files && is_generated_file(code, language) {
        tracing::debug!("Skipping generated file {}", filename);
        return vec![];
    }

    let parsing_time = Instant::now();
    let unit = TranslationUnit::parse(code, language);
    let parsing_time_ms = parsing_time.elapsed().as_millis();

    match unit {
        Err(err) => {
            tracing::debug!("error when parsing source file {filename}: {err}");
            checks
                .into_iter()
                .map(|check| FileResult {
                    check_name: check.borrow().name.clone(),
                    filename: filename.to_string(),
                    diagnostics: vec![],
                    errors: vec![ERROR_PARSING.to_string()],
                    parsing_time_ms,
                    execution_time_ms: 0,
                })
                .collect()
        }
        Ok(unit) => {
            if unit.has_syntax_errors {
                tracing::debug!("{filename} has syntax errors, results may be incomplete");
            }
            checks
                .into_iter()
                .map(|check| {
                    let check = check.borrow();
                    tracing::debug!("Apply check {} file {}", check.name, filename);

                    let execution_time = Instant::now();
                    let mut engine = check.engine();
                    check.instantiate().run(&unit, &mut engine);

                    FileResult {
                        check_name: check.name.clone(),
                        filename: filename.to_string(),
                        diagnostics: engine.into_diagnostics(),
                        errors: vec![],
                        parsing_time_ms,
                        execution_time_ms: execution_time.elapsed().as_millis(),
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckContext, CheckFactories};
    use crate::model::diagnostic::{Severity, TracingStatus};

    fn tracing_check(options: &AnalysisOptions) -> ConfiguredCheck {
        CheckFactories::with_builtin_modules()
            .unwrap()
            .configure("lobster-tracing", CheckContext::new(None, options))
            .unwrap()
    }

    #[test]
    fn test_analyze() {
        let code = r#"
int untraced() { return 0; }

int traced() {
  // lobster-trace: req-1
  return 1;
}
"#;
        let options = AnalysisOptions::default();
        let results = analyze(
            &Language::Cpp,
            &[tracing_check(&options)],
            "src/main.cpp",
            code,
            &options,
        );
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.check_name, "lobster-tracing");
        assert_eq!(result.filename, "src/main.cpp");
        assert!(result.errors.is_empty());
        assert_eq!(result.diagnostics.len(), 2);
        assert_eq!(result.diagnostics[0].message, "function untraced has no tracing tags");
        assert_eq!(result.diagnostics[1].message, "function traced traces to  req-1");
        assert_eq!(
            result.diagnostics[1].subject.as_ref().map(|s| s.status),
            Some(TracingStatus::Traced)
        );
        assert!(result
            .diagnostics
            .iter()
            .all(|d| d.severity == Severity::Warning));
        assert_eq!(result.count_untraced(), 1);
    }

    #[test]
    fn test_warnings_as_errors() {
        let options = AnalysisOptions {
            warnings_as_errors: true,
            ..Default::default()
        };
        let results = analyze(
            &Language::C,
            vec![tracing_check(&options)],
            "lib.c",
            "int f(void) { return 0; }\n",
            &options,
        );
        assert_eq!(results[0].diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_generated_files() {
        let code = "// @generated\nint f() { return 0; }\n";
        let options = AnalysisOptions::default();
        let check = tracing_check(&options);
        assert!(analyze(&Language::Cpp, [&check], "gen.cpp", code, &options).is_empty());

        let options = AnalysisOptions {
            ignore_generated_files: false,
            ..Default::default()
        };
        let results = analyze(&Language::Cpp, [&check], "gen.cpp", code, &options);
        assert_eq!(results[0].diagnostics.len(), 1);
    }

    #[test]
    fn test_no_checks() {
        let options = AnalysisOptions::default();
        let checks: Vec<ConfiguredCheck> = vec![];
        assert!(analyze(&Language::Cpp, &checks, "a.cpp", "int f() {}", &options).is_empty());
    }
}
