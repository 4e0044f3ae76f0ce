use kernel::model::diagnostic::Severity;
use kernel::model::file_result::FileResult;

// The label compilers print in front of a diagnostic message.
fn get_label_from_severity(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Notice => "note",
        Severity::None => "remark",
    }
}

/// Render the results in the `path:line:col: severity: message [check]` format of compiler
/// diagnostics. Files that could not be analyzed get one `path: error: ...` line per error.
pub fn generate_text_results(file_results: &[FileResult]) -> String {
    let mut output = String::new();
    for r in file_results {
        for error in &r.errors {
            output.push_str(&format!(
                "{}: error: {} [{}]\n",
                r.filename, error, r.check_name
            ));
        }
        for d in &r.diagnostics {
            output.push_str(&format!(
                "{}:{}:{}: {}: {} [{}]\n",
                r.filename,
                d.position.line,
                d.position.col,
                get_label_from_severity(d.severity),
                d.message,
                r.check_name
            ));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::position::Position;
    use kernel::model::diagnostic::Diagnostic;
    use kernel::model::file_result::ERROR_PARSING;

    fn diagnostic(line: u32, col: u32, severity: Severity, message: &str) -> Diagnostic {
        Diagnostic {
            check_name: "lobster-tracing".to_string(),
            position: Position::new(line, col),
            severity,
            message: message.to_string(),
            subject: None,
        }
    }

    #[test]
    fn test_generate_text_results() {
        let results = vec![
            FileResult {
                check_name: "lobster-tracing".to_string(),
                filename: "src/tracing.cpp".to_string(),
                diagnostics: vec![
                    diagnostic(5, 6, Severity::Warning, "function test1 has no tracing tags"),
                    diagnostic(28, 5, Severity::Notice, "main function main traces to  cb-1"),
                ],
                errors: vec![],
                parsing_time_ms: 0,
                execution_time_ms: 0,
            },
            FileResult {
                check_name: "lobster-tracing".to_string(),
                filename: "src/broken.c".to_string(),
                diagnostics: vec![],
                errors: vec![ERROR_PARSING.to_string()],
                parsing_time_ms: 0,
                execution_time_ms: 0,
            },
        ];
        assert_eq!(
            generate_text_results(&results),
            "src/tracing.cpp:5:6: warning: function test1 has no tracing tags [lobster-tracing]\n\
             src/tracing.cpp:28:5: note: main function main traces to  cb-1 [lobster-tracing]\n\
             src/broken.c: error: error-parsing [lobster-tracing]\n"
        );
    }

    #[test]
    fn test_no_results() {
        assert_eq!(generate_text_results(&[]), "");
    }
}
