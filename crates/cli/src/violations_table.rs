use kernel::model::file_result::FileResult;
use prettytable::{format, Table};

fn build_violations_table(file_results: &[FileResult]) -> Table {
    let mut table = Table::new();
    let format = format::FormatBuilder::new()
        .separator(
            format::LinePosition::Title,
            format::LineSeparator::new('-', '-', '-', '-'),
        )
        .padding(1, 1)
        .build();
    table.set_format(format);
    table.set_titles(row![
        "check", "filename", "location", "severity", "status", "message"
    ]);
    for file_result in file_results {
        for diagnostic in &file_result.diagnostics {
            let position = format!("{}:{}", diagnostic.position.line, diagnostic.position.col);
            let status = diagnostic
                .subject
                .as_ref()
                .map(|s| s.status.to_string())
                .unwrap_or_default();
            table.add_row(row![
                file_result.check_name,
                file_result.filename,
                position,
                diagnostic.severity.to_string(),
                status,
                diagnostic.message
            ]);
        }
    }
    table
}

pub fn print_violations_table(file_results: &[FileResult]) {
    build_violations_table(file_results).printstd();
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::position::Position;
    use kernel::model::diagnostic::{Diagnostic, DiagnosticSubject, Severity, TracingStatus};
    use kernel::model::function::FunctionKind;

    #[test]
    fn test_build_violations_table() {
        let results = vec![FileResult {
            check_name: "lobster-tracing".to_string(),
            filename: "src/a.cpp".to_string(),
            diagnostics: vec![Diagnostic {
                check_name: "lobster-tracing".to_string(),
                position: Position::new(3, 5),
                severity: Severity::Warning,
                message: "function f has no tracing tags".to_string(),
                subject: Some(DiagnosticSubject {
                    kind: FunctionKind::Function,
                    qualified_name: "f".to_string(),
                    status: TracingStatus::Untraced,
                    payload: None,
                }),
            }],
            errors: vec![],
            parsing_time_ms: 0,
            execution_time_ms: 0,
        }];
        let table = build_violations_table(&results);
        assert_eq!(table.len(), 1);
        let rendered = table.to_string();
        assert!(rendered.contains("src/a.cpp"));
        assert!(rendered.contains("3:5"));
        assert!(rendered.contains("untraced"));
        assert!(build_violations_table(&[]).is_empty());
    }
}
