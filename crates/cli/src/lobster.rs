use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use common::model::position::Position;
use kernel::model::diagnostic::{DiagnosticSubject, TracingStatus};
use kernel::model::file_result::FileResult;

pub const LOBSTER_GENERATOR: &str = "lobster_cpp";
pub const LOBSTER_SCHEMA: &str = "lobster-imp-trace";
pub const LOBSTER_VERSION: u32 = 3;
pub const LOBSTER_LANGUAGE: &str = "C/C++";
const TAG_NAMESPACE: &str = "cpp";
const REQUIREMENT_NAMESPACE: &str = "req";

#[derive(Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Builder)]
pub struct LobsterLocation {
    pub kind: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// One function, with the requirements it traces to.
#[derive(Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Builder)]
pub struct LobsterItem {
    pub tag: String,
    pub location: LobsterLocation,
    pub name: String,
    pub messages: Vec<String>,
    pub just_up: Vec<String>,
    pub just_down: Vec<String>,
    pub just_global: Vec<String>,
    pub refs: Vec<String>,
    pub language: String,
    pub kind: String,
}

#[derive(Clone, Deserialize, Debug, Serialize, Eq, PartialEq)]
pub struct LobsterReport {
    pub data: Vec<LobsterItem>,
    pub generator: String,
    pub schema: String,
    pub version: u32,
}

/// The requirement references of a trace payload: `" cb-1, cb-2"` gives `req cb-1` and `req cb-2`.
fn get_refs_from_payload(payload: &str) -> impl Iterator<Item = String> + '_ {
    payload
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| format!("{} {}", REQUIREMENT_NAMESPACE, id))
}

fn new_item(filename: &str, position: &Position, subject: &DiagnosticSubject) -> LobsterItem {
    LobsterItem {
        tag: format!(
            "{} {}:{}:{}",
            TAG_NAMESPACE, filename, subject.qualified_name, position.line
        ),
        location: LobsterLocation {
            kind: "file".to_string(),
            file: filename.to_string(),
            line: position.line,
            column: position.col,
        },
        name: subject.qualified_name.clone(),
        messages: vec![],
        just_up: vec![],
        just_down: vec![],
        just_global: vec![],
        refs: vec![],
        language: LOBSTER_LANGUAGE.to_string(),
        kind: subject.kind.to_string(),
    }
}

/// Build the LOBSTER trace document. Each function gets one item, whatever the number of
/// diagnostics reported about it; diagnostics without a function are not part of the document.
pub fn generate_lobster_report(file_results: &[FileResult]) -> LobsterReport {
    let mut items: IndexMap<(String, Position, String), LobsterItem> = IndexMap::new();

    for r in file_results {
        for d in &r.diagnostics {
            let Some(subject) = d.subject.as_ref() else {
                continue;
            };
            let item = items
                .entry((
                    r.filename.clone(),
                    d.position,
                    subject.qualified_name.clone(),
                ))
                .or_insert_with(|| new_item(&r.filename, &d.position, subject));
            let payload = subject.payload.as_deref().unwrap_or("");
            match subject.status {
                TracingStatus::Traced => {
                    for reference in get_refs_from_payload(payload) {
                        if !item.refs.contains(&reference) {
                            item.refs.push(reference);
                        }
                    }
                }
                TracingStatus::Exempt => item.just_up.push(payload.trim().to_string()),
                TracingStatus::Untraced => {}
            }
        }
    }

    LobsterReport {
        data: items.into_values().collect(),
        generator: LOBSTER_GENERATOR.to_string(),
        schema: LOBSTER_SCHEMA.to_string(),
        version: LOBSTER_VERSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use kernel::model::diagnostic::{Diagnostic, Severity};
    use kernel::model::function::FunctionKind;

    fn diagnostic(
        line: u32,
        col: u32,
        kind: FunctionKind,
        name: &str,
        status: TracingStatus,
        payload: Option<&str>,
    ) -> Diagnostic {
        Diagnostic {
            check_name: "lobster-tracing".to_string(),
            position: Position::new(line, col),
            severity: Severity::Warning,
            message: "message".to_string(),
            subject: Some(DiagnosticSubject {
                kind,
                qualified_name: name.to_string(),
                status,
                payload: payload.map(str::to_string),
            }),
        }
    }

    fn file_result(diagnostics: Vec<Diagnostic>) -> FileResult {
        FileResult {
            check_name: "lobster-tracing".to_string(),
            filename: "src/tracing.cpp".to_string(),
            diagnostics,
            errors: vec![],
            parsing_time_ms: 0,
            execution_time_ms: 0,
        }
    }

    #[test]
    fn test_get_refs_from_payload() {
        assert_eq!(
            get_refs_from_payload("  cb-1, cb-2,,cb-3 ").collect::<Vec<_>>(),
            vec!["req cb-1", "req cb-2", "req cb-3"]
        );
        assert_eq!(get_refs_from_payload(" ").count(), 0);
    }

    #[test]
    fn test_generate_lobster_report() {
        let report = generate_lobster_report(&[file_result(vec![
            diagnostic(5, 6, FunctionKind::Function, "test1", TracingStatus::Untraced, None),
            diagnostic(
                8,
                6,
                FunctionKind::Function,
                "test2",
                TracingStatus::Traced,
                Some("  cb-1, cb-2"),
            ),
            diagnostic(
                8,
                6,
                FunctionKind::Function,
                "test2",
                TracingStatus::Traced,
                Some(" cb-2"),
            ),
            diagnostic(
                17,
                3,
                FunctionKind::Method,
                "test3::test3",
                TracingStatus::Exempt,
                Some(" generated code"),
            ),
        ])]);

        assert_json_eq!(
            serde_json::to_value(report).unwrap(),
            serde_json::json!({
                "data": [
                    {
                        "tag": "cpp src/tracing.cpp:test1:5",
                        "location": {"kind": "file", "file": "src/tracing.cpp", "line": 5, "column": 6},
                        "name": "test1",
                        "messages": [],
                        "just_up": [],
                        "just_down": [],
                        "just_global": [],
                        "refs": [],
                        "language": "C/C++",
                        "kind": "function"
                    },
                    {
                        "tag": "cpp src/tracing.cpp:test2:8",
                        "location": {"kind": "file", "file": "src/tracing.cpp", "line": 8, "column": 6},
                        "name": "test2",
                        "messages": [],
                        "just_up": [],
                        "just_down": [],
                        "just_global": [],
                        "refs": ["req cb-1", "req cb-2"],
                        "language": "C/C++",
                        "kind": "function"
                    },
                    {
                        "tag": "cpp src/tracing.cpp:test3::test3:17",
                        "location": {"kind": "file", "file": "src/tracing.cpp", "line": 17, "column": 3},
                        "name": "test3::test3",
                        "messages": [],
                        "just_up": ["generated code"],
                        "just_down": [],
                        "just_global": [],
                        "refs": [],
                        "language": "C/C++",
                        "kind": "method"
                    }
                ],
                "generator": "lobster_cpp",
                "schema": "lobster-imp-trace",
                "version": 3
            })
        );
    }

    // diagnostics that are not about a function are left out.
    #[test]
    fn test_diagnostic_without_subject() {
        let mut d = diagnostic(1, 1, FunctionKind::Function, "f", TracingStatus::Untraced, None);
        d.subject = None;
        let report = generate_lobster_report(&[file_result(vec![d])]);
        assert!(report.data.is_empty());
        assert_eq!(report.version, 3);
    }
}
