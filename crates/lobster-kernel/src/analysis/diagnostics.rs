use crate::model::diagnostic::{Diagnostic, DiagnosticSubject, Severity};
use common::model::position::SourceLocation;

/// Receives the diagnostics emitted by one check while it analyzes one file.
///
/// Messages are built from a template with positional fields (`%0`, `%1`, ...), the
/// arguments being streamed in order with [`PendingDiagnostic::arg`]. `%%` stands for a
/// single `%`.
#[derive(Debug)]
pub struct DiagnosticEngine {
    check_name: String,
    severity: Severity,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticEngine {
    pub fn new(check_name: &str, severity: Severity) -> Self {
        Self {
            check_name: check_name.to_string(),
            severity,
            diagnostics: vec![],
        }
    }

    /// Start a diagnostic at `location`. Nothing is recorded until [`PendingDiagnostic::emit`].
    pub fn report(&mut self, location: SourceLocation, template: &str) -> PendingDiagnostic<'_> {
        PendingDiagnostic {
            engine: self,
            location,
            template: template.to_string(),
            args: vec![],
            subject: None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// A diagnostic being built. Arguments are bound to the template fields in the order they
/// are added.
#[must_use = "a diagnostic is only recorded when emitted"]
pub struct PendingDiagnostic<'a> {
    engine: &'a mut DiagnosticEngine,
    location: SourceLocation,
    template: String,
    args: Vec<String>,
    subject: Option<DiagnosticSubject>,
}

impl PendingDiagnostic<'_> {
    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Attach the function the diagnostic is about, used by structured reports.
    pub fn subject(mut self, subject: DiagnosticSubject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn emit(self) {
        let message = format_message(&self.template, &self.args);
        self.engine.diagnostics.push(Diagnostic {
            check_name: self.engine.check_name.clone(),
            position: self.location.position,
            severity: self.engine.severity,
            message,
            subject: self.subject,
        });
    }
}

/// Substitute the positional fields of `template`. A field without a matching argument is
/// kept as is.
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '%' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '%')) => {
                chars.next();
                result.push('%');
            }
            Some((start, d)) if d.is_ascii_digit() => {
                let start = *start;
                let mut end = start;
                while let Some((i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let field = &template[start..end];
                match field.parse::<usize>().ok().and_then(|i| args.get(i)) {
                    Some(arg) => result.push_str(arg),
                    None => {
                        result.push('%');
                        result.push_str(field);
                    }
                }
            }
            _ => result.push('%'),
        }
    }
    result
}
