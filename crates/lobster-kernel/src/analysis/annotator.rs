use crate::analysis::classifier::CommentClassifier;
use crate::analysis::diagnostics::DiagnosticEngine;
use crate::model::comment::{AnnotatedComment, CommentKind};
use crate::model::diagnostic::{DiagnosticSubject, TracingStatus};
use crate::model::function::{FunctionDeclaration, FunctionKind};
use common::model::position::SourceRange;

pub const TRACES_TO_TEMPLATE: &str = "%0 %1 traces to %2";
pub const EXEMPT_TEMPLATE: &str = "%0 %1 exempt from tracing: %2";
pub const NO_TRACING_TEMPLATE: &str = "%0 %1 has no tracing tags";

/// Reports, for each function with a body, the tracing tags found inside that body.
///
/// Trace tags come first, then exclude tags, each group in discovery order. A function
/// without any tag gets a single "has no tracing tags" diagnostic. A comment inside nested
/// bodies (e.g. a method of a local class) is reported for every enclosing function.
pub struct FunctionAnnotator<'a> {
    classifier: &'a CommentClassifier,
}

impl<'a> FunctionAnnotator<'a> {
    pub fn new(classifier: &'a CommentClassifier) -> Self {
        Self { classifier }
    }

    /// Annotate one declaration. Returns the number of diagnostics emitted.
    pub fn annotate<D: FunctionDeclaration + ?Sized>(
        &self,
        declaration: &D,
        engine: &mut DiagnosticEngine,
    ) -> usize {
        let Some(kind) = FunctionKind::classify(declaration) else {
            return 0;
        };
        let Some(body) = declaration.body_range() else {
            return 0;
        };

        let location = declaration.location();
        let name = declaration.qualified_name();
        let mut emitted = 0;

        for (comment_kind, template, status) in [
            (CommentKind::Trace, TRACES_TO_TEMPLATE, TracingStatus::Traced),
            (CommentKind::Exclude, EXEMPT_TEMPLATE, TracingStatus::Exempt),
        ] {
            for comment in self.contained(&body, comment_kind) {
                engine
                    .report(location, template)
                    .arg(kind)
                    .arg(name)
                    .arg(&comment.payload)
                    .subject(DiagnosticSubject {
                        kind,
                        qualified_name: name.to_string(),
                        status,
                        payload: Some(comment.payload.clone()),
                    })
                    .emit();
                emitted += 1;
            }
        }

        if emitted == 0 {
            engine
                .report(location, NO_TRACING_TEMPLATE)
                .arg(kind)
                .arg(name)
                .subject(DiagnosticSubject {
                    kind,
                    qualified_name: name.to_string(),
                    status: TracingStatus::Untraced,
                    payload: None,
                })
                .emit();
            emitted = 1;
        }
        emitted
    }

    fn contained<'b>(
        &'b self,
        body: &'b SourceRange,
        kind: CommentKind,
    ) -> impl Iterator<Item = &'a AnnotatedComment> + 'b {
        self.classifier
            .comments()
            .iter()
            .filter(move |c| c.kind == kind && body.fully_contains(&c.range))
    }
}
