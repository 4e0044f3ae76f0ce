use crate::model::comment::{AnnotatedComment, CommentKind};
use common::model::position::SourceRange;

/// Common start of every tracing tag.
pub const LOBSTER_STEM: &str = "// lobster-";
pub const TRACE_PREFIX: &str = "// lobster-trace:";
pub const EXCLUDE_PREFIX: &str = "// lobster-exclude:";

// Width of the marker that follows the stem. These are pinned and never derived from the
// prefixes: the payload offset is part of the output format.
pub const TRACE_MARKER_WIDTH: usize = 6;
pub const EXCLUDE_MARKER_WIDTH: usize = 8;

/// Collects the tracing tags of one file, in the order the comments are seen.
#[derive(Debug, Default)]
pub struct CommentClassifier {
    comments: Vec<AnnotatedComment>,
}

impl CommentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect one comment. Tracing tags are retained, anything else is ignored.
    ///
    /// Always returns `false`: the comment is never consumed, so the host keeps processing it
    /// as it normally would.
    pub fn handle_comment(&mut self, text: &str, range: SourceRange) -> bool {
        let kind = if text.starts_with(TRACE_PREFIX) {
            CommentKind::Trace
        } else if text.starts_with(EXCLUDE_PREFIX) {
            CommentKind::Exclude
        } else {
            return false;
        };

        let marker_width = match kind {
            CommentKind::Trace => TRACE_MARKER_WIDTH,
            CommentKind::Exclude => EXCLUDE_MARKER_WIDTH,
        };
        let payload = text
            .get(LOBSTER_STEM.len() + marker_width..)
            .unwrap_or_default()
            .trim_end_matches('\r');

        self.comments.push(AnnotatedComment {
            range,
            kind,
            payload: payload.to_string(),
        });
        false
    }

    /// All the tags seen so far, in discovery order.
    pub fn comments(&self) -> &[AnnotatedComment] {
        &self.comments
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::position::{Position, SourceLocation};

    fn range(line: u32, begin: usize, end: usize) -> SourceRange {
        SourceRange::new(
            SourceLocation::new(begin, Position::new(line, 1)),
            SourceLocation::new(end, Position::new(line, (end - begin) as u32 + 1)),
        )
    }

    #[test]
    fn test_marker_widths_match_prefixes() {
        assert_eq!(LOBSTER_STEM.len() + TRACE_MARKER_WIDTH, TRACE_PREFIX.len());
        assert_eq!(
            LOBSTER_STEM.len() + EXCLUDE_MARKER_WIDTH,
            EXCLUDE_PREFIX.len()
        );
    }

    #[test]
    fn test_trace_comment() {
        let mut classifier = CommentClassifier::new();
        let text = "// lobster-trace: cb-12345, tex-potato";
        assert!(!classifier.handle_comment(text, range(1, 0, text.len())));

        let comments = classifier.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Trace);
        assert_eq!(comments[0].payload, " cb-12345, tex-potato");
        assert_eq!(comments[0].range, range(1, 0, text.len()));
    }

    #[test]
    fn test_exclude_comment() {
        let mut classifier = CommentClassifier::new();
        let text = "// lobster-exclude: Constructor";
        assert!(!classifier.handle_comment(text, range(1, 0, text.len())));

        let comments = classifier.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Exclude);
        assert_eq!(comments[0].payload, " Constructor");
    }

    #[test]
    fn test_irrelevant_comments() {
        let mut classifier = CommentClassifier::new();
        for text in [
            "// just a comment",
            "/* lobster-trace: cb-1 */",
            "//lobster-trace: cb-1",
            "// LOBSTER-TRACE: cb-1",
            "  // lobster-trace: cb-1",
            "// lobster-justification: cb-1",
            "// lobster-trace",
            "",
        ] {
            assert!(!classifier.handle_comment(text, range(1, 0, text.len())));
        }
        assert!(classifier.is_empty());
    }

    #[test]
    fn test_empty_payload_and_crlf() {
        let mut classifier = CommentClassifier::new();
        classifier.handle_comment("// lobster-trace:", range(1, 0, 17));
        classifier.handle_comment("// lobster-exclude: legacy\r", range(2, 18, 45));

        let comments = classifier.comments();
        assert_eq!(comments[0].payload, "");
        assert_eq!(comments[1].payload, " legacy");
    }

    #[test]
    fn test_discovery_order() {
        let mut classifier = CommentClassifier::new();
        classifier.handle_comment("// lobster-exclude: b", range(3, 40, 61));
        classifier.handle_comment("// nope", range(2, 30, 37));
        classifier.handle_comment("// lobster-trace: a", range(1, 0, 19));

        let payloads = classifier
            .comments()
            .iter()
            .map(|c| c.payload.as_str())
            .collect::<Vec<_>>();
        assert_eq!(payloads, vec![" b", " a"]);
    }
}
