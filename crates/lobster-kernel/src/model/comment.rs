use common::model::position::SourceRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The tracing tag carried by a comment.
#[derive(Copy, Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Hash)]
pub enum CommentKind {
    #[serde(rename = "TRACE")]
    Trace,
    #[serde(rename = "EXCLUDE")]
    Exclude,
}

impl fmt::Display for CommentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Exclude => write!(f, "exclude"),
        }
    }
}

/// A comment recognized as a tracing tag. The payload is the text after the tag prefix,
/// kept verbatim (including its leading whitespace).
#[derive(Clone, Deserialize, Debug, Serialize, Eq, PartialEq)]
pub struct AnnotatedComment {
    pub range: SourceRange,
    pub kind: CommentKind,
    pub payload: String,
}
