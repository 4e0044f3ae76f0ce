use crate::analysis::languages::cpp::comments::get_comments;
use crate::analysis::languages::cpp::declarations::get_function_records;
use crate::analysis::tree_sitter::get_tree;
use crate::model::common::Language;
use crate::model::function::FunctionRecord;
use common::model::position::SourceRange;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("unable to parse the file as {0}")]
    Parsing(Language),
}

/// A comment as written in the source, with the range it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawComment<'a> {
    pub text: &'a str,
    pub range: SourceRange,
}

/// What the checks see of one parsed file: every comment in document order and every
/// function-like declaration.
#[derive(Debug)]
pub struct TranslationUnit<'a> {
    pub language: Language,
    pub comments: Vec<RawComment<'a>>,
    pub functions: Vec<FunctionRecord>,
    /// The parser recovered from at least one syntax error.
    pub has_syntax_errors: bool,
}

impl<'a> TranslationUnit<'a> {
    pub fn parse(code: &'a str, language: &Language) -> Result<Self, AnalysisError> {
        let tree = get_tree(code, language).ok_or(AnalysisError::Parsing(*language))?;
        Ok(Self::from_tree(code, &tree, language))
    }

    pub fn from_tree(code: &'a str, tree: &tree_sitter::Tree, language: &Language) -> Self {
        TranslationUnit {
            language: *language,
            comments: get_comments(code, tree),
            functions: get_function_records(code, tree),
            has_syntax_errors: tree.root_node().has_error(),
        }
    }
}
