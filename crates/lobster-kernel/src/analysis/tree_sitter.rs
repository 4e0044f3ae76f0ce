use crate::model::common::Language;

/// C sources are parsed with the C++ grammar: every construct the tracing check looks at
/// (comments, function definitions, `extern "C"` blocks) has the same shape in both.
pub fn get_tree_sitter_language(language: &Language) -> tree_sitter::Language {
    match language {
        Language::C | Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
    }
}

// get the tree-sitter tree
pub fn get_tree(code: &str, language: &Language) -> Option<tree_sitter::Tree> {
    let mut tree_sitter_parser = tree_sitter::Parser::new();
    let tree_sitter_language = get_tree_sitter_language(language);
    tree_sitter_parser
        .set_language(&tree_sitter_language)
        .ok()?;
    tree_sitter_parser.parse(code, None)
}
