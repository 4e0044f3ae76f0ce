pub mod analyze;
pub mod annotator;
pub mod classifier;
pub mod diagnostics;
pub mod generated_content;
pub mod languages;
pub mod translation_unit;
pub mod tree_sitter;
