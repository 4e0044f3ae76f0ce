use crate::model::common::Language;

/// Number of lines inspected at the top of a file.
const HEADER_LINES: usize = 10;

// Markers written by common code generators (protoc, flex/bison, swig, ...).
const GENERATED_MARKERS: &[&str] = &[
    "@generated",
    "DO NOT EDIT",
    "Generated by the protocol buffer compiler",
    "This file was automatically generated by SWIG",
    "A Bison parser, made by GNU Bison",
    "generated by flex",
];

/// Returns true if the header of the file says it was produced by a code generator.
pub fn is_generated_file(content: &str, language: &Language) -> bool {
    match language {
        Language::C | Language::Cpp => content
            .lines()
            .take(HEADER_LINES)
            .map(str::trim_start)
            .filter(|line| line.starts_with("//") || line.starts_with("/*") || line.starts_with('*'))
            .any(|line| GENERATED_MARKERS.iter().any(|marker| line.contains(marker))),
    }
}
