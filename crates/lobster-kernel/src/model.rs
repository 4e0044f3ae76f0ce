pub mod comment;
pub mod common;
pub mod config_file;
pub mod diagnostic;
pub mod file_result;
pub mod function;
