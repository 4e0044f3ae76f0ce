pub mod config_file;
pub mod constants;
pub mod csv;
pub mod file_utils;
pub mod lobster;
pub mod model;
pub mod sarif;
pub mod text;
pub mod violations_table;

#[macro_use]
extern crate prettytable;
