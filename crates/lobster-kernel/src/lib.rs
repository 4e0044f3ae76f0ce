pub mod analysis;
pub mod checks;
pub mod config_file;
pub mod constants;
pub mod model;
pub mod path_restrictions;
