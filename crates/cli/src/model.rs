pub mod cli_configuration;
