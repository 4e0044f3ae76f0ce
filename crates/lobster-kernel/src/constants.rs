pub const CARGO_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION: &str = match option_env!("GIT_SHA") {
    Some(sha) => sha,
    None => "development",
};

/// Name of the check that reports tracing tags of functions.
pub const TRACING_CHECK_NAME: &str = "lobster-tracing";
/// Name of the module that contributes the LOBSTER checks.
pub const LOBSTER_MODULE_NAME: &str = "lobster-module";
pub const LOBSTER_MODULE_DESCRIPTION: &str = "Adds LOBSTER tracing tools.";
pub const TRACING_CHECK_DESCRIPTION: &str =
    "Reports, for every function definition, the requirements it traces to, its tracing exemption or the absence of tracing tags.";
