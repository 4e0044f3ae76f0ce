pub static CONFIG_FILE_WITHOUT_PREFIX: &str = "lobster-tracing";

pub static SARIF_PROPERTY_FINGERPRINT: &str = "LOBSTER_FINGERPRINT";
pub static DEFAULT_MAX_CPUS: usize = 8;
pub static DEFAULT_MAX_FILE_SIZE_KB: u64 = 200;

// application error: greater or equal to 10 and less than 50
pub static EXIT_CODE_FAIL_ON_UNTRACED: i32 = 10;

// user errors, all more than 50
pub static EXIT_CODE_INVALID_CONFIGURATION: i32 = 50;
pub static EXIT_CODE_NO_DIRECTORY: i32 = 55;
pub static EXIT_CODE_INVALID_DIRECTORY: i32 = 56;
pub static EXIT_CODE_UNSAFE_SUBDIRECTORIES: i32 = 57;
