use cli::config_file::read_config_file;
use cli::constants::{
    DEFAULT_MAX_CPUS, DEFAULT_MAX_FILE_SIZE_KB, EXIT_CODE_FAIL_ON_UNTRACED,
    EXIT_CODE_INVALID_CONFIGURATION, EXIT_CODE_INVALID_DIRECTORY, EXIT_CODE_NO_DIRECTORY,
    EXIT_CODE_UNSAFE_SUBDIRECTORIES,
};
use cli::csv;
use cli::file_utils::{
    are_subdirectories_safe, filter_files_by_size, get_files, read_files_from_gitignore,
};
use cli::lobster::generate_lobster_report;
use cli::model::cli_configuration::CliConfiguration;
use cli::sarif::sarif_utils::{generate_sarif_report, SarifReportMetadata};
use cli::text::generate_text_results;
use cli::violations_table;
use common::analysis_options::AnalysisOptions;
use kernel::checks::{CheckContext, CheckFactories, ConfiguredCheck};
use kernel::constants::{CARGO_VERSION, TRACING_CHECK_NAME, VERSION};
use kernel::model::common::{OutputFormat, ALL_LANGUAGES};
use kernel::model::config_file::{CheckConfig, ConfigFile, PathConfig};
use kernel::path_restrictions::PathRestrictions;

use anyhow::{Context, Result};
use getopts::Options;
use indexmap::IndexMap;
use itertools::Itertools;
use lobster_tracing::{show_performance_statistics, tracing_analysis};
use std::io::prelude::*;
use std::process::exit;
use std::time::Instant;
use std::{env, fs, io};
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} -i DIRECTORY [options]", program);
    print!("{}", opts.usage(&brief));
}

fn print_configuration(configuration: &CliConfiguration) {
    let configuration_method = if configuration.use_configuration_file {
        "config file (lobster-tracing.[yml|yaml])"
    } else {
        "default checks"
    };

    let ignore_paths_str = if configuration.path_config.ignore.is_empty() {
        "no ignore path".to_string()
    } else {
        configuration.path_config.ignore.iter().join(",")
    };
    let only_paths_str = match &configuration.path_config.only {
        Some(x) => x.iter().join(","),
        None => "all paths".to_string(),
    };

    eprintln!("Configuration");
    eprintln!("=============");
    eprintln!("version             : {}", CARGO_VERSION);
    eprintln!("revision            : {}", VERSION);
    eprintln!("config method       : {}", configuration_method);
    eprintln!("cores available     : {}", num_cpus::get());
    eprintln!("cores used          : {}", configuration.num_cpus);
    eprintln!(
        "checks enabled      : {}",
        configuration.checks.iter().map(|c| &c.name).join(",")
    );
    eprintln!("source directory    : {}", configuration.source_directory);
    eprintln!(
        "subdirectories      : {}",
        configuration.source_subdirectories.join(",")
    );
    eprintln!(
        "output file         : {}",
        configuration.output_file.as_deref().unwrap_or("stdout")
    );
    eprintln!("output format       : {}", configuration.output_format);
    eprintln!("ignore paths        : {}", ignore_paths_str);
    eprintln!("only paths          : {}", only_paths_str);
    eprintln!("ignore gitignore    : {}", configuration.ignore_gitignore);
    eprintln!("ignore generated    : {}", configuration.ignore_generated_files);
    eprintln!("warnings as errors  : {}", configuration.warnings_as_errors);
    eprintln!("use debug           : {}", configuration.use_debug);
    eprintln!(
        "max file size       : {} kb",
        configuration.max_file_size_kb
    );
}

/// Bind every enabled check to its settings. Checks come from the command line, then from the
/// configuration file, and default to the tracing check.
fn configure_checks(
    checks_from_options: Option<Vec<String>>,
    check_configs: &IndexMap<String, CheckConfig>,
    options: &AnalysisOptions,
) -> Result<Vec<ConfiguredCheck>> {
    let factories = CheckFactories::with_builtin_modules()?;
    let names: Vec<String> = match checks_from_options {
        Some(names) => names,
        None if !check_configs.is_empty() => check_configs.keys().cloned().collect(),
        None => vec![TRACING_CHECK_NAME.to_string()],
    };

    let mut configured = Vec::with_capacity(names.len());
    for name in names.iter().unique() {
        let severity = check_configs.get(name).and_then(|c| c.severity);
        configured.push(factories.configure(name, CheckContext::new(severity, options))?);
    }
    Ok(configured)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();
    let mut opts = Options::new();

    opts.optopt(
        "i",
        "directory",
        "directory to scan (valid existing directory)",
        "/path/to/code/to/analyze",
    );
    opts.optmulti(
        "u",
        "subdirectory",
        "subdirectory to scan within the repository",
        "sub/directory",
    );
    opts.optopt("d", "debug", "use debug mode", "yes/no");
    opts.optopt(
        "f",
        "format",
        "format of the report (default: text)",
        "text/json/csv/sarif/lobster",
    );
    opts.optopt(
        "o",
        "output",
        "output file name (default: standard output)",
        "report.lobster",
    );
    opts.optmulti(
        "p",
        "ignore-path",
        "path to ignore - the value is a glob",
        "**/test/** (multiple values possible)",
    );
    opts.optopt(
        "c",
        "cpus",
        format!("allow N CPUs at once; if unspecified, defaults to the number of logical cores on the platform or {}, whichever is less", DEFAULT_MAX_CPUS).as_str(),
        "--cpus 5",
    );
    opts.optopt(
        "",
        "checks",
        "checks to enable, overrides the configuration file",
        "lobster-tracing",
    );
    opts.optflag(
        "",
        "warnings-as-errors",
        "report every diagnostic as an error",
    );
    opts.optflag(
        "",
        "fail-on-untraced",
        "exit with a non-zero return code if a function has no tracing tags",
    );
    opts.optflag(
        "",
        "print-violations",
        "print a list with all the diagnostics that were found",
    );
    opts.optflag(
        "x",
        "performance-statistics",
        "enable performance statistics",
    );
    opts.optflag("h", "help", "print this help");
    opts.optflag("v", "version", "shows the tool version");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("error when parsing arguments: {}", f);
            print_usage(&program, &opts);
            exit(EXIT_CODE_INVALID_CONFIGURATION)
        }
    };

    if matches.opt_present("v") {
        println!("Version: {}, revision: {}", CARGO_VERSION, VERSION);
        exit(0);
    }

    if matches.opt_present("h") {
        print_usage(&program, &opts);
        exit(0);
    }

    let use_debug = *matches
        .opt_str("d")
        .map(|value| value == "yes" || value == "true")
        .get_or_insert(env::var_os("LOBSTER_TRACING_DEBUG").is_some());

    // debug mode shows every debug message, otherwise RUST_LOG decides.
    let env_filter = if use_debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let output_format = match matches.opt_str("f") {
        Some(f) => match OutputFormat::try_from(f.as_str()) {
            Ok(format) => format,
            Err(e) => {
                eprintln!("{}", e);
                print_usage(&program, &opts);
                exit(EXIT_CODE_INVALID_CONFIGURATION)
            }
        },
        None => OutputFormat::Text,
    };

    let enable_performance_statistics = matches.opt_present("x");
    let print_violations = matches.opt_present("print-violations");
    let fail_on_untraced = matches.opt_present("fail-on-untraced");
    let output_file = matches.opt_str("o");
    let ignore_paths_from_options = matches.opt_strs("p");
    let subdirectories_to_analyze = matches.opt_strs("u");
    let checks_from_options = matches.opt_str("checks").map(|checks| {
        checks
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect::<Vec<_>>()
    });

    let Some(directory_to_analyze) = matches.opt_str("i") else {
        eprintln!("no directory passed, specify a directory with option -i");
        print_usage(&program, &opts);
        exit(EXIT_CODE_NO_DIRECTORY)
    };
    let directory_path = std::path::Path::new(&directory_to_analyze);

    if !directory_path.is_dir() {
        eprintln!("directory to analyze is not correct");
        exit(EXIT_CODE_INVALID_DIRECTORY)
    }

    match are_subdirectories_safe(directory_path, &subdirectories_to_analyze) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("sub-directories are not safe and point outside of the repository");
            exit(EXIT_CODE_UNSAFE_SUBDIRECTORIES)
        }
        Err(e) => {
            eprintln!("{:#}", e);
            exit(EXIT_CODE_INVALID_DIRECTORY)
        }
    }

    let configuration_file: Option<ConfigFile> =
        match read_config_file(directory_to_analyze.as_str()) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!(
                    "Error reading configuration file from {}:\n  {}",
                    directory_to_analyze, err
                );
                exit(EXIT_CODE_INVALID_CONFIGURATION)
            }
        };
    let use_configuration_file = configuration_file.is_some();
    let conf = configuration_file.unwrap_or_default();

    let ignore_gitignore = conf.ignore_gitignore.unwrap_or(false);
    let max_file_size_kb = conf.max_file_size_kb.unwrap_or(DEFAULT_MAX_FILE_SIZE_KB);
    let ignore_generated_files = conf.ignore_generated_files.unwrap_or(true);
    let warnings_as_errors =
        matches.opt_present("warnings-as-errors") || conf.warnings_as_errors.unwrap_or(false);

    let analysis_options = AnalysisOptions {
        use_debug,
        ignore_generated_files,
        warnings_as_errors,
    };

    let checks = match configure_checks(checks_from_options, &conf.checks, &analysis_options) {
        Ok(checks) => checks,
        Err(e) => {
            eprintln!("invalid checks configuration: {}", e);
            exit(EXIT_CODE_INVALID_CONFIGURATION)
        }
    };
    let path_restrictions = PathRestrictions::from_check_configs(&conf.checks);

    // copy the only and ignore paths from the configuration file
    let mut path_config = PathConfig {
        ignore: conf.paths.ignore,
        only: conf.paths.only,
    };

    // add ignore path from the options
    path_config
        .ignore
        .extend(ignore_paths_from_options.iter().map(|p| p.clone().into()));

    // ignore all directories that are in gitignore
    if !ignore_gitignore {
        let paths_from_gitignore = read_files_from_gitignore(directory_to_analyze.as_str())
            .context("error when reading gitignore file")?;
        path_config
            .ignore
            .extend(paths_from_gitignore.into_iter().map(|p| p.into()));
    }

    let files_in_repository = get_files(
        directory_to_analyze.as_str(),
        subdirectories_to_analyze.clone(),
        &path_config,
    )
    .context("unable to get the list of files to analyze")?;

    let num_cores_requested = matches
        .opt_str("c")
        .map(|val| {
            val.parse::<usize>()
                .context("unable to parse `cpus` flag as integer")
        })
        .transpose()?;
    // Select the number of cores to use based on the user's CLI arg (or lack of one)
    let num_cpus = choose_cpu_count(num_cores_requested);

    // build the configuration object that contains how the CLI should behave.
    let configuration = CliConfiguration {
        use_debug,
        use_configuration_file,
        ignore_gitignore,
        source_directory: directory_to_analyze.clone(),
        source_subdirectories: subdirectories_to_analyze,
        path_config,
        output_format,
        output_file,
        num_cpus,
        checks,
        path_restrictions,
        max_file_size_kb,
        show_performance_statistics: enable_performance_statistics,
        print_violations,
        fail_on_untraced,
        ignore_generated_files,
        warnings_as_errors,
    };

    print_configuration(&configuration);

    rayon::ThreadPoolBuilder::new()
        .num_threads(configuration.num_cpus.max(1))
        .build_global()?;

    let start = Instant::now();

    let files_to_analyze =
        filter_files_by_size(&files_in_repository, configuration.max_file_size_kb);

    let analysis_result = tracing_analysis(
        &configuration,
        &analysis_options,
        &files_to_analyze,
        ALL_LANGUAGES,
    )?;
    let file_results = &analysis_result.file_results;

    let execution_time_secs = start.elapsed().as_secs();
    let nb_diagnostics: usize = file_results.iter().map(|r| r.diagnostics.len()).sum();
    let nb_untraced = analysis_result.count_untraced();

    eprintln!(
        "Found {} diagnostic(s) and {} untraced function(s) in {} file(s) using {} check(s) within {} sec(s)",
        nb_diagnostics,
        nb_untraced,
        files_to_analyze.len(),
        configuration.checks.len(),
        execution_time_secs
    );

    // If the performance statistics are enabled, we show the total execution time per check
    // and the slowest files.
    if configuration.show_performance_statistics {
        show_performance_statistics(&analysis_result.statistics);
    }

    if configuration.print_violations && nb_diagnostics > 0 {
        violations_table::print_violations_table(file_results);
    }

    let value = match configuration.output_format {
        OutputFormat::Text => generate_text_results(file_results),
        OutputFormat::Csv => csv::generate_csv_results(file_results)?,
        OutputFormat::Json => {
            serde_json::to_string(file_results).context("error when getting the JSON report")?
        }
        OutputFormat::Sarif => {
            let report = generate_sarif_report(
                &configuration.checks,
                file_results,
                &directory_to_analyze,
                SarifReportMetadata {
                    config_digest: configuration.generate_digest(),
                    execution_time_secs,
                },
            )
            .context("error when generating the SARIF report")?;
            serde_json::to_string(&report).context("error when getting the SARIF report")?
        }
        OutputFormat::Lobster => serde_json::to_string_pretty(&generate_lobster_report(
            file_results,
        ))
        .context("error when getting the LOBSTER report")?,
    };

    // write the report
    match &configuration.output_file {
        Some(output_file) => {
            let mut file = fs::File::create(output_file).context("cannot create file")?;
            file.write_all(value.as_bytes())
                .context("error when writing results")?;
        }
        None => {
            io::stdout()
                .write_all(value.as_bytes())
                .context("error when writing results")?;
        }
    }

    // if a function has no tracing tags and --fail-on-untraced is passed, we exit with an error
    if configuration.fail_on_untraced && nb_untraced > 0 {
        exit(EXIT_CODE_FAIL_ON_UNTRACED);
    }

    Ok(())
}

/// Returns the user's requested core count, clamped to the number of logical cores on the system.
/// If unspecified, up to [DEFAULT_MAX_CPUS] CPUs will be used.
fn choose_cpu_count(user_input: Option<usize>) -> usize {
    let logical_cores = num_cpus::get();
    let cores = user_input.unwrap_or(DEFAULT_MAX_CPUS);
    usize::min(logical_cores, cores)
}
