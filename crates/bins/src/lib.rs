use cli::file_utils::filter_files_for_language;
use cli::model::cli_configuration::CliConfiguration;
use common::analysis_options::AnalysisOptions;
use indicatif::ProgressBar;
use itertools::Itertools;
use kernel::analysis::analyze::analyze;
use kernel::checks::ConfiguredCheck;
use kernel::model::common::Language;
use kernel::model::file_result::FileResult;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Read a file and if the file has some invalid UTF-8 characters, it returns a string with invalid
/// characters.
pub fn read_file(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).map_err(|e| anyhow::anyhow!("cannot read file: {}", e))?;
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
    }
}

/// The results of an analysis, with the statistics collected while running it.
pub struct AnalysisResult {
    pub file_results: Vec<FileResult>,
    pub statistics: AnalysisStatistics,
}

impl AnalysisResult {
    /// Number of functions reported without any tracing tag.
    pub fn count_untraced(&self) -> usize {
        self.file_results.iter().map(FileResult::count_untraced).sum()
    }
}

/// Run the enabled checks on every file, in parallel. Files that cannot be read are skipped,
/// results without diagnostics nor errors are dropped. The results are sorted by filename.
pub fn tracing_analysis(
    config: &CliConfiguration,
    options: &AnalysisOptions,
    files_to_analyze: &[PathBuf],
    languages: &[Language],
) -> anyhow::Result<AnalysisResult> {
    let mut all_file_results = Vec::<FileResult>::new();
    let mut all_stats = AnalysisStatistics::new();

    let directory_path = Path::new(config.source_directory.as_str());

    for language in languages {
        let files_for_language = filter_files_for_language(files_to_analyze, language);

        if files_for_language.is_empty() {
            continue;
        }

        // we only use the progress bar when the debug mode is not active, otherwise, it puts
        // too much information on the screen.
        let progress_bar = if !config.use_debug {
            Some(ProgressBar::new(files_for_language.len() as u64))
        } else {
            None
        };

        eprintln!(
            "Analyzing {} {} files using {} checks",
            files_for_language.len(),
            language,
            config.checks.len()
        );

        let (stats, file_results) = files_for_language
            .into_par_iter()
            .fold(
                || (AnalysisStatistics::new(), Vec::new()),
                |(mut stats, mut fold_results), path| {
                    let Some(relative_path) = path
                        .strip_prefix(directory_path)
                        .ok()
                        .and_then(|p| p.to_str())
                    else {
                        tracing::warn!("skipping path {}", path.display());
                        return (stats, fold_results);
                    };

                    // only the checks whose path restrictions allow this file
                    let checks: Vec<&ConfiguredCheck> = config
                        .checks
                        .iter()
                        .filter(|c| {
                            config
                                .path_restrictions
                                .check_applies(&c.name, relative_path)
                        })
                        .collect();

                    let res = match read_file(&path) {
                        Ok(file_content) if !checks.is_empty() => {
                            let mut results =
                                analyze(language, checks, relative_path, &file_content, options);
                            results.retain(|r| {
                                if !r.errors.is_empty() {
                                    stats.mark_error(&r.filename, &r.check_name);
                                }
                                let exe_time = Duration::from_millis(r.execution_time_ms as u64);
                                stats.execution(&r.check_name, exe_time);
                                stats.parse(
                                    r.filename.clone(),
                                    Duration::from_millis(r.parsing_time_ms as u64),
                                );

                                // We'll drop all `FileResult` that have nothing to report
                                !r.diagnostics.is_empty() || !r.errors.is_empty()
                            });
                            results
                        }
                        Ok(_) => vec![],
                        Err(e) => {
                            tracing::error!(
                                "error when getting content of path {}: {}",
                                path.display(),
                                e
                            );
                            vec![]
                        }
                    };

                    if let Some(pb) = &progress_bar {
                        pb.inc(1);
                    }
                    fold_results.extend(res);

                    (stats, fold_results)
                },
            )
            .reduce(
                || (AnalysisStatistics::new(), Vec::new()),
                |mut base, other| {
                    let (other_stats, other_results) = other;
                    base.0 += other_stats;
                    base.1.extend(other_results);
                    base
                },
            );
        all_file_results.extend(file_results);
        all_stats += stats;

        if let Some(pb) = &progress_bar {
            pb.finish();
        }
    }

    // rayon does not keep the order of the files, sort to get a stable report.
    all_file_results.sort_by(|a, b| {
        a.filename
            .cmp(&b.filename)
            .then_with(|| a.check_name.cmp(&b.check_name))
    });

    Ok(AnalysisResult {
        file_results: all_file_results,
        statistics: all_stats,
    })
}

pub fn show_performance_statistics(all_stats: &AnalysisStatistics) {
    eprintln!("All checks execution time");
    eprintln!("-------------------------");
    // Sort by total execution time, descending
    for (name, execution) in all_stats
        .agg_execution_time
        .iter()
        .sorted_by_key(|(_, aggregate)| std::cmp::Reverse(aggregate.time))
    {
        eprintln!(
            "check {:?} total execution time {:?} ms in {:?} files",
            name,
            execution.time.as_millis(),
            execution.sample_count
        );
    }

    eprintln!("Top {} slowest files to parse", STATS_MAX_PARSE_TIMES);
    eprintln!("------------------------------");
    for (time, filename) in all_stats.file_parse_time.iter().rev() {
        let time = time.as_millis();
        eprintln!("file {:?}, parsing time {:?} ms", filename, time);
    }

    // show the files that could not be analyzed
    eprintln!("Analysis errors");
    eprintln!("---------------");
    if all_stats.execution_errors.is_empty() {
        eprintln!("No analysis error");
    }
    for (check_name, files) in &all_stats.execution_errors {
        for filename in files {
            eprintln!("Check {} failed on file {}", check_name, filename);
        }
    }
}

type CheckName = String;
type FileName = String;

/// The maximum number of file parse times to store in an [`AnalysisStatistics`] `file_parse_time` heap.
pub const STATS_MAX_PARSE_TIMES: usize = 100;

/// A struct containing statistics about an analysis.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct AnalysisStatistics {
    /// The per-check aggregate amount of time spent running the check.
    pub agg_execution_time: HashMap<CheckName, Aggregate>,
    /// The per-check list of filenames that could not be analyzed.
    pub execution_errors: HashMap<CheckName, Vec<FileName>>,
    /// A max heap of the per-file amount of time spent on tree-sitter tree parsing.
    pub file_parse_time: std::collections::BTreeSet<(Duration, FileName)>,
}

impl AnalysisStatistics {
    /// Creates a new, empty `AnalysisStatistics`.
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }

    /// Adds the execution time for the given `check_name` to its aggregate.
    pub fn execution(&mut self, check_name: &str, elapsed: Duration) {
        if let Some(stat) = self.agg_execution_time.get_mut(check_name) {
            stat.sample_count += 1;
            stat.time += elapsed;
        } else {
            self.agg_execution_time.insert(
                check_name.to_string(),
                Aggregate {
                    sample_count: 1,
                    time: elapsed,
                },
            );
        }
    }

    /// Adds the filename and tree parse duration to the tree-sitter parse time max heap.
    pub fn parse(&mut self, filename: impl Into<String>, elapsed: Duration) {
        self.file_parse_time.insert((elapsed, filename.into()));
        if self.file_parse_time.len() > STATS_MAX_PARSE_TIMES {
            // Remove the smallest element
            self.file_parse_time.pop_first();
        }
    }

    /// Marks that a file could not be analyzed by a specific check.
    pub fn mark_error(&mut self, filename: &str, check_name: &str) {
        self.execution_errors
            .entry(check_name.to_string())
            .or_default()
            .push(filename.to_string());
    }
}

/// An aggregated statistic
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Aggregate {
    pub sample_count: usize,
    pub time: Duration,
}

impl std::ops::AddAssign for Aggregate {
    fn add_assign(&mut self, rhs: Self) {
        self.sample_count += rhs.sample_count;
        self.time += rhs.time;
    }
}

impl std::ops::AddAssign for AnalysisStatistics {
    fn add_assign(&mut self, rhs: Self) {
        for (key, value) in rhs.agg_execution_time {
            self.agg_execution_time
                .entry(key)
                .and_modify(|existing| *existing += value)
                .or_insert(value);
        }
        for (key, values) in rhs.execution_errors {
            self.execution_errors
                .entry(key)
                .and_modify(|existing| existing.extend_from_slice(&values))
                .or_insert(values);
        }
        for (duration, filename) in rhs.file_parse_time {
            self.parse(filename, duration);
        }
    }
}
