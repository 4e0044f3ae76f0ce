use std::fs;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use common::utils::position_utils::get_line_content;
use kernel::model::common::Language;
use kernel::model::config_file::PathConfig;
use kernel::model::diagnostic::Diagnostic;

// Headers with a `.h` extension are claimed by C. Both languages are parsed with the same
// grammar, the language only changes how files are reported.
static FILE_EXTENSIONS_PER_LANGUAGE_LIST: &[(Language, &[&str])] = &[
    (Language::C, &["c", "h"]),
    (
        Language::Cpp,
        &[
            "cc", "cpp", "cxx", "c++", "hh", "hpp", "hxx", "h++", "ipp", "tpp", "inl",
        ],
    ),
];

// get all extensions for a language.
fn get_extensions_for_language(language: &Language) -> Option<Vec<String>> {
    for fe in FILE_EXTENSIONS_PER_LANGUAGE_LIST {
        if fe.0 == *language {
            let extensions = fe.1.to_vec();
            return Some(extensions.iter().map(|x| x.to_string()).collect());
        }
    }
    None
}

// Read the .gitignore file in a directory and return the lines that are not commented
// or empty.
// We ignore pattern that start with # (comments) or contains ! (cause repositories
// not being included and totally skipped).
pub fn read_files_from_gitignore_internal(path: &PathBuf) -> Result<Vec<String>> {
    if path.exists() {
        let lines: Vec<String> = read_to_string(path)?
            .lines()
            .map(String::from)
            .filter(|v| !v.starts_with('#'))
            .filter(|v| !v.contains('!'))
            .filter(|v| !v.is_empty())
            .collect();
        return Ok(lines);
    }
    Ok(vec![])
}

pub fn read_files_from_gitignore(source_directory: &str) -> Result<Vec<String>> {
    let gitignore_path = Path::new(source_directory).join(".gitignore");
    read_files_from_gitignore_internal(&gitignore_path)
}

/// get the files to analyze from the directory. This function walks the directory
/// to analyze recursively and gets all the files.
/// if passed, subdirectories_to_analyze are subdirectories within the directory.
pub fn get_files(
    directory: &str,
    subdirectories_to_analyze: Vec<String>,
    path_config: &PathConfig,
) -> Result<Vec<PathBuf>> {
    let mut files_to_return: Vec<PathBuf> = vec![];

    // This is the directory that contains the .git files, we do not need to keep them.
    let git_directory = Path::new(directory).join(".git");

    let directories_to_walk: Vec<PathBuf> = if !subdirectories_to_analyze.is_empty() {
        subdirectories_to_analyze
            .iter()
            .map(|sd| Path::new(directory).join(sd))
            .collect()
    } else {
        vec![PathBuf::from(directory)]
    };

    for directory_to_walk in directories_to_walk {
        for entry in WalkDir::new(&directory_to_walk) {
            let dir_entry = entry?;
            let entry = dir_entry.path();

            // we only include if this is a file and not a symlink.
            // symlinks are never followed, they could point outside of the repository.
            let mut should_include = entry.is_file() && !entry.is_symlink();

            let relative_path_str = entry
                .strip_prefix(directory)
                .ok()
                .and_then(|p| p.to_str())
                .ok_or_else(|| anyhow!("should get the path"))?;

            // check if the path is allowed by the configuration.
            should_include = should_include && path_config.allows_file(relative_path_str);

            // do not include the git directory.
            if entry.starts_with(&git_directory) {
                should_include = false;
            }

            if should_include {
                files_to_return.push(entry.to_path_buf());
            }
        }
    }
    Ok(files_to_return)
}

/// try to find if one of the subdirectory used to scan a repository is going outside the
/// repository directory. If yes, this is unsafe, scans outside the repository and should
/// not run.
pub fn are_subdirectories_safe(directory_path: &Path, subdirectories: &[String]) -> Result<bool> {
    let directory_canonicalized = directory_path
        .canonicalize()
        .context("cannot canonicalize repository directory")?;
    for subdirectory in subdirectories {
        let path = directory_path
            .join(subdirectory)
            .canonicalize()
            .with_context(|| format!("error when checking directory {}", subdirectory))?;
        if !path.starts_with(&directory_canonicalized) {
            return Ok(false);
        }
    }
    Ok(true)
}

// filter the file according to a list of extensions
fn match_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension() {
        Some(ext) => match ext.to_str() {
            Some(e) => extensions.contains(&e.to_lowercase()),
            None => false,
        },
        None => false,
    }
}

// filter files to analyze for a language based on their extension.
pub fn filter_files_for_language(files: &[PathBuf], language: &Language) -> Vec<PathBuf> {
    let extensions = get_extensions_for_language(language).unwrap_or_default();

    if extensions.is_empty() {
        return vec![];
    }

    files
        .iter()
        .filter(|p| match_extension(p, &extensions))
        .cloned()
        .collect()
}

/// Get the language a file is analyzed as, if any.
pub fn get_language_for_file(path: &Path) -> Option<Language> {
    FILE_EXTENSIONS_PER_LANGUAGE_LIST
        .iter()
        .find(|(language, _)| {
            get_extensions_for_language(language)
                .is_some_and(|extensions| match_extension(path, &extensions))
        })
        .map(|(language, _)| *language)
}

pub fn filter_files_by_size(files: &[PathBuf], max_file_size_kb: u64) -> Vec<PathBuf> {
    let max_len_bytes = max_file_size_kb * 1024;
    files
        .iter()
        .filter(|f| {
            let metadata = fs::metadata(f);
            let too_big = metadata
                .as_ref()
                .map(|x| x.len() > max_len_bytes)
                .unwrap_or(false);

            if too_big {
                tracing::debug!(
                    "File {} too big (size {} bytes, max size {} kb ({} bytes))",
                    f.display(),
                    metadata.map(|x| x.len()).unwrap_or(0),
                    max_file_size_kb,
                    max_len_bytes
                );
            }

            f.is_file() && !too_big
        })
        .cloned()
        .collect()
}

/// Generate a fingerprint for a diagnostic that will uniquely identify it. The fingerprint is
/// calculated as
///  SHA2(<check> | <file-location-in-repository> | <length-of-path> | <content-of-code-line> | <length-of-line>)
/// Whitespaces are removed from the line so that reformatting does not change the fingerprint.
pub fn get_fingerprint_for_diagnostic(
    check_name: &str,
    diagnostic: &Diagnostic,
    repository_root: &Path,
    file: &Path,
) -> Option<String> {
    let path = repository_root.join(file);
    let filename = file.to_str().unwrap_or("");
    if !path.is_file() {
        return None;
    }

    match read_to_string(&path) {
        Ok(file_content) => {
            let line_content = get_line_content(&file_content, diagnostic.position.line)?;
            let line_content_stripped = line_content
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .collect::<String>();
            let hash_content = format!(
                "{}|{}|{}|{}|{}",
                check_name,
                filename,
                filename.len(),
                line_content_stripped,
                line_content_stripped.len()
            );
            Some(format!("{:x}", Sha256::digest(hash_content.as_bytes())))
        }
        Err(e) => {
            tracing::debug!("Error when trying to read file {}: {}", path.display(), e);
            None
        }
    }
}
