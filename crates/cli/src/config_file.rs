use crate::constants;
use anyhow::{anyhow, Context, Result};
use kernel::config_file::parse_config_file;
use kernel::model::config_file::ConfigFile;
use std::fs::File;
use std::io::Read;
use std::path::Path;

fn get_config_file(path: &str) -> Result<Option<File>> {
    let yml_file_path =
        Path::new(path).join(format!("{}.yml", constants::CONFIG_FILE_WITHOUT_PREFIX));
    let yaml_file_path =
        Path::new(path).join(format!("{}.yaml", constants::CONFIG_FILE_WITHOUT_PREFIX));

    // first, lobster-tracing.yml
    match File::open(yml_file_path) {
        Ok(f) => Ok(Some(f)),
        Err(e1) if e1.kind() == std::io::ErrorKind::NotFound => {
            // second, lobster-tracing.yaml
            match File::open(yaml_file_path) {
                Ok(f) => Ok(Some(f)),
                Err(e2) if e2.kind() == std::io::ErrorKind::NotFound => Ok(None),
                _ => Err(anyhow!("cannot open config file")),
            }
        }
        _ => Err(anyhow!("cannot open config file")),
    }
}

// We first try to read lobster-tracing.yml
// If it fails, we try to read lobster-tracing.yaml
// If the file does not exist, we return a Ok(None).
// If there is an error reading the file, we return a failure
pub fn read_config_file(path: &str) -> Result<Option<ConfigFile>> {
    if let Some(mut file) = get_config_file(path)? {
        let mut contents = String::new();

        let size_read = file
            .read_to_string(&mut contents)
            .context("error when reading the configuration file")?;
        if size_read == 0 {
            return Err(anyhow!("the config file is empty"));
        }
        parse_config_file(&contents).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_no_config_file() {
        let dir = tempdir().unwrap();
        let config = read_config_file(dir.path().to_str().unwrap()).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_read_yaml_extension() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("lobster-tracing.yaml"),
            "schema-version: v1\nchecks:\n  - lobster-tracing\nmax-file-size-kb: 10\n",
        )
        .unwrap();
        let config = read_config_file(dir.path().to_str().unwrap())
            .unwrap()
            .unwrap();
        assert!(config.checks.contains_key("lobster-tracing"));
        assert_eq!(config.max_file_size_kb, Some(10));
    }

    // .yml wins over .yaml
    #[test]
    fn test_yml_first() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("lobster-tracing.yml"),
            "schema-version: v1\nchecks:\n  - lobster-tracing\nwarnings-as-errors: true\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("lobster-tracing.yaml"),
            "schema-version: v1\nchecks:\n  - lobster-tracing\n",
        )
        .unwrap();
        let config = read_config_file(dir.path().to_str().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(config.warnings_as_errors, Some(true));
    }

    #[test]
    fn test_empty_config_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lobster-tracing.yml"), "").unwrap();
        assert!(read_config_file(dir.path().to_str().unwrap()).is_err());
    }
}
