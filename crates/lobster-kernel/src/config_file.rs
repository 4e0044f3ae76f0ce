use crate::constants::TRACING_CHECK_NAME;
use crate::model::config_file::{CheckConfig, ConfigFile, PathConfig};
use crate::model::diagnostic::Severity;
use anyhow::Result;
use indexmap::IndexMap;
use serde::de::value::MapAccessDeserializer;
use serde::de::{Error, MapAccess, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::collections::HashSet;
use std::fmt;
use std::fmt::Formatter;

// Parses the provided YAML text, returning a ConfigFile.
pub fn parse_config_file(config_contents: &str) -> Result<ConfigFile> {
    let yaml_config: YamlConfigFile = serde_yaml::from_str(config_contents)?;
    Ok(yaml_config.into())
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct YamlConfigFile {
    #[serde(default)]
    #[allow(dead_code)]
    schema_version: SchemaVersion,
    checks: Option<YamlCheckList>,
    #[serde(flatten)]
    paths: YamlPathConfig,
    ignore_paths: Option<Vec<String>>,
    ignore_gitignore: Option<bool>,
    max_file_size_kb: Option<u64>,
    ignore_generated_files: Option<bool>,
    warnings_as_errors: Option<bool>,
}

// A marker for the schema version.
// No content because it's only deserialized if the schema version is correct.
#[derive(Default)]
struct SchemaVersion {}

// A list of configured checks. When deserialized, it gives an error if a check is duplicated.
struct YamlCheckList(Vec<NamedCheckConfig>);

// A check name with its configuration. It can be deserialized as a single string (populating
// the name only) or as a map (populating the name and configuration in a special way.)
struct NamedCheckConfig {
    name: String,
    cfg: YamlCheckConfig,
}

// A check configuration.
#[derive(Deserialize, Default, PartialEq)]
struct YamlCheckConfig {
    #[serde(flatten)]
    pub paths: YamlPathConfig,
    pub severity: Option<Severity>,
}

// An 'only'/'ignore' configuration.
#[derive(Deserialize, Default, PartialEq)]
pub struct YamlPathConfig {
    pub only: Option<Vec<String>>,
    #[serde(default)]
    pub ignore: Vec<String>,
}

const SCHEMA_VERSION: &str = "v1";

// Deserializer for the schema version.
// It requires the field to contain the SCHEMA_VERSION string and returns a marker if so.
impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match String::deserialize(deserializer)?.as_str() {
            SCHEMA_VERSION => Ok(SchemaVersion {}),
            v => Err(Error::invalid_value(
                Unexpected::Str(v),
                &format!("\"{}\"", SCHEMA_VERSION).as_str(),
            )),
        }
    }
}

// Deserializer for a check list.
impl<'de> Deserialize<'de> for YamlCheckList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut names = HashSet::new();
        let list = Vec::<NamedCheckConfig>::deserialize(deserializer)?;
        if list.is_empty() {
            return Err(Error::custom("no checks were specified"));
        }
        for ncc in &list {
            if !names.insert(ncc.name.clone()) {
                return Err(Error::custom(format!("duplicate check: {}", ncc.name)));
            }
        }
        Ok(YamlCheckList(list))
    }
}

// Deserializer for a (named) check config. It takes either a string (signifying a check with
// a default configuration) or a map whose first key is the name and the remaining items are the
// check configuration.
impl<'de> Deserialize<'de> for NamedCheckConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringOrStruct {}
        impl<'de> Visitor<'de> for StringOrStruct {
            type Value = NamedCheckConfig;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("string or check configuration")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                Ok(NamedCheckConfig {
                    name: v.to_string(),
                    cfg: YamlCheckConfig::default(),
                })
            }

            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                #[derive(Deserialize)]
                struct Holder {
                    #[serde(flatten)]
                    cfg: YamlCheckConfig,
                    #[serde(flatten)]
                    #[serde(default)]
                    remaining_fields: IndexMap<String, Value>,
                }
                let m = Holder::deserialize(MapAccessDeserializer::new(map))?;
                match m.remaining_fields.into_iter().next() {
                    Some((name, Value::Null)) => Ok(NamedCheckConfig { name, cfg: m.cfg }),
                    Some((name, _)) => Err(Error::custom(format!("invalid configuration for check \"{}\" (check if it is indented under the check name)", name))),
                    _ => Err(Error::custom("expected a check configuration")),
                }
            }
        }

        deserializer.deserialize_any(StringOrStruct {})
    }
}

impl From<YamlConfigFile> for ConfigFile {
    fn from(value: YamlConfigFile) -> Self {
        ConfigFile {
            checks: match value.checks {
                Some(list) => list.into(),
                None => IndexMap::from([(TRACING_CHECK_NAME.to_string(), CheckConfig::default())]),
            },
            paths: {
                let mut paths = value.paths;
                if let Some(ip) = value.ignore_paths {
                    paths.ignore.extend(ip);
                }
                paths.into()
            },
            ignore_gitignore: value.ignore_gitignore,
            max_file_size_kb: value.max_file_size_kb,
            ignore_generated_files: value.ignore_generated_files,
            warnings_as_errors: value.warnings_as_errors,
        }
    }
}

impl From<YamlPathConfig> for PathConfig {
    fn from(value: YamlPathConfig) -> Self {
        PathConfig {
            only: value
                .only
                .map(|v| v.into_iter().map(|p| p.into()).collect()),
            ignore: value.ignore.into_iter().map(|p| p.into()).collect(),
        }
    }
}

impl From<YamlCheckList> for IndexMap<String, CheckConfig> {
    fn from(value: YamlCheckList) -> Self {
        value
            .0
            .into_iter()
            .map(|elem| (elem.name, elem.cfg.into()))
            .collect()
    }
}

impl From<YamlCheckConfig> for CheckConfig {
    fn from(value: YamlCheckConfig) -> Self {
        CheckConfig {
            paths: value.paths.into(),
            severity: value.severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config_file::PathPattern;

    // `checks` is optional, the tracing check is enabled by default.
    #[test]
    fn test_parse_minimal() {
        let data = r#"
schema-version: v1
"#;
        let res = parse_config_file(data).expect("should parse");
        assert_eq!(res.checks.len(), 1);
        assert!(res.checks.contains_key("lobster-tracing"));
        assert_eq!(res.paths, PathConfig::default());
        assert!(res.ignore_gitignore.is_none());
        assert!(res.warnings_as_errors.is_none());
    }

    #[test]
    fn test_parse_all_fields() {
        let data = r#"
schema-version: v1
checks:
  - lobster-tracing:
    ignore:
      - "test/**"
    severity: ERROR
only:
  - src
ignore:
  - src/generated
ignore-paths:
  - third_party
ignore-gitignore: true
max-file-size-kb: 512
ignore-generated-files: false
warnings-as-errors: true
"#;
        let res = parse_config_file(data).expect("should parse");
        let check = res.checks.get("lobster-tracing").expect("check configured");
        assert_eq!(check.severity, Some(Severity::Error));
        assert_eq!(check.paths.ignore, vec![PathPattern::from("test/**")]);
        assert_eq!(res.paths.only, Some(vec![PathPattern::from("src")]));
        assert_eq!(
            res.paths.ignore,
            vec![
                PathPattern::from("src/generated"),
                PathPattern::from("third_party")
            ]
        );
        assert_eq!(res.ignore_gitignore, Some(true));
        assert_eq!(res.max_file_size_kb, Some(512));
        assert_eq!(res.ignore_generated_files, Some(false));
        assert_eq!(res.warnings_as_errors, Some(true));
    }

    #[test]
    fn test_parse_rejects_duplicate_checks() {
        let data = r#"
schema-version: v1
checks:
  - lobster-tracing
  - lobster-tracing
"#;
        let res = parse_config_file(data);
        assert!(res.is_err());
        assert!(res
            .unwrap_err()
            .to_string()
            .contains("duplicate check: lobster-tracing"));
    }

    #[test]
    fn test_parse_rejects_empty_checks() {
        let data = r#"
schema-version: v1
checks: []
"#;
        assert!(parse_config_file(data).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_schema_version() {
        let data = r#"
schema-version: v2
checks:
  - lobster-tracing
"#;
        assert!(parse_config_file(data).is_err());
    }

    // The configuration of a check must be indented under the check name.
    #[test]
    fn test_parse_rejects_misindented_check_config() {
        let data = r#"
schema-version: v1
checks:
  - lobster-tracing:
      ignore:
        - "test/**"
"#;
        let res = parse_config_file(data);
        assert!(res.is_err());
    }
}
