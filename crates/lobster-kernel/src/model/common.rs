use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Deserialize, Debug, Serialize, Eq, PartialEq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
    Sarif,
    Lobster,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "TEXT",
            Self::Csv => "CSV",
            Self::Json => "JSON",
            Self::Sarif => "SARIF",
            Self::Lobster => "LOBSTER",
        };
        write!(f, "{s}")
    }
}

impl TryFrom<&str> for OutputFormat {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            "lobster" => Ok(OutputFormat::Lobster),
            _ => Err(format!("unknown output format: {s}")),
        }
    }
}

#[derive(Copy, Clone, Deserialize, Debug, Serialize, Eq, Hash, PartialEq)]
pub enum Language {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "CPP")]
    Cpp,
}

pub static ALL_LANGUAGES: &[Language] = &[Language::C, Language::Cpp];

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::C => "c",
            Self::Cpp => "c++",
        };
        write!(f, "{s}")
    }
}
