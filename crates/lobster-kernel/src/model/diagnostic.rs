use crate::model::function::FunctionKind;
use common::model::position::Position;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Hash)]
pub enum Severity {
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "WARNING")]
    Warning,
    #[serde(rename = "NOTICE")]
    Notice,
    #[serde(rename = "NONE")]
    None,
}

impl TryFrom<&str> for Severity {
    type Error = &'static str;

    fn try_from(s: &str) -> Result<Self, &'static str> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "notice" => Ok(Severity::Notice),
            "none" => Ok(Severity::None),
            _ => Err("unknown severity"),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Notice => write!(f, "notice"),
            Self::None => write!(f, "none"),
        }
    }
}

/// What a tracing diagnostic says about its function.
#[derive(Copy, Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Hash)]
pub enum TracingStatus {
    #[serde(rename = "TRACED")]
    Traced,
    #[serde(rename = "EXEMPT")]
    Exempt,
    #[serde(rename = "UNTRACED")]
    Untraced,
}

impl fmt::Display for TracingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Traced => write!(f, "traced"),
            Self::Exempt => write!(f, "exempt"),
            Self::Untraced => write!(f, "untraced"),
        }
    }
}

/// The function a diagnostic is about.
#[derive(Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Builder)]
pub struct DiagnosticSubject {
    pub kind: FunctionKind,
    pub qualified_name: String,
    pub status: TracingStatus,
    /// The tag payload for traced and exempt functions.
    pub payload: Option<String>,
}

#[derive(Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Builder)]
pub struct Diagnostic {
    pub check_name: String,
    pub position: Position,
    pub severity: Severity,
    pub message: String,
    #[builder(default)]
    pub subject: Option<DiagnosticSubject>,
}
