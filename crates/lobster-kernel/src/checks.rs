use crate::analysis::diagnostics::DiagnosticEngine;
use crate::analysis::translation_unit::TranslationUnit;
use crate::constants::{
    LOBSTER_MODULE_DESCRIPTION, LOBSTER_MODULE_NAME, TRACING_CHECK_DESCRIPTION, TRACING_CHECK_NAME,
};
use crate::model::diagnostic::Severity;
use common::analysis_options::AnalysisOptions;
use indexmap::IndexMap;
use thiserror::Error;

pub mod lobster_tracing;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("unknown check: {0}")]
    UnknownCheck(String),
    #[error("check {0} is already registered")]
    DuplicateCheck(String),
}

/// A check runs over one translation unit and reports through the engine it is given.
/// A new instance is created for every file, so a check may keep per-file state.
pub trait Check {
    fn name(&self) -> &str;
    fn run(&mut self, unit: &TranslationUnit, engine: &mut DiagnosticEngine);
}

/// Settings a check is created with.
#[derive(Clone, Debug)]
pub struct CheckContext {
    pub severity: Severity,
    pub options: AnalysisOptions,
}

impl CheckContext {
    pub fn new(severity: Option<Severity>, options: &AnalysisOptions) -> Self {
        let severity = match severity.unwrap_or(Severity::Warning) {
            Severity::Warning if options.warnings_as_errors => Severity::Error,
            s => s,
        };
        Self {
            severity,
            options: options.clone(),
        }
    }
}

pub type CheckFactory = fn(&str, &CheckContext) -> Box<dyn Check>;

#[derive(Clone, Copy)]
struct RegisteredCheck {
    factory: CheckFactory,
    description: &'static str,
}

/// The registry of available checks, by name.
#[derive(Default)]
pub struct CheckFactories {
    factories: IndexMap<String, RegisteredCheck>,
}

impl CheckFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the checks of every built-in module.
    pub fn with_builtin_modules() -> Result<Self, CheckError> {
        let mut factories = Self::new();
        for module in builtin_modules() {
            tracing::debug!(
                "Registering module {}: {}",
                module.name(),
                module.description()
            );
            module.add_check_factories(&mut factories)?;
        }
        Ok(factories)
    }

    pub fn register_check(
        &mut self,
        name: &str,
        description: &'static str,
        factory: CheckFactory,
    ) -> Result<(), CheckError> {
        if self.factories.contains_key(name) {
            return Err(CheckError::DuplicateCheck(name.to_string()));
        }
        self.factories.insert(
            name.to_string(),
            RegisteredCheck {
                factory,
                description,
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Bind a registered check to its settings. The result creates fresh instances on demand.
    pub fn configure(
        &self,
        name: &str,
        context: CheckContext,
    ) -> Result<ConfiguredCheck, CheckError> {
        let registered = self
            .factories
            .get(name)
            .ok_or_else(|| CheckError::UnknownCheck(name.to_string()))?;
        Ok(ConfiguredCheck {
            name: name.to_string(),
            description: registered.description,
            factory: registered.factory,
            context,
        })
    }
}

/// A check enabled for an analysis, with the settings it runs with.
#[derive(Clone)]
pub struct ConfiguredCheck {
    pub name: String,
    pub description: &'static str,
    factory: CheckFactory,
    pub context: CheckContext,
}

impl ConfiguredCheck {
    pub fn instantiate(&self) -> Box<dyn Check> {
        (self.factory)(&self.name, &self.context)
    }

    pub fn engine(&self) -> DiagnosticEngine {
        DiagnosticEngine::new(&self.name, self.context.severity)
    }
}

/// A named group of checks.
pub trait CheckModule {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn add_check_factories(&self, factories: &mut CheckFactories) -> Result<(), CheckError>;
}

pub struct LobsterModule;

impl CheckModule for LobsterModule {
    fn name(&self) -> &'static str {
        LOBSTER_MODULE_NAME
    }

    fn description(&self) -> &'static str {
        LOBSTER_MODULE_DESCRIPTION
    }

    fn add_check_factories(&self, factories: &mut CheckFactories) -> Result<(), CheckError> {
        factories.register_check(
            TRACING_CHECK_NAME,
            TRACING_CHECK_DESCRIPTION,
            lobster_tracing::TracingCheck::create,
        )
    }
}

fn builtin_modules() -> Vec<Box<dyn CheckModule>> {
    vec![Box::new(LobsterModule)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let factories = CheckFactories::with_builtin_modules().unwrap();
        assert_eq!(factories.names().collect::<Vec<_>>(), vec!["lobster-tracing"]);

        let configured = factories
            .configure(
                "lobster-tracing",
                CheckContext::new(None, &AnalysisOptions::default()),
            )
            .unwrap();
        assert_eq!(configured.instantiate().name(), "lobster-tracing");
        assert!(configured.description.starts_with("Reports"));
    }

    #[test]
    fn test_registry_errors() {
        let mut factories = CheckFactories::new();
        LobsterModule.add_check_factories(&mut factories).unwrap();
        assert_eq!(
            LobsterModule.add_check_factories(&mut factories),
            Err(CheckError::DuplicateCheck("lobster-tracing".to_string()))
        );
        assert!(matches!(
            factories.configure("misc-unknown", CheckContext::new(None, &AnalysisOptions::default())),
            Err(CheckError::UnknownCheck(name)) if name == "misc-unknown"
        ));
    }

    #[test]
    fn test_check_context_severity() {
        let options = AnalysisOptions::default();
        assert_eq!(CheckContext::new(None, &options).severity, Severity::Warning);
        assert_eq!(
            CheckContext::new(Some(Severity::Notice), &options).severity,
            Severity::Notice
        );

        let options = AnalysisOptions {
            warnings_as_errors: true,
            ..Default::default()
        };
        assert_eq!(CheckContext::new(None, &options).severity, Severity::Error);
        assert_eq!(
            CheckContext::new(Some(Severity::Notice), &options).severity,
            Severity::Notice
        );
    }
}
