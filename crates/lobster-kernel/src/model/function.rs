use common::model::position::{SourceLocation, SourceRange};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a function is labelled in tracing diagnostics.
#[derive(Copy, Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Hash)]
pub enum FunctionKind {
    #[serde(rename = "FUNCTION")]
    Function,
    #[serde(rename = "METHOD")]
    Method,
    #[serde(rename = "MAIN_FUNCTION")]
    MainFunction,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Method => write!(f, "method"),
            Self::MainFunction => write!(f, "main function"),
        }
    }
}

impl FunctionKind {
    /// Classify a declaration. Returns `None` when the declaration must not be annotated at all,
    /// which is the case for destructors the compiler synthesizes.
    pub fn classify<D: FunctionDeclaration + ?Sized>(declaration: &D) -> Option<FunctionKind> {
        if declaration.is_entry_point() {
            return Some(FunctionKind::MainFunction);
        }
        if declaration.is_class_member() {
            if declaration.is_destructor() && !declaration.class_has_user_declared_destructor() {
                return None;
            }
            return Some(FunctionKind::Method);
        }
        Some(FunctionKind::Function)
    }
}

/// The queries the annotator needs to answer about a function-like declaration.
pub trait FunctionDeclaration {
    /// Where diagnostics about this declaration are reported (the start of its name).
    fn location(&self) -> SourceLocation;
    /// The range of the body, `None` if this declaration has no body.
    fn body_range(&self) -> Option<SourceRange>;
    fn qualified_name(&self) -> &str;
    fn is_entry_point(&self) -> bool;
    fn is_class_member(&self) -> bool;
    fn is_destructor(&self) -> bool;
    /// Only meaningful for destructors.
    fn class_has_user_declared_destructor(&self) -> bool;
}

#[derive(Copy, Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Builder)]
pub struct DestructorInfo {
    pub class_has_user_declared_destructor: bool,
}

/// A function-like declaration found in a translation unit.
#[derive(Clone, Deserialize, Debug, Serialize, Eq, PartialEq, Builder)]
pub struct FunctionRecord {
    pub location: SourceLocation,
    #[builder(default)]
    pub body: Option<SourceRange>,
    pub qualified_name: String,
    #[builder(default)]
    pub is_entry_point: bool,
    #[builder(default)]
    pub is_class_member: bool,
    #[builder(default)]
    pub destructor: Option<DestructorInfo>,
}

impl FunctionDeclaration for FunctionRecord {
    fn location(&self) -> SourceLocation {
        self.location
    }

    fn body_range(&self) -> Option<SourceRange> {
        self.body
    }

    fn qualified_name(&self) -> &str {
        self.qualified_name.as_str()
    }

    fn is_entry_point(&self) -> bool {
        self.is_entry_point
    }

    fn is_class_member(&self) -> bool {
        self.is_class_member
    }

    fn is_destructor(&self) -> bool {
        self.destructor.is_some()
    }

    fn class_has_user_declared_destructor(&self) -> bool {
        self.destructor
            .map(|d| d.class_has_user_declared_destructor)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::position::Position;

    fn record(name: &str) -> FunctionRecordBuilder {
        let mut builder = FunctionRecordBuilder::default();
        builder
            .location(SourceLocation::new(0, Position::new(1, 1)))
            .qualified_name(name.to_string());
        builder
    }

    #[test]
    fn test_classify_priorities() {
        let free = record("kitten::test1").build().unwrap();
        assert_eq!(FunctionKind::classify(&free), Some(FunctionKind::Function));

        let method = record("test3::test4")
            .is_class_member(true)
            .build()
            .unwrap();
        assert_eq!(FunctionKind::classify(&method), Some(FunctionKind::Method));

        // the entry point wins over everything else
        let main = record("main")
            .is_entry_point(true)
            .is_class_member(true)
            .build()
            .unwrap();
        assert_eq!(FunctionKind::classify(&main), Some(FunctionKind::MainFunction));
    }

    #[test]
    fn test_classify_destructors() {
        let implicit = record("Foo::~Foo")
            .is_class_member(true)
            .destructor(Some(DestructorInfo {
                class_has_user_declared_destructor: false,
            }))
            .build()
            .unwrap();
        assert_eq!(FunctionKind::classify(&implicit), None);

        let user_declared = record("Foo::~Foo")
            .is_class_member(true)
            .destructor(Some(DestructorInfo {
                class_has_user_declared_destructor: true,
            }))
            .build()
            .unwrap();
        assert_eq!(
            FunctionKind::classify(&user_declared),
            Some(FunctionKind::Method)
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FunctionKind::Function.to_string(), "function");
        assert_eq!(FunctionKind::Method.to_string(), "method");
        assert_eq!(FunctionKind::MainFunction.to_string(), "main function");
    }
}
