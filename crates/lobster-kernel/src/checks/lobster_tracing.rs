use crate::analysis::annotator::FunctionAnnotator;
use crate::analysis::classifier::CommentClassifier;
use crate::analysis::diagnostics::DiagnosticEngine;
use crate::analysis::translation_unit::TranslationUnit;
use crate::checks::{Check, CheckContext};

/// Reports the tracing tags of every function of a file.
pub struct TracingCheck {
    name: String,
}

impl TracingCheck {
    pub fn create(name: &str, _context: &CheckContext) -> Box<dyn Check> {
        Box::new(TracingCheck {
            name: name.to_string(),
        })
    }
}

impl Check for TracingCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, unit: &TranslationUnit, engine: &mut DiagnosticEngine) {
        // every comment is classified before the first function is annotated
        let mut classifier = CommentClassifier::new();
        for comment in &unit.comments {
            classifier.handle_comment(comment.text, comment.range);
        }

        let annotator = FunctionAnnotator::new(&classifier);
        for function in &unit.functions {
            annotator.annotate(function, engine);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::common::Language;
    use crate::model::diagnostic::{Diagnostic, Severity};
    use common::model::position::Position;

    fn run(code: &str) -> Vec<Diagnostic> {
        let unit = TranslationUnit::parse(code, &Language::Cpp).unwrap();
        let mut engine = DiagnosticEngine::new("lobster-tracing", Severity::Warning);
        let mut check = TracingCheck {
            name: "lobster-tracing".to_string(),
        };
        check.run(&unit, &mut engine);
        engine.into_diagnostics()
    }

    fn lines(diagnostics: &[Diagnostic]) -> Vec<String> {
        diagnostics
            .iter()
            .map(|d| format!("{}:{}: {}", d.position.line, d.position.col, d.message))
            .collect()
    }

    #[test]
    fn test_reference_scenario() {
        let code = r#"// RUN: %check_clang_tidy -std=c++11-or-later %s lobster-tracing %t

namespace kitten {

bool test1() { return false; }
// CHECK-MESSAGES: :[[@LINE-1]]:6: warning: function kitten::test1 has no tracing tags [lobster-tracing]

bool test2() {
  // lobster-trace: cb-12345, tex-potato
  return false;
}
// CHECK-MESSAGES: :[[@LINE-4]]:6: warning: function kitten::test2 traces to  cb-12345, tex-potato [lobster-tracing]

}

class test3 {
  test3() {}
  // CHECK-MESSAGES: :[[@LINE-1]]:3: warning: method test3::test3 has no tracing tags [lobster-tracing]

  bool test4() { return false; }
  // CHECK-MESSAGES: :[[@LINE-1]]:8: warning: method test3::test4 has no tracing tags [lobster-tracing]
};

template <typename T>
T test5(T input) { return input; }
// CHECK-MESSAGES: :[[@LINE-1]]:3: warning: function test5 has no tracing tags [lobster-tracing]

int main(int argc, char **argv) { return 0; }
// CHECK-MESSAGES: :[[@LINE-1]]:5: warning: main function main has no tracing tags [lobster-tracing]
"#;
        assert_eq!(
            lines(&run(code)),
            vec![
                "5:6: function kitten::test1 has no tracing tags",
                "8:6: function kitten::test2 traces to  cb-12345, tex-potato",
                "17:3: method test3::test3 has no tracing tags",
                "20:8: method test3::test4 has no tracing tags",
                "25:3: function test5 has no tracing tags",
                "28:5: main function main has no tracing tags",
            ]
        );
    }

    #[test]
    fn test_exempt_method_and_comments_outside_bodies() {
        let code = r#"// lobster-trace: file-level
class Widget {
public:
  // lobster-exclude: not in a body
  Widget() {
    // lobster-exclude: Constructor
  }
};

void compute() {
  // lobster-trace: req-1
  /* lobster-trace: block comments are ignored */
  // lobster-exclude: partly legacy
  // lobster-trace: req-2
}
"#;
        let diagnostics = run(code);
        assert_eq!(
            lines(&diagnostics),
            vec![
                "5:3: method Widget::Widget exempt from tracing:  Constructor",
                "10:6: function compute traces to  req-1",
                "10:6: function compute traces to  req-2",
                "10:6: function compute exempt from tracing:  partly legacy",
            ]
        );
        assert!(diagnostics.iter().all(|d| d.position != Position::new(1, 1)));
    }

    #[test]
    fn test_dropped_conditional_branches_and_local_classes() {
        let code = r#"#if 0
void dead() {}
#endif
namespace ns {
void outer() {
#if 0
  // lobster-trace: disabled
#else
  // lobster-trace: req-3
#endif
  struct Local { void inner() {} };
}
struct Local { void inner(); };
void Local::inner() {}
}
"#;
        assert_eq!(
            lines(&run(code)),
            vec![
                "5:6: function ns::outer traces to  req-3",
                "11:23: method ns::outer()::Local::inner has no tracing tags",
                "14:13: method ns::Local::inner has no tracing tags",
            ]
        );
    }

    #[test]
    fn test_fresh_state_per_run() {
        let code = "void f() {\n  // lobster-trace: a\n}\n";
        assert_eq!(run(code).len(), 1);
        assert_eq!(run(code).len(), 1);
    }
}
