use crate::analysis::languages::cpp::conditionals::InactiveRegions;
use crate::analysis::languages::{ts_node_range, ts_node_start, ts_node_text};
use crate::model::function::{DestructorInfo, FunctionRecord};
use std::collections::{HashMap, HashSet};

//
// Note: this works on syntax only. Out-of-line definitions (`void A::f() {}`) are resolved
// against the classes and namespaces declared in the same file, anything else is assumed to
// be a class.
//

const ANONYMOUS_NAMESPACE: &str = "(anonymous namespace)";
const ENTRY_POINT_NAME: &str = "main";

/// Returns a record for every function definition of the tree, in document order.
/// Definitions in branches dropped by `#if 0` are skipped.
///
/// The qualified name is built from the enclosing namespaces and classes followed by the
/// name as written (template arguments excluded). Classes local to a function are named
/// after it, as in `outer()::Local::inner`. The location is the start of the last component
/// of the name.
pub fn get_function_records(code: &str, tree: &tree_sitter::Tree) -> Vec<FunctionRecord> {
    let inactive = InactiveRegions::from_tree(code, tree);
    let index = FileIndex::build(code, tree.root_node(), &inactive);
    let mut collector = Collector {
        code,
        index: &index,
        inactive: &inactive,
        scopes: vec![],
        records: vec![],
    };
    collector.visit(tree.root_node(), false);
    collector.records
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Namespace(String),
    Class(String),
    /// The body of a function, named by its qualified name followed by `()`.
    Function(String),
}

impl Scope {
    fn name(&self) -> &str {
        match self {
            Scope::Namespace(name) | Scope::Class(name) | Scope::Function(name) => name.as_str(),
        }
    }
}

/// Classes and namespaces declared anywhere in the file, outside function bodies.
#[derive(Debug, Default)]
struct FileIndex {
    /// Qualified class name to whether its body declares a destructor.
    classes: HashMap<String, bool>,
    namespaces: HashSet<String>,
}

impl FileIndex {
    fn build(code: &str, root: tree_sitter::Node, inactive: &InactiveRegions) -> FileIndex {
        let mut index = FileIndex::default();
        index.visit(code, root, inactive, &mut vec![]);
        index
    }

    fn visit(
        &mut self,
        code: &str,
        node: tree_sitter::Node,
        inactive: &InactiveRegions,
        scopes: &mut Vec<String>,
    ) {
        if inactive.contains(node.start_byte()) {
            return;
        }
        let depth = scopes.len();
        match node.kind() {
            "namespace_definition" => {
                let names = match node.child_by_field_name("name") {
                    Some(name) => namespace_components(code, name),
                    None => vec![ANONYMOUS_NAMESPACE.to_string()],
                };
                self.namespaces.extend(names.iter().cloned());
                scopes.extend(names);
            }
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                if let Some(body) = node.child_by_field_name("body") {
                    let name = match node.child_by_field_name("name") {
                        Some(name) => type_name(code, name),
                        None => anonymous_record_name(node.kind()).to_string(),
                    };
                    let declares_destructor = declares_destructor(code, body, &name);
                    scopes.push(name);
                    let entry = self.classes.entry(scopes.join("::")).or_insert(false);
                    *entry |= declares_destructor;
                }
            }
            // local classes cannot be named outside of their function
            "function_definition" => return,
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(code, child, inactive, scopes);
        }
        scopes.truncate(depth);
    }

    /// Look up the class written `qualifiers` from the `enclosing` scopes, innermost first.
    /// Returns whether it declares a destructor.
    fn lookup_class(&self, enclosing: &[&str], qualifiers: &[String]) -> Option<bool> {
        if qualifiers.is_empty() {
            return None;
        }
        let written = qualifiers.join("::");
        (0..=enclosing.len()).rev().find_map(|end| {
            let key = enclosing[..end]
                .iter()
                .copied()
                .chain(std::iter::once(written.as_str()))
                .collect::<Vec<_>>()
                .join("::");
            self.classes.get(&key).copied()
        })
    }

    /// Whether an out-of-line definition with these qualifiers defines a class member.
    fn is_member_definition(&self, enclosing: &[&str], name: &DeclaredName) -> bool {
        let Some(last) = name.qualifiers.last() else {
            return false;
        };
        if self.lookup_class(enclosing, &name.qualifiers).is_some()
            || name.is_destructor
            || *last == name.name
        {
            return true;
        }
        !name
            .qualifiers
            .iter()
            .all(|qualifier| self.namespaces.contains(qualifier))
    }
}

struct Collector<'a, 'i> {
    code: &'a str,
    index: &'i FileIndex,
    inactive: &'i InactiveRegions,
    scopes: Vec<Scope>,
    records: Vec<FunctionRecord>,
}

impl Collector<'_, '_> {
    fn visit(&mut self, node: tree_sitter::Node, is_friend: bool) {
        if self.inactive.contains(node.start_byte()) {
            return;
        }
        match node.kind() {
            "namespace_definition" => {
                let names = match node.child_by_field_name("name") {
                    Some(name) => namespace_components(self.code, name),
                    None => vec![ANONYMOUS_NAMESPACE.to_string()],
                };
                let depth = self.scopes.len();
                self.scopes.extend(names.into_iter().map(Scope::Namespace));
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit_children(body, false);
                }
                self.scopes.truncate(depth);
            }
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                // forward declarations and elaborated types have no body
                if let Some(body) = node.child_by_field_name("body") {
                    let name = match node.child_by_field_name("name") {
                        Some(name) => type_name(self.code, name),
                        None => anonymous_record_name(node.kind()).to_string(),
                    };
                    self.scopes.push(Scope::Class(name));
                    self.visit_children(body, false);
                    self.scopes.pop();
                }
            }
            "friend_declaration" => self.visit_children(node, true),
            "template_declaration" => self.visit_children(node, is_friend),
            "function_definition" => {
                let record = self.function_record(node, is_friend);
                // local classes
                let body_scopes = match &record {
                    Some(record) => vec![Scope::Function(format!("{}()", record.qualified_name))],
                    None => self.scopes.clone(),
                };
                let outer = std::mem::replace(&mut self.scopes, body_scopes);
                self.records.extend(record);
                self.visit_children(node, false);
                self.scopes = outer;
            }
            _ => self.visit_children(node, false),
        }
    }

    fn visit_children(&mut self, node: tree_sitter::Node, is_friend: bool) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child, is_friend);
        }
    }

    fn function_record(&self, node: tree_sitter::Node, is_friend: bool) -> Option<FunctionRecord> {
        let declarator = node.child_by_field_name("declarator")?;
        let name = DeclaredName::from_declarator(self.code, declarator)?;

        // a friend defined in a class belongs to the enclosing namespace
        let scopes = if is_friend {
            let end = self
                .scopes
                .iter()
                .rposition(|s| matches!(s, Scope::Namespace(_)))
                .map_or(0, |i| i + 1);
            &self.scopes[..end]
        } else {
            &self.scopes[..]
        };
        let enclosing = scopes.iter().map(Scope::name).collect::<Vec<_>>();
        let in_class = matches!(scopes.last(), Some(Scope::Class(_)));
        let is_class_member = in_class || self.index.is_member_definition(&enclosing, &name);
        let is_entry_point = !is_class_member
            && scopes.is_empty()
            && name.qualifiers.is_empty()
            && name.name == ENTRY_POINT_NAME;

        let destructor = name.is_destructor.then(|| DestructorInfo {
            class_has_user_declared_destructor: in_class
                || self
                    .index
                    .lookup_class(&enclosing, &name.qualifiers)
                    .unwrap_or(true),
        });

        let qualified_name = enclosing
            .iter()
            .copied()
            .chain(name.qualifiers.iter().map(String::as_str))
            .chain(std::iter::once(name.name.as_str()))
            .collect::<Vec<_>>()
            .join("::");

        Some(FunctionRecord {
            location: ts_node_start(name.node),
            body: function_body(node).map(ts_node_range),
            qualified_name,
            is_entry_point,
            is_class_member,
            destructor,
        })
    }
}

/// The name a function definition declares.
struct DeclaredName<'tree> {
    /// Scopes written before the name, e.g. `["A", "B"]` for `A::B::f`.
    qualifiers: Vec<String>,
    name: String,
    /// The node of the last component of the name, where the function is located.
    node: tree_sitter::Node<'tree>,
    is_destructor: bool,
}

impl<'tree> DeclaredName<'tree> {
    fn from_declarator(code: &str, declarator: tree_sitter::Node<'tree>) -> Option<Self> {
        let mut node = declarator;
        loop {
            match node.kind() {
                "function_declarator"
                | "pointer_declarator"
                | "reference_declarator"
                | "parenthesized_declarator"
                | "attributed_declarator" => {
                    node = node
                        .child_by_field_name("declarator")
                        .or_else(|| node.named_child(0))?;
                }
                _ => break,
            }
        }

        let mut qualifiers = vec![];
        while node.kind() == "qualified_identifier" {
            if let Some(scope) = node.child_by_field_name("scope") {
                qualifiers.push(type_name(code, scope));
            }
            node = node.child_by_field_name("name")?;
        }

        let (name, node) = match node.kind() {
            "identifier" | "field_identifier" => (ts_node_text(code, node).to_string(), node),
            "destructor_name" => (without_whitespace(ts_node_text(code, node)), node),
            "operator_name" => (operator_name(ts_node_text(code, node)), node),
            "operator_cast" => {
                let target = node.child_by_field_name("type")?;
                (format!("operator {}", ts_node_text(code, target)), node)
            }
            "template_function" | "template_method" => {
                let name = node.child_by_field_name("name")?;
                (ts_node_text(code, name).to_string(), name)
            }
            _ => return None,
        };

        Some(DeclaredName {
            qualifiers,
            is_destructor: name.starts_with('~'),
            name,
            node,
        })
    }
}

fn function_body(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    node.child_by_field_name("body").or_else(|| {
        let mut cursor = node.walk();
        let body = node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "try_statement");
        body
    })
}

/// The components of a namespace name, `a::b` for a nested namespace definition.
fn namespace_components(code: &str, name: tree_sitter::Node) -> Vec<String> {
    if name.kind() == "nested_namespace_specifier" {
        let mut cursor = name.walk();
        let components = name
            .named_children(&mut cursor)
            .map(|n| ts_node_text(code, n).to_string())
            .collect();
        components
    } else {
        vec![ts_node_text(code, name).to_string()]
    }
}

/// The name of a type without its template arguments.
fn type_name(code: &str, node: tree_sitter::Node) -> String {
    match node.kind() {
        "template_type" => node
            .child_by_field_name("name")
            .map(|name| ts_node_text(code, name).to_string())
            .unwrap_or_else(|| ts_node_text(code, node).to_string()),
        "qualified_identifier" => node
            .child_by_field_name("name")
            .map(|name| type_name(code, name))
            .unwrap_or_else(|| ts_node_text(code, node).to_string()),
        _ => ts_node_text(code, node).to_string(),
    }
}

fn anonymous_record_name(kind: &str) -> &'static str {
    match kind {
        "struct_specifier" => "(anonymous struct)",
        "union_specifier" => "(anonymous union)",
        _ => "(anonymous class)",
    }
}

/// Whether the member list of class `name` declares its destructor.
fn declares_destructor(code: &str, body: tree_sitter::Node, name: &str) -> bool {
    let expected = format!("~{name}");
    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        if node.kind() == "destructor_name"
            && without_whitespace(ts_node_text(code, node)) == expected
        {
            return true;
        }
        let mut cursor = node.walk();
        stack.extend(
            node.named_children(&mut cursor)
                // nested classes and function bodies do not declare members of this class
                .filter(|child| {
                    !matches!(
                        child.kind(),
                        "field_declaration_list" | "compound_statement"
                    )
                }),
        );
    }
    false
}

fn without_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `operator <` is named `operator<`, `operator  new` is named `operator new`.
fn operator_name(text: &str) -> String {
    let symbol = text.trim_start_matches("operator").trim();
    if symbol.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        let words = symbol.split_whitespace().collect::<Vec<_>>().join(" ");
        format!("operator {}", without_whitespace_around_brackets(&words))
    } else {
        format!("operator{}", without_whitespace(symbol))
    }
}

// `new [ ]` is written `new[]`
fn without_whitespace_around_brackets(text: &str) -> String {
    match text.find('[') {
        Some(i) => format!("{}{}", text[..i].trim_end(), without_whitespace(&text[i..])),
        None => text.to_string(),
    }
}
