use crate::analysis::languages::ts_node_text;
use std::ops::Range;

/// Byte ranges of the conditional branches the preprocessor always drops: the body of
/// `#if 0`, and every branch after one whose condition is a non-zero literal.
///
/// Other conditions depend on macros, so all the branches of `#ifdef X ... #else` stay active.
#[derive(Debug, Default)]
pub struct InactiveRegions {
    ranges: Vec<Range<usize>>,
}

impl InactiveRegions {
    pub fn from_tree(code: &str, tree: &tree_sitter::Tree) -> Self {
        let mut regions = InactiveRegions::default();
        let mut cursor = tree.walk();

        loop {
            let node = cursor.node();
            if matches!(node.kind(), "preproc_if" | "preproc_ifdef") {
                regions.add_chain(code, node);
            }

            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return regions;
                }
            }
        }
    }

    /// Whether the byte at `offset` is in a dropped branch.
    pub fn contains(&self, offset: usize) -> bool {
        self.ranges.iter().any(|range| range.contains(&offset))
    }

    // The branches of a chain are nested through their `alternative` field. A branch spans
    // from its condition to the next branch, the last one to the `#endif`.
    fn add_chain(&mut self, code: &str, first: tree_sitter::Node) {
        let end = first.end_byte();
        let mut branch = Some(first);
        let mut taken = false;

        while let Some(node) = branch {
            let condition = node.child_by_field_name("condition");
            let next = node.child_by_field_name("alternative");
            let start = condition.map_or(node.start_byte(), |c| c.end_byte());
            let stop = next.map_or(end, |n| n.start_byte());

            let value = match node.kind() {
                "preproc_if" | "preproc_elif" => condition.and_then(|c| literal_value(code, c)),
                "preproc_else" => Some(true),
                _ => None,
            };
            match value {
                _ if taken => self.ranges.push(start..stop),
                Some(false) => self.ranges.push(start..stop),
                Some(true) => taken = true,
                None => {}
            }
            branch = next;
        }
    }
}

/// The truth value of a condition written as an integer literal, like `0` or `(1L)`.
fn literal_value(code: &str, condition: tree_sitter::Node) -> Option<bool> {
    match condition.kind() {
        "number_literal" => ts_node_text(code, condition)
            .trim_end_matches(&['u', 'U', 'l', 'L'][..])
            .parse::<u64>()
            .ok()
            .map(|value| value != 0),
        "parenthesized_expression" => condition
            .named_child(0)
            .and_then(|inner| literal_value(code, inner)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tree_sitter::get_tree;
    use crate::model::common::Language;

    fn active(code: &str) -> Vec<&'static str> {
        let tree = get_tree(code, &Language::Cpp).unwrap();
        let regions = InactiveRegions::from_tree(code, &tree);
        ["first", "second", "third"]
            .into_iter()
            .filter(|marker| {
                code.find(marker)
                    .is_some_and(|offset| !regions.contains(offset))
            })
            .collect()
    }

    #[test]
    fn test_if_zero() {
        assert_eq!(active("#if 0\nint first;\n#endif\n"), Vec::<&str>::new());
        assert_eq!(
            active("#if 0\nint first;\n#else\nint second;\n#endif\n"),
            vec!["second"]
        );
        assert_eq!(
            active("#if (0L)\nint first;\n#elif 1\nint second;\n#else\nint third;\n#endif\n"),
            vec!["second"]
        );
    }

    #[test]
    fn test_if_one() {
        assert_eq!(
            active("#if 1\nint first;\n#elif FEATURE\nint second;\n#else\nint third;\n#endif\n"),
            vec!["first"]
        );
    }

    // Without a preprocessor, both sides of a macro condition are kept.
    #[test]
    fn test_macro_conditions() {
        assert_eq!(
            active("#ifdef FEATURE\nint first;\n#else\nint second;\n#endif\n"),
            vec!["first", "second"]
        );
        assert_eq!(
            active("#if FEATURE > 2\nint first;\n#elif 0\nint second;\n#else\nint third;\n#endif\n"),
            vec!["first", "third"]
        );
    }
}
