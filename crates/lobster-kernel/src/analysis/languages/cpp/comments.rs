use crate::analysis::languages::cpp::conditionals::InactiveRegions;
use crate::analysis::languages::{ts_node_range, ts_node_text};
use crate::analysis::translation_unit::RawComment;

/// Returns every comment of the tree the compiler sees, in document order. Comments in
/// branches dropped by `#if 0` are skipped.
pub fn get_comments<'a>(code: &'a str, tree: &tree_sitter::Tree) -> Vec<RawComment<'a>> {
    let inactive = InactiveRegions::from_tree(code, tree);
    let mut comments = vec![];
    let mut cursor = tree.walk();

    loop {
        let node = cursor.node();
        if node.kind() == "comment" && !inactive.contains(node.start_byte()) {
            comments.push(RawComment {
                text: ts_node_text(code, node),
                range: ts_node_range(node),
            });
        }

        if cursor.goto_first_child() {
            continue;
        }
        // climb until a sibling is found, the whole tree has been visited at the root
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return comments;
            }
        }
    }
}
