//! Plain-text dumps of a laid-out tree for snapshot assertions.

use crate::element::{ElementId, ElementKind, ElementTree};

/// Render the tree as one line per shown element, indented by depth:
///
/// ```text
/// root 0,0 300x100
///   a 0,0 100x100
///   b 110,0 100x100 hidden
/// ```
///
/// Elements are named by key, falling back to their kind. Hidden elements
/// are listed with a `hidden` marker and their subtree is skipped; elements
/// whose clip is empty are marked `clipped`.
pub fn dump_layout(tree: &ElementTree) -> String {
    let mut lines = Vec::new();
    if let Some(root) = tree.root() {
        dump(tree, root, 0, &mut lines);
    }
    lines.join("\n")
}

fn dump(tree: &ElementTree, id: ElementId, depth: usize, lines: &mut Vec<String>) {
    let Some(data) = tree.get(id) else {
        return;
    };
    let name = data.key.clone().unwrap_or_else(|| {
        match &data.kind {
            ElementKind::Leaf => "leaf",
            ElementKind::Text(_) => "text",
            ElementKind::Container(_) => "container",
            ElementKind::Scroll { .. } => "scroll",
        }
        .to_owned()
    });
    let r = data.calculated();
    let mut line = format!("{}{} {},{} {}x{}", "  ".repeat(depth), name, r.x, r.y, r.width, r.height);
    if !data.is_visible() {
        line.push_str(" hidden");
        lines.push(line);
        return;
    }
    if data.clip().is_invalid() {
        line.push_str(" clipped");
    }
    if let Some(state) = data.kind.scroll() {
        line.push_str(&format!(" scroll={},{}", state.offset.x, state.offset.y));
    }
    lines.push(line);
    for &child in tree.children(id) {
        dump(tree, child, depth + 1, lines);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
