//! Pre-order traversal with in-place splicing.
//!
//! [`walk`] hands the visitor a [`Cursor`] that owns mutable access to the
//! parent's child list. A visitor can replace the current node with any number
//! of nodes and return [`Step::Skip`] so the walker steps over the replacement
//! instead of visiting it again. Without the skip, a highlighter would find its
//! own output and recurse forever.
//!
//! The root is never passed to the visitor since it has no parent.

use crate::node::{DocumentNode, Element};

/// What the walker should do after a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Descend into the current node (if it is an element), then move on.
    Continue,
    /// The `n` nodes now starting at the cursor index are final: do not visit
    /// or descend into them. `Skip(0)` after removing the current node resumes
    /// at the node that slid into its place.
    Skip(usize),
}

/// Position of the node being visited.
pub struct Cursor<'a> {
    parent: &'a str,
    siblings: &'a mut Vec<DocumentNode>,
    index: usize,
}

impl Cursor<'_> {
    /// Index of the current node within its parent.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Tag of the parent element.
    pub const fn parent_tag(&self) -> &str {
        self.parent
    }

    /// The current node.
    pub fn node(&self) -> &DocumentNode {
        &self.siblings[self.index]
    }

    /// The current node, mutably.
    pub fn node_mut(&mut self) -> &mut DocumentNode {
        &mut self.siblings[self.index]
    }

    /// The parent's full child list.
    pub fn siblings_mut(&mut self) -> &mut Vec<DocumentNode> {
        self.siblings
    }

    /// Splice `nodes` in place of the current node and return the step that
    /// skips all of them.
    pub fn replace_with(&mut self, nodes: Vec<DocumentNode>) -> Step {
        let count = nodes.len();
        self.siblings.splice(self.index..=self.index, nodes);
        Step::Skip(count)
    }
}

/// Walk `root` depth-first in document order, letting `visit` rewrite the
/// tree as it goes.
///
/// Each node is visited once. Nodes inserted by a visitor are visited only if
/// the visitor does not skip them.
pub fn walk<F>(root: &mut DocumentNode, mut visit: F)
where
    F: FnMut(&mut Cursor<'_>) -> Step,
{
    if let DocumentNode::Element(el) = root {
        walk_children(el, &mut visit);
    }
}

fn walk_children<F>(parent: &mut Element, visit: &mut F)
where
    F: FnMut(&mut Cursor<'_>) -> Step,
{
    let Element { tag, children, .. } = parent;
    let mut index = 0;

    while index < children.len() {
        let len_before = children.len();
        let step = visit(&mut Cursor {
            parent: tag.as_str(),
            siblings: &mut *children,
            index,
        });

        match step {
            Step::Continue => {
                if let Some(DocumentNode::Element(child)) = children.get_mut(index) {
                    walk_children(child, visit);
                }
                index += 1;
            },
            // Nothing was removed, so the node is still here and already seen.
            Step::Skip(0) if children.len() == len_before => index += 1,
            Step::Skip(count) => index += count,
        }
    }
}

/// Read-only pre-order traversal: `visit(node, index_in_parent, parent)`.
pub fn for_each_descendant<F>(root: &DocumentNode, mut visit: F)
where
    F: FnMut(&DocumentNode, usize, &Element),
{
    if let DocumentNode::Element(el) = root {
        visit_children(el, &mut visit);
    }
}

fn visit_children<F>(parent: &Element, visit: &mut F)
where
    F: FnMut(&DocumentNode, usize, &Element),
{
    for (index, child) in parent.children.iter().enumerate() {
        visit(child, index, parent);
        if let DocumentNode::Element(el) = child {
            visit_children(el, visit);
        }
    }
}
