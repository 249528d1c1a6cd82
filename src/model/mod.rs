//! Intermediate representation of a mind map.
//!
//! Format-agnostic structure that the XMind archive format and the flat text
//! formats convert to and from. The tree is a strict single-owner hierarchy:
//! nodes own their children and carry no parent back-pointers, so parent
//! lookup is a tree search rather than a stored reference.

use crate::util::uuid_v4;

/// A labeled vertex in the mind map tree.
///
/// The same type serves as topic root, plain topic, and detached topic; the
/// three only differ in which container of the [`MindMap`] holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique identifier within one document, generated when absent.
    pub id: String,
    /// Display title, normalized on construction (leading zero-width spaces
    /// stripped, surrounding whitespace trimmed).
    pub title: String,
    /// Optional free-text note.
    pub note: Option<String>,
    /// Ordered labels; insertion order is significant.
    pub labels: Vec<String>,
    /// Ordered children; insertion order is display order.
    pub children: Vec<Node>,
}

/// A labeled directed edge between two node identifiers.
///
/// Endpoints are opaque strings and are not required to resolve to an
/// existing node; consumers must handle unresolved lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub title: String,
}

/// A mind map document: at most one root tree, free-floating detached
/// topics, and relations between node identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindMap {
    pub title: String,
    pub root: Option<Node>,
    pub detached: Vec<Node>,
    pub relations: Vec<Relation>,
}

/// Strip leading zero-width spaces and trim surrounding whitespace.
///
/// XMind titles frequently start with U+200B inserted by the authoring tool.
/// The original raw title is not retained; this is a one-way normalization.
pub(crate) fn normalize_title(raw: &str) -> String {
    raw.trim_start_matches('\u{200B}').trim().to_string()
}

impl Node {
    /// Create a node with a freshly generated id.
    pub fn new(title: impl AsRef<str>) -> Self {
        Self::with_id(uuid_v4(), title)
    }

    /// Create a node with an explicit id (e.g., one carried by source data).
    pub fn with_id(id: impl Into<String>, title: impl AsRef<str>) -> Self {
        Node {
            id: id.into(),
            title: normalize_title(title.as_ref()),
            note: None,
            labels: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set the free-text note (builder style).
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Add a label (builder style). Duplicates are skipped.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.add_label(label);
        self
    }

    /// Append a child to the ordered child list.
    ///
    /// No cycle check is performed; a cycle cannot be expressed through owned
    /// children anyway.
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Remove the first child equal to `child`. No-op if absent.
    pub fn remove_child(&mut self, child: &Node) {
        if let Some(pos) = self.children.iter().position(|c| c == child) {
            self.children.remove(pos);
        }
    }

    /// Add a label unless it is already present.
    ///
    /// The load path pushes labels raw instead, so duplicates in source data
    /// survive parsing; only the mutation API deduplicates.
    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    /// Depth of this subtree: 1 for a leaf, 1 + max child depth otherwise.
    ///
    /// Computed recursively on each call, O(subtree size); not cached.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Node::depth)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order depth-first walk. `visit` sees the node before its children,
    /// left to right, with depth relative to the starting node (0 for the
    /// node `traverse` is called on).
    pub fn traverse<F: FnMut(&Node, usize)>(&self, visit: &mut F) {
        self.walk(visit, 0);
    }

    fn walk<F: FnMut(&Node, usize)>(&self, visit: &mut F, depth: usize) {
        visit(self, depth);
        for child in &self.children {
            child.walk(visit, depth + 1);
        }
    }

    /// Depth-first search for a node by id within this subtree.
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    fn render_outline(&self, out: &mut String, indent: usize, prefix: &str) {
        out.push_str(&"  ".repeat(indent));
        out.push_str(prefix);
        out.push_str(&self.title);
        out.push('\n');
        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            let child_prefix = if i == last { "└── " } else { "├── " };
            child.render_outline(out, indent + 1, child_prefix);
        }
    }
}

impl Relation {
    /// Create a relation with a freshly generated id.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self::with_id(uuid_v4(), source_id, target_id, title)
    }

    /// Create a relation with an explicit id.
    pub fn with_id(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Relation {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            title: title.into(),
        }
    }
}

impl Default for MindMap {
    fn default() -> Self {
        Self::new("")
    }
}

impl MindMap {
    /// Create an empty mind map. An empty title defaults to "Untitled".
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        MindMap {
            title: if title.is_empty() {
                "Untitled".to_string()
            } else {
                title
            },
            root: None,
            detached: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Install the topic root, replacing any existing one.
    pub fn set_root(&mut self, root: Node) {
        self.root = Some(root);
    }

    /// Append a free-floating topic.
    pub fn add_detached(&mut self, node: Node) {
        self.detached.push(node);
    }

    /// Append a relation. Endpoint validity is not checked.
    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    /// Depth of the document: 0 without a root, otherwise the root's depth.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map(Node::depth).unwrap_or(0)
    }

    /// Look up a node by id: the root tree is searched first, then each
    /// detached subtree in list order. Root-tree matches shadow detached
    /// matches with the same id.
    pub fn get_node_by_id(&self, id: &str) -> Option<&Node> {
        self.root
            .as_ref()
            .and_then(|r| r.find(id))
            .or_else(|| self.detached.iter().find_map(|d| d.find(id)))
    }

    /// Pre-order walk of the root tree, depth 0 at the root.
    pub fn traverse<F: FnMut(&Node, usize)>(&self, visit: &mut F) {
        if let Some(root) = &self.root {
            root.traverse(visit);
        }
    }

    /// Count of nodes in the root tree (detached subtrees excluded).
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |_, _| count += 1);
        count
    }

    /// Render the root tree as a text outline with box-drawing connectors.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        if let Some(root) = &self.root {
            root.render_outline(&mut out, 0, "");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("\u{200B}\u{200B}  Sports  "), "Sports");
        assert_eq!(normalize_title("  plain  "), "plain");
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn test_depth_single_node() {
        assert_eq!(Node::new("leaf").depth(), 1);
    }

    #[test]
    fn test_depth_one_level() {
        let mut root = Node::new("root");
        root.add_child(Node::new("a"));
        root.add_child(Node::new("b"));
        assert_eq!(root.depth(), 2);
    }

    #[test]
    fn test_depth_ignores_notes_and_labels() {
        let mut root = Node::new("root");
        root.add_child(Node::new("a"));
        let before = root.depth();
        root.note = Some("a note".into());
        root.add_label("tag");
        assert_eq!(root.depth(), before);
    }

    #[test]
    fn test_map_depth_no_root() {
        assert_eq!(MindMap::new("empty").depth(), 0);
    }

    #[test]
    fn test_traverse_preorder_relative_depth() {
        let mut root = Node::new("root");
        let mut a = Node::new("a");
        a.add_child(Node::new("a1"));
        root.add_child(a);
        root.add_child(Node::new("b"));

        let mut seen = Vec::new();
        root.traverse(&mut |node, depth| seen.push((node.title.clone(), depth)));
        assert_eq!(
            seen,
            vec![
                ("root".to_string(), 0),
                ("a".to_string(), 1),
                ("a1".to_string(), 2),
                ("b".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_remove_child_absent_is_noop() {
        let mut root = Node::new("root");
        root.add_child(Node::new("a"));
        let stranger = Node::new("stranger");
        root.remove_child(&stranger);
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_add_label_dedup() {
        let mut node = Node::new("n");
        node.add_label("x");
        node.add_label("x");
        node.add_label("y");
        assert_eq!(node.labels, vec!["x", "y"]);
    }

    #[test]
    fn test_root_tree_shadows_detached_on_duplicate_id() {
        let mut map = MindMap::new("dup");
        map.set_root(Node::with_id("shared", "in root"));
        map.add_detached(Node::with_id("shared", "in detached"));
        assert_eq!(map.get_node_by_id("shared").unwrap().title, "in root");
    }

    #[test]
    fn test_get_node_by_id_searches_detached() {
        let mut map = MindMap::new("m");
        map.set_root(Node::with_id("r", "root"));
        let mut floater = Node::with_id("f", "floating");
        floater.add_child(Node::with_id("f1", "child"));
        map.add_detached(floater);
        assert_eq!(map.get_node_by_id("f1").unwrap().title, "child");
        assert!(map.get_node_by_id("nope").is_none());
    }

    #[test]
    fn test_untitled_default() {
        assert_eq!(MindMap::new("").title, "Untitled");
        assert_eq!(MindMap::default().title, "Untitled");
    }

    #[test]
    fn test_outline_rendering() {
        let mut root = Node::new("root");
        let mut a = Node::new("a");
        a.add_child(Node::new("a1"));
        root.add_child(a);
        root.add_child(Node::new("b"));
        let mut map = MindMap::new("m");
        map.set_root(root);

        assert_eq!(map.outline(), "root\n  ├── a\n    └── a1\n  └── b\n");
    }
}
