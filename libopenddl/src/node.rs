//! Structure tree.
//!
//! Nodes live in a [`Tree`] arena owned by one parse session and refer to
//! each other by [`NodeId`]. A node owns its children through the arena;
//! its parent link is a plain id and never keeps anything alive.

use crate::value::{Name, Payload, Property};

/// Index of a node within its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One parsed structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub node_type: String,
    pub name: Option<Name>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub properties: Vec<Property>,
    pub payload: Option<Payload>,
}

impl Node {
    fn new(node_type: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            node_type: node_type.into(),
            name: None,
            parent,
            children: Vec::new(),
            properties: Vec::new(),
            payload: None,
        }
    }
}

/// Arena of nodes; index 0 is always the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Type given to the root node.
    pub const ROOT_TYPE: &'static str = "root";

    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(Self::ROOT_TYPE, None)],
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.get(self.root_id())
    }

    /// Create a node and append it to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeId, node_type: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// A borrowed handle for walking a [`Tree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &'t Node {
        self.tree.node(self.id)
    }

    pub fn node_type(&self) -> &'t str {
        &self.node().node_type
    }

    /// The display name, without its scope prefix; empty when unnamed.
    pub fn name(&self) -> &'t str {
        self.node().name.as_ref().map_or("", Name::as_str)
    }

    pub fn scoped_name(&self) -> Option<&'t Name> {
        self.node().name.as_ref()
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.node().parent.map(|id| self.tree.get(id))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'t>> + ExactSizeIterator + 't {
        let tree = self.tree;
        self.node().children.iter().map(move |&id| tree.get(id))
    }

    /// The `index`th child in document order.
    pub fn child(&self, index: usize) -> Option<NodeRef<'t>> {
        self.node().children.get(index).map(|&id| self.tree.get(id))
    }

    pub fn properties(&self) -> &'t [Property] {
        &self.node().properties
    }

    /// The first property with the given key.
    pub fn property(&self, key: &str) -> Option<&'t Property> {
        self.properties().iter().find(|p| p.key.as_str() == key)
    }

    pub fn payload(&self) -> Option<&'t Payload> {
        self.node().payload.as_ref()
    }

    /// Depth below the root; the root is 0.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), NodeRef::parent).count()
    }
}

/// The result of one parse: the structure tree plus document-level
/// properties collected from `Metric` structures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub tree: Tree,
    pub properties: Vec<Property>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.tree.root()
    }

    /// The first document-level property with the given key.
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key.as_str() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Identifier, NameScope};

    #[test]
    fn test_new_tree_has_root() {
        let tree = Tree::new();
        let root = tree.root();
        assert_eq!(root.node_type(), "root");
        assert_eq!(root.name(), "");
        assert!(root.parent().is_none());
        assert_eq!(root.children().len(), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_parent_links() {
        let mut tree = Tree::new();
        let a = tree.add_child(tree.root_id(), "A");
        let b = tree.add_child(a, "B");
        let c = tree.add_child(a, "C");

        let a_ref = tree.get(a);
        assert_eq!(a_ref.children().map(|n| n.node_type()).collect::<Vec<_>>(), ["B", "C"]);
        assert_eq!(tree.get(b).parent().unwrap().id(), a);
        assert_eq!(tree.get(c).parent().unwrap().parent().unwrap().id(), tree.root_id());
        assert_eq!(tree.get(c).depth(), 2);
        assert_eq!(a_ref.child(1).map(|n| n.id()), Some(c));
        assert!(a_ref.child(2).is_none());
    }

    #[test]
    fn test_node_name() {
        let mut tree = Tree::new();
        let id = tree.add_child(tree.root_id(), "Cube");
        tree.node_mut(id).name = Some(Name::new(NameScope::Local, Identifier::new("box")));
        let node = tree.get(id);
        assert_eq!(node.name(), "box");
        assert_eq!(node.scoped_name().unwrap().scope, NameScope::Local);
    }
}
