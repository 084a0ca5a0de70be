//! Read-only document tree handed to the extractors
//!
//! Nodes live in a flat arena and refer to their children by index, so neither
//! building, walking nor dropping a tree recurses, however deep the markup is
//! nested.

/// Index of a node inside its [`DocumentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node represents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The root of every tree
    Document,

    /// An element with a lowercase tag name and its attributes in source order
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    children: Vec<NodeId>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Tag name for elements, `None` for the document root
    pub fn element_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Document => None,
        }
    }

    /// Attributes in source order; empty for the document root
    pub fn attrs(&self) -> &[(String, String)] {
        match &self.kind {
            NodeKind::Element { attrs, .. } => attrs,
            NodeKind::Document => &[],
        }
    }

    /// Values of every attribute named `key`
    ///
    /// Usually at most one, but malformed markup can repeat an attribute and
    /// each occurrence is reported.
    pub fn attr_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attrs()
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A parsed page: element names, attributes and ordered children
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    /// Creates a tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends an element as the last child of `parent`
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn append_element<N, K, V>(
        &mut self,
        parent: NodeId,
        name: N,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) -> NodeId
    where
        N: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Element {
                name: name.into(),
                attrs: attrs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            },
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes including the document root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Depth-first, pre-order walk over every node, starting at the root
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// Pre-order walk restricted to elements
    pub fn elements(&self) -> impl Iterator<Item = &Node> + '_ {
        self.pre_order()
            .filter(|node| node.element_name().is_some())
    }
}

/// Iterator returned by [`DocumentTree::pre_order`]
///
/// Uses an explicit stack; children are pushed in reverse so they are
/// visited in document order.
pub struct PreOrder<'a> {
    tree: &'a DocumentTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}
