//! Arena DOM for thicket's reference backend.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. A node
//! records its parent, its ordered children and its index among its
//! parent's children, which is enough for constant-time sibling steps.
//!
//! Ids are handed out in allocation order and never reused, so a `NodeId`
//! identifies the same node for the whole life of the tree. Nothing is ever
//! detached or removed; the tree only grows.
//!
//! Selectors see this tree through `thicket_select::DomElement`; markup is
//! turned into a `DomTree` by `thicket-html`.

/// Index of a node in a [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node, allocated by [`DomTree::new`].
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// One slot of the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// What the node holds.
    pub kind: NodeType,
    /// `None` for the document node and for allocated but unattached nodes.
    pub parent: Option<NodeId>,
    /// Children in tree order, including text and comments.
    pub children: Vec<NodeId>,
    /// Position in the parent's `children`.
    pub index: usize,
}

impl Node {
    const fn detached(kind: NodeType) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            index: 0,
        }
    }
}

/// The node kinds the tree stores.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
    /// [§ 4.13 Interface ProcessingInstruction](https://dom.spec.whatwg.org/#interface-processinginstruction)
    ///
    /// Target, then data.
    ProcessingInstruction(String, String),
}

/// Local name and attributes of an element. Namespaces are not tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Local name, as the parser produced it.
    pub tag_name: String,
    /// `(name, value)` pairs in source order, names unique.
    pub attributes: Vec<(String, String)>,
}

impl ElementData {
    /// Build element data from `(name, value)` pairs.
    ///
    /// A repeated attribute name keeps its first value, which is what the
    /// HTML tokenizer does with duplicates.
    pub fn new<'a>(tag_name: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut attributes: Vec<(String, String)> = Vec::new();
        for (name, value) in attrs {
            if attributes.iter().all(|(seen, _)| seen != name) {
                attributes.push((name.to_string(), value.to_string()));
            }
        }
        Self {
            tag_name: tag_name.to_string(),
            attributes,
        }
    }

    /// Value of attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute names in source order.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// [§ 3.2.6 The class attribute](https://html.spec.whatwg.org/multipage/dom.html#classes)
    ///
    /// Whitespace-separated tokens of `class`, first occurrences only.
    #[must_use]
    pub fn class_list(&self) -> Vec<&str> {
        let Some(value) = self.attribute("class") else {
            return Vec::new();
        };
        let mut tokens: Vec<&str> = Vec::new();
        for token in value.split_ascii_whitespace() {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }
}

/// A document tree backed by an arena.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// Slot 0 is the document node.
    nodes: Vec<Node>,
}

impl DomTree {
    /// A tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(NodeType::Document)],
        }
    }

    /// The node stored under `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of allocated nodes, the document node included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the document node exists from the start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Store a new, unattached node.
    pub fn alloc(&mut self, kind: NodeType) -> NodeId {
        self.nodes.push(Node::detached(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// [§ 4.2.3 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Attach `child` after the current last child of `parent`. `child` must
    /// be unattached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.nodes[parent.0].children.len();
        self.nodes[parent.0].children.push(child);
        let slot = &mut self.nodes[child.0];
        slot.parent = Some(parent);
        slot.index = index;
    }

    /// Allocate an element and append it to `parent`.
    pub fn append_element<'a>(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> NodeId {
        let id = self.alloc(NodeType::Element(ElementData::new(tag_name, attrs)));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeType::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Parent of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Children of `id` in tree order, all node kinds.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| &node.children)
    }

    /// The parent's children and the position of `id` among them.
    fn sibling_list(&self, id: NodeId) -> Option<(&[NodeId], usize)> {
        let node = self.get(id)?;
        Some((self.children(node.parent?), node.index))
    }

    /// Node right after `id` under the same parent.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (list, index) = self.sibling_list(id)?;
        list.get(index + 1).copied()
    }

    /// Node right before `id` under the same parent.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (list, index) = self.sibling_list(id)?;
        list.get(index.checked_sub(1)?).copied()
    }

    /// [§ 4.2 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Ancestors of `id`, parent first, ending at the document node.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Nodes after `id` under the same parent, nearest first.
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> Siblings<'_> {
        let rest = self
            .sibling_list(id)
            .map_or(&[][..], |(list, index)| &list[index + 1..]);
        Siblings {
            rest,
            forward: true,
        }
    }

    /// Nodes before `id` under the same parent, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> Siblings<'_> {
        let rest = self
            .sibling_list(id)
            .map_or(&[][..], |(list, index)| &list[..index]);
        Siblings {
            rest,
            forward: false,
        }
    }

    /// [§ 4.2 Tree order](https://dom.spec.whatwg.org/#concept-tree-order)
    ///
    /// Pre-order walk below `id`, not including `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            pending: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Element data of `id`, if it is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.get(id)?.kind {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Data of `id`, if it is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeType::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Direct text children of `id` joined together, or `None` when `id`
    /// has no text child.
    #[must_use]
    pub fn own_text(&self, id: NodeId) -> Option<String> {
        let mut joined: Option<String> = None;
        for &child in self.children(id) {
            if let Some(text) = self.as_text(child) {
                joined.get_or_insert_with(String::new).push_str(text);
            }
        }
        joined
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Every descendant text node of `id`, in tree order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut content = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.as_text(node) {
                content.push_str(text);
            }
        }
        content
    }

    /// [The document element](https://dom.spec.whatwg.org/#document-element):
    /// the first element child of the document node.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| self.as_element(id).is_some())
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`DomTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Iterator returned by [`DomTree::following_siblings`] and
/// [`DomTree::preceding_siblings`].
#[derive(Debug)]
pub struct Siblings<'a> {
    rest: &'a [NodeId],
    forward: bool,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let (&id, rest) = if self.forward {
            self.rest.split_first()?
        } else {
            self.rest.split_last()?
        };
        self.rest = rest;
        Some(id)
    }
}

/// Iterator returned by [`DomTree::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a DomTree,
    /// Nodes still to visit, next one on top.
    pending: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.pending.pop()?;
        self.pending
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
