//! Reference adapter over the arena [`DomTree`].

use std::fmt;
use std::hash::{Hash, Hasher};

use thicket_dom::{DomTree, ElementData, NodeId};

use crate::css;
use crate::element::{Element, Node, QueryLanguage};
use crate::error::{Result, SelectError};

/// Handle to one node of a [`DomTree`].
///
/// Identity is the pair (tree, node id), so handles from two different
/// trees never compare equal even when their ids coincide.
#[derive(Clone, Copy)]
pub struct DomElement<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> DomElement<'a> {
    /// Handle to node `id` of `tree`.
    #[must_use]
    pub const fn new(tree: &'a DomTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Handle to the document node of `tree`.
    #[must_use]
    pub const fn document(tree: &'a DomTree) -> Self {
        Self::new(tree, NodeId::ROOT)
    }

    /// The node id this handle points at.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this handle borrows from.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }

    fn elements(&self, ids: impl Iterator<Item = NodeId>) -> Vec<Self> {
        ids.filter(|&id| self.tree.as_element(id).is_some())
            .map(|id| Self::new(self.tree, id))
            .collect()
    }
}

impl PartialEq for DomElement<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for DomElement<'_> {}

impl Hash for DomElement<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.id.hash(state);
    }
}

impl fmt::Debug for DomElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.as_element(self.id) {
            Some(data) => f
                .debug_struct("DomElement")
                .field("tag", &data.tag_name)
                .field("id", &self.id.0)
                .finish(),
            None => write!(f, "DomElement(#{})", self.id.0),
        }
    }
}

impl Node for DomElement<'_> {
    fn tag(&self) -> Option<&str> {
        self.tree
            .as_element(self.id)
            .map(|data| data.tag_name.as_str())
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.tree
            .as_element(self.id)
            .and_then(|data| data.attribute(name))
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.tree
            .as_element(self.id)
            .map_or_else(Vec::new, ElementData::attribute_names)
    }

    fn own_text(&self) -> Option<String> {
        self.tree.own_text(self.id)
    }

    fn text(&self) -> String {
        self.tree.text_content(self.id)
    }

    fn class_list(&self) -> Vec<&str> {
        self.tree
            .as_element(self.id)
            .map_or_else(Vec::new, ElementData::class_list)
    }
}

impl Element for DomElement<'_> {
    const BACKEND: &'static str = "dom";

    fn children(&self) -> Result<Vec<Self>> {
        Ok(self.elements(self.tree.children(self.id).iter().copied()))
    }

    fn parent(&self) -> Result<Option<Self>> {
        Ok(self.tree.parent(self.id).map(|id| Self::new(self.tree, id)))
    }

    fn next_siblings(&self) -> Result<Vec<Self>> {
        Ok(self.elements(self.tree.following_siblings(self.id)))
    }

    fn previous_siblings(&self) -> Result<Vec<Self>> {
        Ok(self.elements(self.tree.preceding_siblings(self.id)))
    }

    fn ancestors(&self) -> Result<Vec<Self>> {
        Ok(self
            .tree
            .ancestors(self.id)
            .map(|id| Self::new(self.tree, id))
            .collect())
    }

    /// CSS queries are translated into the selector algebra and matched
    /// against every descendant, with combinators resolved against the whole
    /// document as a browser would.
    fn query(&self, language: QueryLanguage, query: &str) -> Result<Vec<Self>> {
        if language != QueryLanguage::Css {
            return Err(SelectError::unsupported(language.capability(), Self::BACKEND));
        }
        let selector = css::parse(query)?;
        let mut matched = Vec::new();
        for candidate in self.descendants() {
            let candidate = candidate?;
            if selector.matches(&candidate)? {
                matched.push(candidate);
            }
        }
        tracing::trace!(query, %selector, matched = matched.len(), "translated css query");
        Ok(matched)
    }
}
