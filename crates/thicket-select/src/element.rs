//! The adapter contract between selectors and backend trees.
//!
//! Selectors never name a concrete tree type. Everything they need from a
//! backend is expressed by two traits:
//!
//! - [`Node`] is the object-safe read-only view used by predicates, including
//!   user-supplied expression selectors.
//! - [`Element`] adds identity and navigation, and is what searches are
//!   generic over.
//!
//! All navigation skips comments, text, doctypes and processing
//! instructions; only text accessors look at text nodes.

use std::fmt::Debug;
use std::hash::Hash;

use strum_macros::Display;

use crate::error::{Capability, Result, SelectError};

/// A foreign query language an adapter may evaluate natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryLanguage {
    /// [Selectors Level 4](https://www.w3.org/TR/selectors-4/) group of selectors.
    Css,
    /// [XPath 1.0](https://www.w3.org/TR/xpath-10/) expression.
    XPath,
}

impl QueryLanguage {
    /// The capability an adapter needs to evaluate this language.
    #[must_use]
    pub const fn capability(self) -> Capability {
        match self {
            Self::Css => Capability::CssQuery,
            Self::XPath => Capability::XPathQuery,
        }
    }
}

/// Read-only view of one node of a backend tree.
///
/// This trait is object safe so that predicates can be stored as
/// `dyn Fn(&dyn Node) -> bool`.
pub trait Node {
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    ///
    /// The element's local name, or `None` for the document node.
    fn tag(&self) -> Option<&str>;

    /// Value of the named attribute, if present.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Names of all attributes present on the element.
    fn attribute_names(&self) -> Vec<&str>;

    /// Concatenated data of the direct text children, or `None` when the node
    /// has no text child.
    fn own_text(&self) -> Option<String>;

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// "The descendant text content of a node node is the concatenation of the
    /// data of all the Text node descendants of node, in tree order."
    fn text(&self) -> String;

    /// Whether this node is an element (as opposed to a document node).
    fn is_element(&self) -> bool {
        self.tag().is_some()
    }

    /// Class tokens in attribute order, without duplicates.
    fn class_list(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = Vec::new();
        if let Some(value) = self.attribute("class") {
            for token in value.split_ascii_whitespace() {
                if !tokens.contains(&token) {
                    tokens.push(token);
                }
            }
        }
        tokens
    }
}

/// Handle to a node inside a backend tree, with identity and navigation.
///
/// Two handles to the same backend node must compare equal and hash
/// identically for as long as the tree is borrowed. Every accessor may fail
/// with a backend error; the engine propagates such errors unchanged and
/// never retries.
pub trait Element: Node + Clone + Eq + Hash + Debug {
    /// Name of the backend, used in error messages and logs.
    const BACKEND: &'static str;

    /// Element children in document order.
    fn children(&self) -> Result<Vec<Self>>;

    /// The parent node, which may be the (non-element) document node.
    ///
    /// Backends without parent pointers keep the default, which reports
    /// [`Capability::Parent`] as unsupported.
    fn parent(&self) -> Result<Option<Self>> {
        Err(SelectError::unsupported(Capability::Parent, Self::BACKEND))
    }

    /// [§ 4.2 Tree order](https://dom.spec.whatwg.org/#concept-tree-order)
    ///
    /// Lazy pre-order walk over descendant elements, excluding `self`.
    /// Children are fetched one node at a time, so stopping early avoids
    /// backend work for the rest of the subtree.
    fn descendants(&self) -> Descendants<Self> {
        Descendants::new(self.clone())
    }

    /// Element siblings after this one, nearest first.
    fn next_siblings(&self) -> Result<Vec<Self>> {
        let Some(parent) = self.parent()? else {
            return Ok(Vec::new());
        };
        Ok(parent
            .children()?
            .into_iter()
            .skip_while(|sibling| sibling != self)
            .skip(1)
            .collect())
    }

    /// Element siblings before this one, nearest first.
    fn previous_siblings(&self) -> Result<Vec<Self>> {
        let Some(parent) = self.parent()? else {
            return Ok(Vec::new());
        };
        let mut siblings: Vec<Self> = parent
            .children()?
            .into_iter()
            .take_while(|sibling| sibling != self)
            .collect();
        siblings.reverse();
        Ok(siblings)
    }

    /// [§ 4.2 Ancestor](https://dom.spec.whatwg.org/#concept-tree-ancestor)
    ///
    /// Ancestors nearest first. The last entry is the document node when the
    /// element is attached to one.
    fn ancestors(&self) -> Result<Vec<Self>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent()?;
        while let Some(node) = current {
            current = node.parent()?;
            ancestors.push(node);
        }
        Ok(ancestors)
    }

    /// Evaluate a foreign query inside this node's subtree.
    ///
    /// Results are elements in document order. The default reports the
    /// language as unsupported; there is no fallback translation.
    fn query(&self, language: QueryLanguage, _query: &str) -> Result<Vec<Self>> {
        Err(SelectError::unsupported(language.capability(), Self::BACKEND))
    }
}

/// Iterator returned by [`Element::descendants`].
#[derive(Debug)]
pub struct Descendants<E> {
    root: Option<E>,
    stack: Vec<E>,
}

impl<E: Element> Descendants<E> {
    fn new(root: E) -> Self {
        Self {
            root: Some(root),
            stack: Vec::new(),
        }
    }

    fn push_children(&mut self, node: &E) -> Result<()> {
        let children = node.children()?;
        self.stack.extend(children.into_iter().rev());
        Ok(())
    }
}

impl<E: Element> Iterator for Descendants<E> {
    type Item = Result<E>;

    fn next(&mut self) -> Option<Self::Item> {
        let expanded = self.root.take().map(|root| self.push_children(&root));
        if let Some(Err(err)) = expanded {
            return Some(Err(err));
        }
        let node = self.stack.pop()?;
        if let Err(err) = self.push_children(&node) {
            self.stack.clear();
            return Some(Err(err));
        }
        Some(Ok(node))
    }
}
