//! Adapter over [`scraper::Html`] parse trees.
//!
//! scraper stores an html5ever parse in an `ego_tree` arena. Handles borrow
//! the document and point at either the document node itself or one
//! element. CSS queries are evaluated by scraper's own selector engine.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use scraper::{ElementRef, Html};

use crate::element::{Element, Node, QueryLanguage};
use crate::error::{Result, SelectError};

/// Handle to the document node or an element of a [`Html`] tree.
#[derive(Clone, Copy)]
pub struct HtmlElement<'a> {
    html: &'a Html,
    element: Option<ElementRef<'a>>,
}

impl<'a> HtmlElement<'a> {
    /// Handle to the document node of `html`.
    #[must_use]
    pub const fn document(html: &'a Html) -> Self {
        Self {
            html,
            element: None,
        }
    }

    /// Handle to an element of `html`.
    #[must_use]
    pub const fn new(html: &'a Html, element: ElementRef<'a>) -> Self {
        Self {
            html,
            element: Some(element),
        }
    }

    /// The wrapped scraper element, or `None` for the document node.
    #[must_use]
    pub const fn element_ref(&self) -> Option<ElementRef<'a>> {
        self.element
    }

    /// The document this handle borrows from.
    #[must_use]
    pub const fn html(&self) -> &'a Html {
        self.html
    }

    fn wrap(&self, element: ElementRef<'a>) -> Self {
        Self::new(self.html, element)
    }
}

impl PartialEq for HtmlElement<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.html, other.html) && self.element == other.element
    }
}

impl Eq for HtmlElement<'_> {}

impl Hash for HtmlElement<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.html, state);
        self.element.map(|element| element.id()).hash(state);
    }
}

impl fmt::Debug for HtmlElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element {
            Some(element) => f
                .debug_struct("HtmlElement")
                .field("tag", &element.value().name())
                .field("node", &element.id())
                .finish(),
            None => f.write_str("HtmlElement(#document)"),
        }
    }
}

impl Node for HtmlElement<'_> {
    fn tag(&self) -> Option<&str> {
        self.element.map(|element| element.value().name())
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.element.and_then(|element| element.value().attr(name))
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.element.map_or_else(Vec::new, |element| {
            element.value().attrs().map(|(name, _)| name).collect()
        })
    }

    fn own_text(&self) -> Option<String> {
        let node = self
            .element
            .map_or_else(|| self.html.tree.root(), |element| *element);
        let mut joined: Option<String> = None;
        for text in node
            .children()
            .filter_map(|child| child.value().as_text().map(Deref::deref))
        {
            joined.get_or_insert_with(String::new).push_str(text);
        }
        joined
    }

    fn text(&self) -> String {
        let node = self
            .element
            .map_or_else(|| self.html.tree.root(), |element| *element);
        node.descendants()
            .filter_map(|child| child.value().as_text().map(Deref::deref))
            .collect()
    }
}

impl Element for HtmlElement<'_> {
    const BACKEND: &'static str = "html";

    fn children(&self) -> Result<Vec<Self>> {
        let node = self
            .element
            .map_or_else(|| self.html.tree.root(), |element| *element);
        Ok(node
            .children()
            .filter_map(ElementRef::wrap)
            .map(|child| self.wrap(child))
            .collect())
    }

    fn parent(&self) -> Result<Option<Self>> {
        let Some(element) = self.element else {
            return Ok(None);
        };
        // Anything above an element that is not an element is the document
        // (or fragment) node.
        Ok(element.parent().map(|parent| Self {
            html: self.html,
            element: ElementRef::wrap(parent),
        }))
    }

    fn next_siblings(&self) -> Result<Vec<Self>> {
        Ok(self.element.map_or_else(Vec::new, |element| {
            element
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .map(|sibling| self.wrap(sibling))
                .collect()
        }))
    }

    fn previous_siblings(&self) -> Result<Vec<Self>> {
        Ok(self.element.map_or_else(Vec::new, |element| {
            element
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .map(|sibling| self.wrap(sibling))
                .collect()
        }))
    }

    fn query(&self, language: QueryLanguage, query: &str) -> Result<Vec<Self>> {
        if language != QueryLanguage::Css {
            return Err(SelectError::unsupported(language.capability(), Self::BACKEND));
        }
        let selector =
            scraper::Selector::parse(query).map_err(|err| SelectError::InvalidQuery {
                language: language.to_string(),
                query: query.to_string(),
                reason: err.to_string(),
            })?;
        let matched: Vec<Self> = match self.element {
            Some(element) => element
                .select(&selector)
                .map(|found| self.wrap(found))
                .collect(),
            None => self
                .html
                .select(&selector)
                .map(|found| self.wrap(found))
                .collect(),
        };
        tracing::trace!(query, matched = matched.len(), "scraper css query");
        Ok(matched)
    }
}
