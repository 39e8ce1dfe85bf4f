//! An element handle over either backend.

use thicket_select::{DomElement, Element, HtmlElement, Node, QueryLanguage, Result};

/// Element of a [`Document`](crate::Document), whichever backend parsed it.
///
/// Handles from different backends never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyElement<'a> {
    /// Node of the arena DOM.
    Dom(DomElement<'a>),
    /// Node of a `scraper` tree.
    Html(HtmlElement<'a>),
}

impl<'a> From<DomElement<'a>> for AnyElement<'a> {
    fn from(element: DomElement<'a>) -> Self {
        Self::Dom(element)
    }
}

impl<'a> From<HtmlElement<'a>> for AnyElement<'a> {
    fn from(element: HtmlElement<'a>) -> Self {
        Self::Html(element)
    }
}

/// Convert a list of backend handles.
fn wrap<'a, E: Into<AnyElement<'a>>>(elements: Vec<E>) -> Vec<AnyElement<'a>> {
    elements.into_iter().map(Into::into).collect()
}

impl Node for AnyElement<'_> {
    fn tag(&self) -> Option<&str> {
        match self {
            Self::Dom(element) => element.tag(),
            Self::Html(element) => element.tag(),
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::Dom(element) => element.attribute(name),
            Self::Html(element) => element.attribute(name),
        }
    }

    fn attribute_names(&self) -> Vec<&str> {
        match self {
            Self::Dom(element) => element.attribute_names(),
            Self::Html(element) => element.attribute_names(),
        }
    }

    fn own_text(&self) -> Option<String> {
        match self {
            Self::Dom(element) => element.own_text(),
            Self::Html(element) => element.own_text(),
        }
    }

    fn text(&self) -> String {
        match self {
            Self::Dom(element) => element.text(),
            Self::Html(element) => element.text(),
        }
    }

    fn class_list(&self) -> Vec<&str> {
        match self {
            Self::Dom(element) => element.class_list(),
            Self::Html(element) => element.class_list(),
        }
    }
}

impl Element for AnyElement<'_> {
    const BACKEND: &'static str = "any";

    fn children(&self) -> Result<Vec<Self>> {
        Ok(match self {
            Self::Dom(element) => wrap(element.children()?),
            Self::Html(element) => wrap(element.children()?),
        })
    }

    fn parent(&self) -> Result<Option<Self>> {
        Ok(match self {
            Self::Dom(element) => element.parent()?.map(Self::Dom),
            Self::Html(element) => element.parent()?.map(Self::Html),
        })
    }

    fn next_siblings(&self) -> Result<Vec<Self>> {
        Ok(match self {
            Self::Dom(element) => wrap(element.next_siblings()?),
            Self::Html(element) => wrap(element.next_siblings()?),
        })
    }

    fn previous_siblings(&self) -> Result<Vec<Self>> {
        Ok(match self {
            Self::Dom(element) => wrap(element.previous_siblings()?),
            Self::Html(element) => wrap(element.previous_siblings()?),
        })
    }

    fn ancestors(&self) -> Result<Vec<Self>> {
        Ok(match self {
            Self::Dom(element) => wrap(element.ancestors()?),
            Self::Html(element) => wrap(element.ancestors()?),
        })
    }

    fn query(&self, language: QueryLanguage, query: &str) -> Result<Vec<Self>> {
        Ok(match self {
            Self::Dom(element) => wrap(element.query(language, query)?),
            Self::Html(element) => wrap(element.query(language, query)?),
        })
    }
}
