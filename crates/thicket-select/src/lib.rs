//! Backend-agnostic element selection for thicket.
//!
//! This crate provides the selector algebra and the search engine:
//!
//! - **Selectors** - immutable [`Selector`] values built from primitives
//!   (tag, attribute, class, text, predicates, foreign queries), logical
//!   combinations, relational combinators and positional matchers
//! - **Search** - [`Selector::find_all`], [`Selector::find`] and
//!   [`Selector::matches`], generic over any tree implementing [`Element`]
//! - **Adapters** - [`DomElement`] over the arena DOM and [`HtmlElement`]
//!   over a parsed `scraper` document
//! - **CSS** - [`css::parse`] translates selector text into the algebra
//!
//! # Example
//!
//! ```
//! use thicket_dom::{DomTree, NodeId};
//! use thicket_select::{DomElement, Selector};
//!
//! let mut tree = DomTree::new();
//! let div = tree.append_element(NodeId::ROOT, "div", []);
//! let _ = tree.append_element(div, "p", [("class", "x")]);
//! let _ = tree.append_element(div, "p", []);
//!
//! let selector = Selector::tag("p").unwrap() & Selector::class("x");
//! let found = selector.find_all(&DomElement::document(&tree)).unwrap();
//! assert_eq!(found.len(), 1);
//! ```

pub mod adapters;
pub mod css;
pub mod element;
pub mod error;
pub mod selector;

pub use adapters::{DomElement, HtmlElement};
pub use element::{Element, Node, QueryLanguage};
pub use error::{Capability, Result, SelectError};
pub use selector::{
    AnPlusB, AttributeSelector, Pattern, Relation, SearchOptions, Selector, TextMatcher,
};
