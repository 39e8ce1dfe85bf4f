//! Declarative element selection over parsed HTML.
//!
//! # Scope
//!
//! This crate ties the thicket components together:
//! - **Configuration** - [`ParseConfig`] picks the [`Backend`] explicitly
//! - **Documents** - [`Document::parse`] builds the chosen tree
//! - **Elements** - [`AnyElement`] searches either tree with the same
//!   [`Selector`] values
//!
//! # Example
//!
//! ```
//! use thicket::{Backend, Document, Node, ParseConfig, Selector};
//!
//! let markup = r#"<div><p class="x">1</p><p>2</p><p class="x">3</p></div>"#;
//! let selector = Selector::tag("p").unwrap() & Selector::class("x");
//!
//! for backend in [Backend::Dom, Backend::Html] {
//!     let config = ParseConfig::default().backend(backend).fragment(true);
//!     let document = Document::parse(markup, &config);
//!     let texts: Vec<String> = selector
//!         .find_all(&document.root())
//!         .unwrap()
//!         .iter()
//!         .map(|p| p.text())
//!         .collect();
//!     assert_eq!(texts, ["1", "3"]);
//! }
//! ```

pub mod config;
pub mod document;
pub mod element;

pub use config::{Backend, ConfigError, ParseConfig};
pub use document::Document;
pub use element::AnyElement;

pub use thicket_select as select;
pub use thicket_select::{Element, Node, Relation, SearchOptions, SelectError, Selector, TextMatcher};
