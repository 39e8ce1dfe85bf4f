//! Backend adapters implementing [`Element`](crate::Element).
//!
//! - [`DomElement`] wraps the arena tree from `thicket-dom`.
//! - [`HtmlElement`] wraps a `scraper` parse tree.

mod dom;
mod html;

pub use dom::DomElement;
pub use html::HtmlElement;
