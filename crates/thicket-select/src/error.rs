//! Errors raised while building or evaluating selectors.

use strum_macros::Display;
use thiserror::Error;

/// Result alias used throughout the selector engine.
pub type Result<T> = std::result::Result<T, SelectError>;

/// A backend feature the engine may need during a search.
///
/// Adapters advertise support by overriding the corresponding
/// [`Element`](crate::Element) method; the default implementations fail with
/// [`SelectError::Unsupported`] naming one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Capability {
    /// Navigating from an element to its parent.
    #[strum(serialize = "parent navigation")]
    Parent,
    /// Evaluating a CSS selector string natively.
    #[strum(serialize = "css query")]
    CssQuery,
    /// Evaluating an XPath expression natively.
    #[strum(serialize = "xpath query")]
    XPathQuery,
}

/// Every failure the selector engine can report.
///
/// Construction errors are returned by the `Selector` constructors, so an
/// invalid selector value never exists. The remaining variants surface while
/// searching and are propagated to the caller unchanged.
#[derive(Debug, Error)]
pub enum SelectError {
    /// A strict search matched nothing.
    #[error("no element matched selector {selector}")]
    NotFound {
        /// Display form of the selector that was searched.
        selector: String,
    },

    /// An `an+b` formula could not be parsed.
    #[error("invalid nth formula {input:?}: {reason}")]
    InvalidNth {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A regular expression failed to compile.
    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        /// The rejected pattern text.
        pattern: String,
        /// Compiler error from the `regex` crate.
        #[source]
        source: regex::Error,
    },

    /// A tag or attribute name was empty.
    #[error("{what} name must not be empty")]
    EmptyName {
        /// Which kind of name was empty.
        what: &'static str,
    },

    /// The same attribute was constrained twice in one compound selector.
    #[error("attribute {name:?} given more than once")]
    DuplicateAttribute {
        /// The repeated attribute name.
        name: String,
    },

    /// A logical selector was built with too few operands.
    #[error("{operator} needs at least {min} operands, got {got}")]
    TooFewOperands {
        /// Operator name.
        operator: &'static str,
        /// Minimum operand count.
        min: usize,
        /// Operand count that was supplied.
        got: usize,
    },

    /// A foreign query string was empty.
    #[error("query must not be empty")]
    EmptyQuery,

    /// The backend lacks a capability the search needed.
    #[error("{backend} backend does not support {capability}")]
    Unsupported {
        /// The missing capability.
        capability: Capability,
        /// Name of the backend adapter.
        backend: &'static str,
    },

    /// The backend rejected a foreign query string.
    #[error("invalid {language} query {query:?}: {reason}")]
    InvalidQuery {
        /// Query language name.
        language: String,
        /// The rejected query.
        query: String,
        /// Parser message.
        reason: String,
    },

    /// A search would have produced a node that is not an element.
    #[error("search produced a non-element node")]
    NonElement,

    /// Opaque failure reported by an adapter.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl SelectError {
    /// Shorthand for [`SelectError::Unsupported`].
    #[must_use]
    pub const fn unsupported(capability: Capability, backend: &'static str) -> Self {
        Self::Unsupported {
            capability,
            backend,
        }
    }

    /// Whether this error was raised while constructing a selector rather
    /// than while searching.
    #[must_use]
    pub const fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::InvalidNth { .. }
                | Self::InvalidPattern { .. }
                | Self::EmptyName { .. }
                | Self::DuplicateAttribute { .. }
                | Self::TooFewOperands { .. }
                | Self::EmptyQuery
        )
    }
}
