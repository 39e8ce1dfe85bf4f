//! Parsed documents.

use scraper::Html;
use thicket_dom::DomTree;
use thicket_select::{DomElement, HtmlElement};

use crate::config::{Backend, ParseConfig};
use crate::element::AnyElement;

/// Storage behind a [`Document`].
#[derive(Debug, Clone)]
enum Tree {
    Dom(DomTree),
    Html(Html),
}

/// Markup parsed into the tree representation chosen by [`ParseConfig`].
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree,
    issues: Vec<String>,
}

impl Document {
    /// Parse `markup` with `config`.
    ///
    /// HTML parsing never fails; recoverable errors are available from
    /// [`Document::issues`].
    #[must_use]
    pub fn parse(markup: &str, config: &ParseConfig) -> Self {
        let document = match config.backend {
            Backend::Dom => {
                let output = thicket_html::parse_with_issues(markup, config.fragment);
                Self {
                    tree: Tree::Dom(output.dom),
                    issues: output.issues,
                }
            }
            Backend::Html => {
                let html = if config.fragment {
                    Html::parse_fragment(markup)
                } else {
                    Html::parse_document(markup)
                };
                let issues: Vec<String> = html.errors.iter().map(ToString::to_string).collect();
                thicket_html::report_issues(&issues);
                Self {
                    tree: Tree::Html(html),
                    issues,
                }
            }
        };
        tracing::debug!(
            backend = %config.backend,
            fragment = config.fragment,
            issues = document.issues.len(),
            "parsed document"
        );
        document
    }

    /// The backend this document was parsed into.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        match self.tree {
            Tree::Dom(_) => Backend::Dom,
            Tree::Html(_) => Backend::Html,
        }
    }

    /// Handle to the document node, the usual search root.
    #[must_use]
    pub fn root(&self) -> AnyElement<'_> {
        match &self.tree {
            Tree::Dom(tree) => AnyElement::Dom(DomElement::document(tree)),
            Tree::Html(html) => AnyElement::Html(HtmlElement::document(html)),
        }
    }

    /// Recoverable parse errors, in the order the parser reported them.
    #[must_use]
    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    /// The arena tree, when parsed with [`Backend::Dom`].
    #[must_use]
    pub const fn dom(&self) -> Option<&DomTree> {
        match &self.tree {
            Tree::Dom(tree) => Some(tree),
            Tree::Html(_) => None,
        }
    }

    /// The `scraper` tree, when parsed with [`Backend::Html`].
    #[must_use]
    pub const fn html(&self) -> Option<&Html> {
        match &self.tree {
            Tree::Html(html) => Some(html),
            Tree::Dom(_) => None,
        }
    }
}
