//! HTML parsing for thicket.
//!
//! # Scope
//!
//! Markup is parsed by html5ever through `scraper` and the resulting tree is
//! copied into a [`DomTree`], which backs thicket's reference adapter.
//!
//! - **Documents** ([WHATWG § 13.2](https://html.spec.whatwg.org/multipage/parsing.html))
//!   get the implied `html`, `head` and `body` elements.
//! - **Fragments** ([WHATWG § 13.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments))
//!   are parsed in a `body` context and, as in `scraper`, wrapped in a single
//!   `html` element below the root.
//!
//! The copy keeps elements, text, comments and processing instructions in
//! document order. Doctypes are dropped. The shape of the arena tree mirrors
//! the `scraper` tree node for node, so both thicket backends see the same
//! elements for the same markup.
//!
//! Parse errors are recoverable; each distinct message is logged once per
//! document by [`report_issues`] and returned with the tree.

use scraper::{Html, Node};
use thicket_common::warning::{clear_warnings, warn_once};
use thicket_dom::{DomTree, ElementData, NodeId, NodeType};

/// A parsed tree together with the parser's error messages.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// The converted tree.
    pub dom: DomTree,
    /// Recoverable parse errors, in the order the parser reported them.
    pub issues: Vec<String>,
}

/// Parse a complete HTML document.
#[must_use]
pub fn parse_document(markup: &str) -> DomTree {
    parse_with_issues(markup, false).dom
}

/// Parse an HTML fragment.
#[must_use]
pub fn parse_fragment(markup: &str) -> DomTree {
    parse_with_issues(markup, true).dom
}

/// Log the parse errors of one document, each distinct message once.
///
/// Deduplication restarts with every document, so an error that shows up
/// again in a later document is logged again.
pub fn report_issues(issues: &[String]) {
    clear_warnings();
    for issue in issues {
        let _ = warn_once("html", issue);
    }
}

/// Parse `markup` as a document or a fragment, keeping the parse errors.
#[must_use]
pub fn parse_with_issues(markup: &str, fragment: bool) -> ParseOutput {
    let html = if fragment {
        Html::parse_fragment(markup)
    } else {
        Html::parse_document(markup)
    };
    let issues: Vec<String> = html.errors.iter().map(ToString::to_string).collect();
    report_issues(&issues);
    let dom = from_html(&html);
    tracing::debug!(
        fragment,
        nodes = dom.len(),
        issues = issues.len(),
        "parsed html"
    );
    ParseOutput { dom, issues }
}

/// Copy a `scraper` tree into a new [`DomTree`].
///
/// The scraper root (document or fragment node) becomes [`NodeId::ROOT`].
#[must_use]
pub fn from_html(html: &Html) -> DomTree {
    let mut dom = DomTree::new();
    let root = html.tree.root();
    let mut stack: Vec<_> = root.children().rev().map(|child| (child, NodeId::ROOT)).collect();

    while let Some((node, parent)) = stack.pop() {
        let kind = match node.value() {
            Node::Element(element) => {
                NodeType::Element(ElementData::new(element.name(), element.attrs()))
            }
            Node::Text(text) => NodeType::Text(text.text.to_string()),
            Node::Comment(comment) => NodeType::Comment(comment.comment.to_string()),
            Node::ProcessingInstruction(instruction) => NodeType::ProcessingInstruction(
                instruction.target.to_string(),
                instruction.data.to_string(),
            ),
            // [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
            // The doctype carries nothing selectors can see.
            Node::Doctype(_) | Node::Document | Node::Fragment => continue,
        };
        let id = dom.alloc(kind);
        dom.append_child(parent, id);
        stack.extend(node.children().rev().map(|child| (child, id)));
    }
    dom
}
