//! Selector values and the search protocol.
//!
//! A [`Selector`] is an immutable description of which elements to pick.
//! It holds no reference to any tree, so one value can be reused across
//! documents and backends. Searching is generic over [`Element`]:
//!
//! - [`Selector::find_all`] returns every match in document order, without
//!   duplicates, never failing merely because nothing matched.
//! - [`Selector::find`] returns the first match, or `None` (or
//!   [`SelectError::NotFound`] in strict mode).
//! - [`Selector::matches`] tests a single element.
//!
//! # Scope
//!
//! Most selectors are *scope-independent*: whether an element matches does
//! not depend on where the search started, so a search is a single scan of
//! the candidates with the element predicate. Foreign queries, relational
//! combinators and relative selectors are *scope-dependent*: their results
//! are computed from the search root, and their element predicate is
//! answered by searching from the element's document root.

mod combinator;
mod logical;
mod nth;
mod ops;
mod simple;

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, trace};

use crate::element::{Element, QueryLanguage};
use crate::error::{Result, SelectError};

pub use combinator::Relation;
pub use nth::AnPlusB;
pub use simple::{AttributeSelector, Pattern, TextMatcher};

use nth::{Nth, Siblings};
use simple::Predicate;

/// Options accepted by [`Selector::find_all_with`] and [`Selector::find_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Search the whole subtree (`true`) or only the root's children.
    pub recursive: bool,
    /// Stop once this many results have been collected.
    pub limit: Option<usize>,
    /// Make `find` fail with [`SelectError::NotFound`] instead of returning
    /// `None`.
    pub strict: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            limit: None,
            strict: false,
        }
    }
}

impl SearchOptions {
    /// Set [`SearchOptions::recursive`].
    #[must_use]
    pub const fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set [`SearchOptions::limit`].
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set [`SearchOptions::strict`].
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The same options without a limit, for intermediate evaluation.
    const fn unlimited(mut self) -> Self {
        self.limit = None;
        self
    }

    fn is_full(&self, found: usize) -> bool {
        self.limit.is_some_and(|limit| found >= limit)
    }
}

/// The selector kinds. Constructors keep values normalized so structural
/// equality is meaningful.
#[derive(Debug, Clone)]
pub(crate) enum Kind {
    Universal,
    /// Lowercased tag name.
    Type(String),
    Attribute(AttributeSelector),
    Class(TextMatcher),
    Text(TextMatcher),
    Expression(Predicate),
    Query(QueryLanguage, String),
    /// Flattened, at least two operands.
    And(Vec<Selector>),
    /// Flattened, at least two operands.
    Or(Vec<Selector>),
    /// Exactly one operand matches; at least two operands, never flattened.
    Xor(Vec<Selector>),
    /// Never directly nested.
    Not(Box<Selector>),
    /// At least two steps.
    Combinator(Relation, Vec<Selector>),
    Relative(Relation, Box<Selector>),
    Has(Box<Selector>),
    Nth(Nth),
    Only(Siblings),
    Empty,
}

/// An immutable, reusable element selector.
///
/// Build selectors with the constructors on this type, the operator sugar
/// (`&`, `|`, `^`, `!`, `>>`, `<<`, `+`, `*`) or [`crate::css::parse`].
/// Equality is structural: equal selectors return the same elements for
/// every document.
#[derive(Debug, Clone)]
pub struct Selector(pub(crate) Kind);

impl Selector {
    /// Every match under `root`, recursively, in document order.
    ///
    /// # Errors
    ///
    /// Propagates backend failures and [`SelectError::Unsupported`] when the
    /// selector needs a capability the backend lacks.
    pub fn find_all<E: Element>(&self, root: &E) -> Result<Vec<E>> {
        self.find_all_with(root, SearchOptions::default())
    }

    /// Every match under `root` honoring `options.recursive` and
    /// `options.limit`. `options.strict` does not apply to `find_all`.
    ///
    /// # Errors
    ///
    /// See [`Selector::find_all`].
    pub fn find_all_with<E: Element>(&self, root: &E, options: SearchOptions) -> Result<Vec<E>> {
        let found = self.search(root, options)?;
        debug!(
            selector = %self,
            backend = E::BACKEND,
            recursive = options.recursive,
            limit = ?options.limit,
            found = found.len(),
            "find_all"
        );
        Ok(found)
    }

    /// The first match under `root`, or `None`.
    ///
    /// # Errors
    ///
    /// See [`Selector::find_all`].
    pub fn find<E: Element>(&self, root: &E) -> Result<Option<E>> {
        self.find_with(root, SearchOptions::default())
    }

    /// The first match under `root`. With `options.strict`, finding nothing is
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::NotFound`] in strict mode when nothing matches,
    /// and otherwise see [`Selector::find_all`].
    pub fn find_with<E: Element>(&self, root: &E, options: SearchOptions) -> Result<Option<E>> {
        let first = self
            .search(root, SearchOptions {
                limit: Some(1),
                ..options
            })?
            .into_iter()
            .next();
        if first.is_none() && options.strict {
            debug!(selector = %self, backend = E::BACKEND, "strict find matched nothing");
            return Err(self.not_found());
        }
        Ok(first)
    }

    /// The first match under `root`, failing when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::NotFound`] when nothing matches.
    pub fn find_strict<E: Element>(&self, root: &E) -> Result<E> {
        self.find_with(root, SearchOptions::default().strict(true))?
            .ok_or_else(|| self.not_found())
    }

    /// Whether `element` matches this selector. Non-element nodes never match.
    ///
    /// Scope-dependent selectors are answered relative to the element's
    /// document root, which needs parent navigation.
    ///
    /// # Errors
    ///
    /// See [`Selector::find_all`].
    pub fn matches<E: Element>(&self, element: &E) -> Result<bool> {
        self.matches_element(element)
    }

    fn not_found(&self) -> SelectError {
        SelectError::NotFound {
            selector: self.to_string(),
        }
    }

    /// Whether this selector's results are "candidates filtered by the
    /// element predicate" for every search root.
    pub(crate) fn is_local(&self) -> bool {
        match &self.0 {
            Kind::Query(..) | Kind::Combinator(..) | Kind::Relative(..) => false,
            Kind::And(operands) | Kind::Or(operands) | Kind::Xor(operands) => {
                operands.iter().all(Self::is_local)
            }
            Kind::Not(inner) => inner.is_local(),
            Kind::Universal
            | Kind::Type(_)
            | Kind::Attribute(_)
            | Kind::Class(_)
            | Kind::Text(_)
            | Kind::Expression(_)
            | Kind::Has(_)
            | Kind::Nth(_)
            | Kind::Only(_)
            | Kind::Empty => true,
        }
    }

    /// Evaluate under `root` without logging.
    pub(crate) fn search<E: Element>(&self, root: &E, options: SearchOptions) -> Result<Vec<E>> {
        if options.limit == Some(0) {
            return Ok(Vec::new());
        }
        match &self.0 {
            Kind::Query(language, query) => search_query(root, *language, query, options),
            Kind::Combinator(relation, steps) => combinator::search(*relation, steps, root, options),
            Kind::Relative(relation, step) => {
                let mut found = combinator::project(root, *relation, step)?;
                if let Some(limit) = options.limit {
                    found.truncate(limit);
                }
                Ok(found)
            }
            Kind::Not(inner) if !inner.is_local() => logical::search_not(inner, root, options),
            Kind::And(_) | Kind::Or(_) | Kind::Xor(_) if !self.is_local() => {
                logical::search_mixed(self, root, options)
            }
            _ => scan(root, options, |element| self.matches_element(element)),
        }
    }

    /// Element predicate. Only elements match.
    pub(crate) fn matches_element<E: Element>(&self, element: &E) -> Result<bool> {
        if !element.is_element() {
            return Ok(false);
        }
        Ok(match &self.0 {
            Kind::Universal => true,
            Kind::Type(name) => element
                .tag()
                .is_some_and(|tag| tag.eq_ignore_ascii_case(name)),
            Kind::Attribute(attribute) => attribute.matches(element),
            Kind::Class(matcher) => simple::class_matches(matcher, element),
            Kind::Text(matcher) => simple::text_matches(matcher, element),
            Kind::Expression(predicate) => predicate.call(element),
            Kind::And(operands) => logical::all_match(operands, element)?,
            Kind::Or(operands) => logical::any_match(operands, element)?,
            Kind::Xor(operands) => logical::one_matches(operands, element)?,
            Kind::Not(inner) => !inner.matches_element(element)?,
            Kind::Has(inner) => {
                let options = SearchOptions::default().limit(1);
                !inner.search(element, options)?.is_empty()
            }
            Kind::Nth(nth) => nth::nth_matches(nth, element)?,
            Kind::Only(of) => nth::only_matches(of, element)?,
            Kind::Empty => nth::empty_matches(element)?,
            Kind::Combinator(relation, steps) => {
                combinator::matches(self, *relation, steps, element)?
            }
            Kind::Query(..) | Kind::Relative(..) => self.matches_in_document(element)?,
        })
    }

    /// Membership in the results of a recursive search from the element's
    /// document root.
    pub(crate) fn matches_in_document<E: Element>(&self, element: &E) -> Result<bool> {
        let root = document_root(element)?;
        trace!(selector = %self, "matching from the document root");
        Ok(self
            .search(&root, SearchOptions::default())?
            .contains(element))
    }
}

/// The topmost ancestor of `element`, or the element itself when detached.
pub(crate) fn document_root<E: Element>(element: &E) -> Result<E> {
    Ok(element
        .ancestors()?
        .pop()
        .unwrap_or_else(|| element.clone()))
}

/// Single linear scan applying `predicate`, stopping at the limit.
pub(crate) fn scan<E, F>(root: &E, options: SearchOptions, mut predicate: F) -> Result<Vec<E>>
where
    E: Element,
    F: FnMut(&E) -> Result<bool>,
{
    let mut found = Vec::new();
    let mut visit = |candidate: E| -> Result<bool> {
        if predicate(&candidate)? {
            found.push(candidate);
        }
        Ok(options.is_full(found.len()))
    };
    if options.recursive {
        for candidate in root.descendants() {
            if visit(candidate?)? {
                break;
            }
        }
    } else {
        for candidate in root.children()? {
            if visit(candidate)? {
                break;
            }
        }
    }
    Ok(found)
}

/// Emit the members of `set` in document order by walking `root` once.
pub(crate) fn in_document_order<E: Element>(
    root: &E,
    set: &HashSet<E>,
    options: SearchOptions,
) -> Result<Vec<E>> {
    if set.is_empty() {
        return Ok(Vec::new());
    }
    let wanted = options.limit.map_or(set.len(), |limit| limit.min(set.len()));
    scan(root, options.limit(wanted), |candidate| {
        Ok(set.contains(candidate))
    })
}

/// Delegate to the backend's native query engine.
fn search_query<E: Element>(
    root: &E,
    language: QueryLanguage,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<E>> {
    let mut found = root.query(language, query)?;
    if found.iter().any(|element| !element.is_element()) {
        return Err(SelectError::NonElement);
    }
    if !options.recursive {
        let children: HashSet<E> = root.children()?.into_iter().collect();
        found.retain(|element| children.contains(element));
    }
    if let Some(limit) = options.limit {
        found.truncate(limit);
    }
    Ok(found)
}

/// Multiset comparison of operand lists.
fn same_operands(left: &[Selector], right: &[Selector]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut used = vec![false; right.len()];
    left.iter().all(|operand| {
        let slot = right
            .iter()
            .enumerate()
            .position(|(i, other)| !used[i] && operand == other);
        slot.is_some_and(|i| {
            used[i] = true;
            true
        })
    })
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Kind::Universal, Kind::Universal) | (Kind::Empty, Kind::Empty) => true,
            (Kind::Type(a), Kind::Type(b)) => a == b,
            (Kind::Attribute(a), Kind::Attribute(b)) => a == b,
            (Kind::Class(a), Kind::Class(b)) | (Kind::Text(a), Kind::Text(b)) => a == b,
            (Kind::Expression(a), Kind::Expression(b)) => a == b,
            (Kind::Query(la, qa), Kind::Query(lb, qb)) => la == lb && qa == qb,
            (Kind::And(a), Kind::And(b))
            | (Kind::Or(a), Kind::Or(b))
            | (Kind::Xor(a), Kind::Xor(b)) => same_operands(a, b),
            (Kind::Not(a), Kind::Not(b)) | (Kind::Has(a), Kind::Has(b)) => a == b,
            (Kind::Combinator(ra, a), Kind::Combinator(rb, b)) => ra == rb && a == b,
            (Kind::Relative(ra, a), Kind::Relative(rb, b)) => ra == rb && a == b,
            (Kind::Nth(a), Kind::Nth(b)) => a == b,
            (Kind::Only(a), Kind::Only(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Selector {}

impl Selector {
    /// Operands that need `:is()` around them to read unambiguously inside a
    /// compound.
    fn needs_grouping(&self) -> bool {
        matches!(
            self.0,
            Kind::Or(_) | Kind::Combinator(..) | Kind::Relative(..)
        )
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, operands: &[Selector]) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{operand}")?;
    }
    Ok(())
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Kind::Universal => f.write_str("*"),
            Kind::Type(name) => f.write_str(name),
            Kind::Attribute(attribute) => write!(f, "{attribute}"),
            Kind::Class(TextMatcher::Exact(name)) => write!(f, ".{name}"),
            Kind::Class(matcher) => write!(f, "[class{matcher}]"),
            Kind::Text(matcher) => write!(f, ":text({matcher})"),
            Kind::Expression(_) => f.write_str(":expression"),
            Kind::Query(language, query) => write!(f, ":{language}({query:?})"),
            Kind::And(operands) => {
                for operand in operands {
                    if operand.needs_grouping() {
                        write!(f, ":is({operand})")?;
                    } else {
                        write!(f, "{operand}")?;
                    }
                }
                Ok(())
            }
            Kind::Or(operands) => {
                f.write_str(":is(")?;
                write_list(f, operands)?;
                f.write_str(")")
            }
            Kind::Xor(operands) => {
                f.write_str(":one-of(")?;
                write_list(f, operands)?;
                f.write_str(")")
            }
            Kind::Not(inner) => write!(f, ":not({inner})"),
            Kind::Combinator(relation, steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        f.write_str(&relation.separator())?;
                    }
                    write!(f, "{step}")?;
                }
                Ok(())
            }
            Kind::Relative(relation, step) => write!(f, ":scope{}{step}", relation.separator()),
            Kind::Has(inner) => match &inner.0 {
                Kind::Relative(relation, step) => {
                    write!(f, ":has({}{step})", relation.separator().trim_start())
                }
                _ => write!(f, ":has({inner})"),
            },
            Kind::Nth(nth) => write!(f, "{nth}"),
            Kind::Only(Siblings::All) => f.write_str(":only-child"),
            Kind::Only(Siblings::SameType) => f.write_str(":only-of-type"),
            Kind::Only(Siblings::Matching(selector)) => write!(f, ":only-of({selector})"),
            Kind::Empty => f.write_str(":empty"),
        }
    }
}
