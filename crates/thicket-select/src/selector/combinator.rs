//! [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
//!
//! Relational combinators, relative selectors and the has-descendant test.
//!
//! A combinator `[s0, s1, ..., sn]` is evaluated in two phases: `s0` is
//! searched under the root to obtain anchors, then each anchor is projected
//! along the relation and filtered by the next step. The projected elements
//! are deduplicated and become the anchors of the following step. Results
//! are finally emitted in document order by walking the search root once.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;

use tracing::trace;

use super::{document_root, in_document_order, Kind, SearchOptions, Selector};
use crate::element::Element;
use crate::error::{Result, SelectError};

/// How each step of a combinator relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an
    /// arbitrary descendant of some ancestor element A."
    Descendant,
    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is a
    /// direct child of element A."
    Child,
    /// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// "A selector of the form 'A + B' represents an element B that
    /// immediately follows element A, where A and B share the same parent."
    NextSibling,
    /// [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// "A selector of the form 'A ~ B' represents an element B that follows
    /// element A (not necessarily immediately)."
    SubsequentSibling,
    /// The reverse of [`Relation::Descendant`]: ancestors of the previous
    /// step, at most `max_distance` levels up.
    Ancestor {
        /// How many levels to climb; `None` climbs to the document.
        max_distance: Option<NonZeroUsize>,
    },
}

impl Relation {
    /// The direct parent, i.e. an ancestor at distance one.
    pub const PARENT: Self = Self::Ancestor {
        max_distance: Some(NonZeroUsize::MIN),
    };

    /// Any ancestor.
    pub const ANCESTOR: Self = Self::Ancestor { max_distance: None };

    /// Whether this relation climbs towards the root.
    #[must_use]
    pub const fn is_ancestor(self) -> bool {
        matches!(self, Self::Ancestor { .. })
    }

    /// Text placed between two steps when a selector is displayed.
    pub(crate) fn separator(self) -> String {
        match self {
            Self::Descendant => " ".to_string(),
            Self::Child => " > ".to_string(),
            Self::NextSibling => " + ".to_string(),
            Self::SubsequentSibling => " ~ ".to_string(),
            Self::Ancestor { max_distance: None } => " << ".to_string(),
            Self::Ancestor {
                max_distance: Some(distance),
            } if distance.get() == 1 => " < ".to_string(),
            Self::Ancestor {
                max_distance: Some(distance),
            } => format!(" <{distance} "),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descendant => f.write_str("descendant"),
            Self::Child => f.write_str("child"),
            Self::NextSibling => f.write_str("next-sibling"),
            Self::SubsequentSibling => f.write_str("subsequent-sibling"),
            Self::Ancestor { max_distance: None } => f.write_str("ancestor"),
            Self::Ancestor {
                max_distance: Some(distance),
            } => write!(f, "ancestor-within-{distance}"),
        }
    }
}

impl Selector {
    /// Chain `steps` with `relation`. The result matches elements reached
    /// from the first step through every following step.
    ///
    /// A first step that is itself a combinator over the same relation is
    /// spliced in, so `(a >> b) >> c` equals the three-step chain.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::TooFewOperands`] for fewer than two steps.
    pub fn combine<I>(relation: Relation, steps: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let steps: Vec<Self> = steps.into_iter().collect();
        if steps.len() < 2 {
            return Err(SelectError::TooFewOperands {
                operator: "combinator",
                min: 2,
                got: steps.len(),
            });
        }
        Ok(Self::chain(relation, steps))
    }

    fn chain(relation: Relation, steps: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(steps.len());
        for (i, step) in steps.into_iter().enumerate() {
            match step.0 {
                Kind::Combinator(inner, inner_steps) if i == 0 && inner == relation => {
                    flat.extend(inner_steps);
                }
                kind => flat.push(Self(kind)),
            }
        }
        Self(Kind::Combinator(relation, flat))
    }

    /// `a b`: elements matching `descendant` inside elements matching
    /// `ancestor`. Also available as `ancestor >> descendant`.
    #[must_use]
    pub fn descendant(ancestor: Self, descendant: Self) -> Self {
        Self::chain(Relation::Descendant, vec![ancestor, descendant])
    }

    /// `a > b`: elements matching `child` whose parent matches `parent`.
    #[must_use]
    pub fn child(parent: Self, child: Self) -> Self {
        Self::chain(Relation::Child, vec![parent, child])
    }

    /// `a + b`: elements matching `next` immediately after an element
    /// matching `previous`. Also available as `previous + next`.
    #[must_use]
    pub fn next_sibling(previous: Self, next: Self) -> Self {
        Self::chain(Relation::NextSibling, vec![previous, next])
    }

    /// `a ~ b`: elements matching `later` anywhere after a sibling matching
    /// `earlier`. Also available as `earlier * later`.
    #[must_use]
    pub fn subsequent_sibling(earlier: Self, later: Self) -> Self {
        Self::chain(Relation::SubsequentSibling, vec![earlier, later])
    }

    /// Parents matching `parent` of elements matching `child`.
    #[must_use]
    pub fn parent(child: Self, parent: Self) -> Self {
        Self::chain(Relation::PARENT, vec![child, parent])
    }

    /// Ancestors matching `ancestor` of elements matching `descendant`.
    /// Also available as `descendant << ancestor`.
    #[must_use]
    pub fn ancestor(descendant: Self, ancestor: Self) -> Self {
        Self::chain(Relation::ANCESTOR, vec![descendant, ancestor])
    }

    /// Like [`Selector::ancestor`], climbing at most `max_distance` levels.
    #[must_use]
    pub fn ancestor_within(descendant: Self, ancestor: Self, max_distance: NonZeroUsize) -> Self {
        let relation = Relation::Ancestor {
            max_distance: Some(max_distance),
        };
        Self::chain(relation, vec![descendant, ancestor])
    }

    /// Elements related to the search root itself by `relation` and matching
    /// `step`: children, descendants, following siblings or ancestors of the
    /// root. Mostly useful inside [`Selector::has`], as in `:has(> img)`.
    ///
    /// The `recursive` search option does not apply.
    #[must_use]
    pub fn relative(relation: Relation, step: Self) -> Self {
        Self(Kind::Relative(relation, Box::new(step)))
    }

    /// [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
    ///
    /// Matches an element when `inner` finds at least one element searched
    /// from it. Unlike combinators this returns the anchor, not what `inner`
    /// found.
    #[must_use]
    pub fn has(inner: Self) -> Self {
        Self(Kind::Has(Box::new(inner)))
    }

    /// `:has(> inner)`: matches elements with a direct child matching
    /// `inner`.
    #[must_use]
    pub fn has_child(inner: Self) -> Self {
        Self::has(Self::relative(Relation::Child, inner))
    }
}

/// Evaluate a combinator under `root`.
pub(super) fn search<E: Element>(
    relation: Relation,
    steps: &[Selector],
    root: &E,
    options: SearchOptions,
) -> Result<Vec<E>> {
    let Some((first, rest)) = steps.split_first() else {
        return Ok(Vec::new());
    };
    // Anchors of an ancestor combinator may sit at any depth; what must be
    // in scope is the ancestor that is finally returned.
    let climbs = relation.is_ancestor();
    let first_options = options
        .unlimited()
        .recursive(climbs || options.recursive);
    let mut anchors = first.search(root, first_options)?;

    for step in rest {
        if anchors.is_empty() {
            break;
        }
        let mut seen: HashSet<E> = HashSet::new();
        let mut related = Vec::new();
        for anchor in &anchors {
            for element in project(anchor, relation, step)? {
                if seen.insert(element.clone()) {
                    related.push(element);
                }
            }
        }
        trace!(%relation, anchors = anchors.len(), related = related.len(), "combinator step");
        anchors = related;
    }

    let found: HashSet<E> = anchors.into_iter().collect();
    // `:has(+ a b)` reaches outside the root's subtree
    if leaves_subtree(first) {
        let top = document_root(root)?;
        return in_document_order(&top, &found, options.recursive(true));
    }
    let walk = options.recursive(!climbs || options.recursive);
    in_document_order(root, &found, walk)
}

/// Whether a first step starts from siblings or ancestors of the root.
fn leaves_subtree(first: &Selector) -> bool {
    matches!(
        first.0,
        Kind::Relative(
            Relation::NextSibling | Relation::SubsequentSibling | Relation::Ancestor { .. },
            _
        )
    )
}

/// Elements related to `anchor` by `relation` that `step` selects, in
/// document order.
///
/// A scope-dependent step is searched in the scope the relation implies:
/// the anchor itself for children and descendants, the anchor's parent for
/// siblings and the document root for ancestors.
pub(super) fn project<E: Element>(
    anchor: &E,
    relation: Relation,
    step: &Selector,
) -> Result<Vec<E>> {
    match relation {
        Relation::Child => step.search(anchor, SearchOptions::default().recursive(false)),
        Relation::Descendant => step.search(anchor, SearchOptions::default()),
        Relation::NextSibling | Relation::SubsequentSibling => {
            let mut siblings = anchor.next_siblings()?;
            if relation == Relation::NextSibling {
                siblings.truncate(1);
            }
            if siblings.is_empty() || step.is_local() {
                return select_from(siblings, step);
            }
            let Some(parent) = anchor.parent()? else {
                return Ok(Vec::new());
            };
            let scope = SearchOptions::default().recursive(false);
            let allowed: HashSet<E> = step.search(&parent, scope)?.into_iter().collect();
            siblings.retain(|sibling| allowed.contains(sibling));
            Ok(siblings)
        }
        Relation::Ancestor { max_distance } => {
            let mut ancestors: Vec<E> = anchor
                .ancestors()?
                .into_iter()
                .filter(|ancestor| ancestor.is_element())
                .collect();
            if let Some(distance) = max_distance {
                ancestors.truncate(distance.get());
            }
            ancestors.reverse();
            if ancestors.is_empty() || step.is_local() {
                return select_from(ancestors, step);
            }
            let top = document_root(anchor)?;
            let allowed: HashSet<E> = step
                .search(&top, SearchOptions::default())?
                .into_iter()
                .collect();
            ancestors.retain(|ancestor| allowed.contains(ancestor));
            Ok(ancestors)
        }
    }
}

fn select_from<E: Element>(elements: Vec<E>, step: &Selector) -> Result<Vec<E>> {
    let mut selected = Vec::with_capacity(elements.len());
    for element in elements {
        if step.matches_element(&element)? {
            selected.push(element);
        }
    }
    Ok(selected)
}

/// Element predicate for a combinator.
///
/// When every step after the first is scope-independent, the chain is
/// checked right to left from the element. Otherwise the combinator is
/// evaluated from the document root.
pub(super) fn matches<E: Element>(
    selector: &Selector,
    relation: Relation,
    steps: &[Selector],
    element: &E,
) -> Result<bool> {
    if steps.iter().skip(1).all(Selector::is_local) {
        chain_matches(relation, steps, element)
    } else {
        selector.matches_in_document(element)
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// The subject must match the last step; some element it can be reached
/// from must match the chain without it.
fn chain_matches<E: Element>(relation: Relation, steps: &[Selector], element: &E) -> Result<bool> {
    let Some((last, rest)) = steps.split_last() else {
        return Ok(true);
    };
    if !last.matches_element(element)? {
        return Ok(false);
    }
    if rest.is_empty() {
        return Ok(true);
    }
    for origin in origins(element, relation)? {
        if chain_matches(relation, rest, &origin)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Elements from which one `relation` step reaches `element`.
fn origins<E: Element>(element: &E, relation: Relation) -> Result<Vec<E>> {
    Ok(match relation {
        Relation::Child => element
            .parent()?
            .filter(|parent| parent.is_element())
            .into_iter()
            .collect(),
        Relation::Descendant => element
            .ancestors()?
            .into_iter()
            .filter(|ancestor| ancestor.is_element())
            .collect(),
        Relation::NextSibling => element.previous_siblings()?.into_iter().take(1).collect(),
        Relation::SubsequentSibling => element.previous_siblings()?,
        Relation::Ancestor { max_distance } => descendants_within(element, max_distance)?,
    })
}

fn descendants_within<E: Element>(
    element: &E,
    max_distance: Option<NonZeroUsize>,
) -> Result<Vec<E>> {
    let Some(max_distance) = max_distance else {
        return element.descendants().collect();
    };
    let mut found = Vec::new();
    let mut level = vec![element.clone()];
    for _ in 0..max_distance.get() {
        let mut next = Vec::new();
        for node in &level {
            next.extend(node.children()?);
        }
        if next.is_empty() {
            break;
        }
        found.extend(next.iter().cloned());
        level = next;
    }
    Ok(found)
}
