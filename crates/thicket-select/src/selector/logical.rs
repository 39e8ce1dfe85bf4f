//! [§ 4 Logical combinations](https://www.w3.org/TR/selectors-4/#logical-combination)
//!
//! Conjunction, disjunction, exclusive disjunction and negation.
//!
//! Over scope-independent operands these are plain boolean combinations of
//! the element predicates. When an operand depends on the search root, the
//! operands' own result sets are combined instead, so `!(a >> b)` returns
//! what `a >> b` would not.

use std::collections::HashSet;

use super::{scan, Kind, SearchOptions, Selector};
use crate::element::Element;
use crate::error::{Result, SelectError};

impl Selector {
    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches) in compound
    /// form: elements matching every operand. Also available as `a & b`.
    ///
    /// Nested conjunctions are flattened. No operands gives
    /// [`Selector::universal`] and a single operand is returned unchanged.
    #[must_use]
    pub fn all_of<I>(operands: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut flat = Vec::new();
        for operand in operands {
            match operand.0 {
                Kind::And(inner) => flat.extend(inner),
                kind => flat.push(Self(kind)),
            }
        }
        match flat.len() {
            0 => Self::universal(),
            1 => flat.swap_remove(0),
            _ => Self(Kind::And(flat)),
        }
    }

    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches)
    ///
    /// "The matches-any pseudo-class, :is(), is a functional pseudo-class
    /// taking a selector list as its argument." Also available as `a | b`.
    ///
    /// Nested disjunctions are flattened and a single operand is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::TooFewOperands`] when `operands` is empty.
    pub fn any_of<I>(operands: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let operands: Vec<Self> = operands.into_iter().collect();
        if operands.is_empty() {
            return Err(SelectError::TooFewOperands {
                operator: "or",
                min: 1,
                got: 0,
            });
        }
        Ok(Self::union(operands))
    }

    pub(crate) fn union(operands: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(operands.len());
        for operand in operands {
            match operand.0 {
                Kind::Or(inner) => flat.extend(inner),
                kind => flat.push(Self(kind)),
            }
        }
        if flat.len() == 1 {
            flat.swap_remove(0)
        } else {
            Self(Kind::Or(flat))
        }
    }

    /// Elements matching exactly one operand.
    ///
    /// Operands are kept as given: `one_of([a, one_of([b, c])])` differs from
    /// `one_of([a, b, c])` when all three match. The binary `a ^ b` builds
    /// nested pairs, which compute parity.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::TooFewOperands`] for fewer than two operands.
    pub fn one_of<I>(operands: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let operands: Vec<Self> = operands.into_iter().collect();
        if operands.len() < 2 {
            return Err(SelectError::TooFewOperands {
                operator: "xor",
                min: 2,
                got: operands.len(),
            });
        }
        Ok(Self(Kind::Xor(operands)))
    }

    pub(crate) fn exclusive_pair(left: Self, right: Self) -> Self {
        Self(Kind::Xor(vec![left, right]))
    }

    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    ///
    /// "The negation pseudo-class, :not(), is a functional pseudo-class
    /// taking a selector list as an argument. It represents an element that
    /// is not represented by its argument." Also available as `!selector`.
    ///
    /// Negating a negation gives back the inner selector.
    #[must_use]
    pub fn not(inner: Self) -> Self {
        match inner.0 {
            Kind::Not(negated) => *negated,
            kind => Self(Kind::Not(Box::new(Self(kind)))),
        }
    }
}

pub(super) fn all_match<E: Element>(operands: &[Selector], element: &E) -> Result<bool> {
    for operand in operands {
        if !operand.matches_element(element)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub(super) fn any_match<E: Element>(operands: &[Selector], element: &E) -> Result<bool> {
    for operand in operands {
        if operand.matches_element(element)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(super) fn one_matches<E: Element>(operands: &[Selector], element: &E) -> Result<bool> {
    let mut hits = 0;
    for operand in operands {
        if operand.matches_element(element)? {
            hits += 1;
            if hits > 1 {
                return Ok(false);
            }
        }
    }
    Ok(hits == 1)
}

/// Candidates in scope that a scope-dependent `inner` does not return.
pub(super) fn search_not<E: Element>(
    inner: &Selector,
    root: &E,
    options: SearchOptions,
) -> Result<Vec<E>> {
    let excluded: HashSet<E> = inner
        .search(root, options.unlimited())?
        .into_iter()
        .collect();
    scan(root, options, |candidate| Ok(!excluded.contains(candidate)))
}

/// How the per-operand verdicts of a logical selector are combined.
#[derive(Clone, Copy)]
enum Rule {
    All,
    Any,
    ExactlyOne,
}

/// A logical selector with at least one scope-dependent operand.
///
/// Scope-dependent operands contribute their own result sets, searched with
/// the same scope. Scope-independent operands contribute the candidates in
/// scope that they match. The subtree is walked once to emit the combined
/// members in document order.
pub(super) fn search_mixed<E: Element>(
    selector: &Selector,
    root: &E,
    options: SearchOptions,
) -> Result<Vec<E>> {
    let (rule, operands) = match &selector.0 {
        Kind::And(operands) => (Rule::All, operands),
        Kind::Or(operands) => (Rule::Any, operands),
        Kind::Xor(operands) => (Rule::ExactlyOne, operands),
        _ => return Ok(Vec::new()),
    };
    let in_scope: Option<HashSet<E>> = if options.recursive {
        None
    } else {
        Some(root.children()?.into_iter().collect())
    };
    let mut results: Vec<Option<HashSet<E>>> = Vec::with_capacity(operands.len());
    for operand in operands {
        if operand.is_local() {
            results.push(None);
        } else {
            let found = operand.search(root, options.unlimited())?;
            results.push(Some(found.into_iter().collect()));
        }
    }

    let member = |operand: &Selector, result: Option<&HashSet<E>>, candidate: &E| -> Result<bool> {
        match result {
            Some(found) => Ok(found.contains(candidate)),
            None => {
                let scoped = in_scope
                    .as_ref()
                    .is_none_or(|children| children.contains(candidate));
                Ok(scoped && operand.matches_element(candidate)?)
            }
        }
    };

    scan(root, options.recursive(true), |candidate| {
        let mut hits = 0;
        for (operand, result) in operands.iter().zip(&results) {
            let hit = member(operand, result.as_ref(), candidate)?;
            match (rule, hit) {
                (Rule::All, false) => return Ok(false),
                (Rule::Any, true) => return Ok(true),
                _ => {}
            }
            if hit {
                hits += 1;
            }
        }
        Ok(match rule {
            Rule::All => true,
            Rule::Any => false,
            Rule::ExactlyOne => hits == 1,
        })
    })
}
