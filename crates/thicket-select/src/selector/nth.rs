//! [§ 14.4 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
//!
//! Positional matchers built on the `An+B` microsyntax, plus the
//! `:only-*` and `:empty` structural tests.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::{Kind, Selector};
use crate::element::Element;
use crate::error::{Result, SelectError};

/// [§ 6.6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// "The An+B notation defines an integer step (A) and offset (B), and
/// represents the An+Bth elements in a list, for every positive integer or
/// zero value of n, with the first element in the list having index 1."
///
/// Values are kept in a canonical form, so two formulas compare equal exactly
/// when they select the same positions (`even == 2n == 2n+2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnPlusB {
    a: i64,
    b: i64,
}

/// `[+-]?<digits>?n (<ws>? [+-] <ws>? <digits>)?` or a plain integer.
static ANB: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<sign>[+-]?)(?P<a>\d*)n(?:\s*(?P<bsign>[+-])\s*(?P<b>\d+))?|(?P<int>[+-]?\d+))$",
    )
    .ok()
});

impl AnPlusB {
    /// Build a formula from its step and offset.
    #[must_use]
    pub const fn new(a: i64, b: i64) -> Self {
        Self { a, b }.canonical()
    }

    /// The step after normalization.
    #[must_use]
    pub const fn step(self) -> i64 {
        self.a
    }

    /// The offset after normalization.
    #[must_use]
    pub const fn offset(self) -> i64 {
        self.b
    }

    /// Parse `odd`, `even`, an integer, or `An+B` with optional whitespace
    /// around the sign of B. Keywords and `n` are ASCII case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::InvalidNth`] for anything else.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason| SelectError::InvalidNth {
            input: input.to_string(),
            reason,
        };
        let normalized = input.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "" => return Err(invalid("empty formula")),
            // "odd" has the same meaning as 2n+1
            "odd" => return Ok(Self::new(2, 1)),
            // "even" has the same meaning as 2n
            "even" => return Ok(Self::new(2, 0)),
            _ => {}
        }
        let anb = ANB
            .as_ref()
            .ok_or_else(|| invalid("formula grammar unavailable"))?;
        let caps = anb
            .captures(&normalized)
            .ok_or_else(|| invalid("expected odd, even, an integer or an+b"))?;
        let number = |text: &str| {
            text.parse::<i64>()
                .map_err(|_| invalid("number out of range"))
        };
        if let Some(int) = caps.name("int") {
            return Ok(Self::new(0, number(int.as_str())?));
        }
        let sign = caps.name("sign").map_or("", |m| m.as_str());
        let a = match caps.name("a").map_or("", |m| m.as_str()) {
            "" if sign == "-" => -1,
            "" => 1,
            digits => number(&format!("{sign}{digits}"))?,
        };
        let b = match (caps.name("bsign"), caps.name("b")) {
            (Some(sign), Some(digits)) => {
                number(&format!("{}{}", sign.as_str(), digits.as_str()))?
            }
            _ => 0,
        };
        Ok(Self::new(a, b))
    }

    /// Whether the 1-based `position` is selected.
    #[must_use]
    pub fn matches(self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        if self.a == 0 {
            return position == self.b;
        }
        let diff = position - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }

    /// Rewrite into the unique representative of the selected position set.
    const fn canonical(self) -> Self {
        let Self { a, b } = self;
        if a == 0 {
            // a single position, or nothing at all
            return if b >= 1 { self } else { Self { a: 0, b: 0 } };
        }
        if a > 0 {
            // infinite set, identified by its step and smallest member
            let first = if b >= 1 {
                b
            } else {
                match b.rem_euclid(a) {
                    0 => a,
                    rest => rest,
                }
            };
            return Self { a, b: first };
        }
        // a < 0: a finite set counting down from b; b >= 1 keeps a + b in range
        if b < 1 {
            Self { a: 0, b: 0 }
        } else if a + b <= 0 {
            Self { a: 0, b }
        } else {
            self
        }
    }
}

impl FromStr for AnPlusB {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AnPlusB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (1, b) => write!(f, "n+{b}"),
            (-1, b) => write!(f, "-n+{b}"),
            (a, b) => write!(f, "{a}n+{b}"),
        }
    }
}

/// Which siblings an element is counted among.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Siblings {
    /// All element siblings (`:nth-child`).
    All,
    /// Siblings with the same tag name (`:nth-of-type`).
    SameType,
    /// Siblings matched by a selector (`:nth-child(An+B of S)`).
    Matching(Box<Selector>),
}

/// A positional test: the element's index among `of`, counted from the
/// start or the end, must satisfy `formula`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Nth {
    pub(crate) of: Siblings,
    pub(crate) from_end: bool,
    pub(crate) formula: AnPlusB,
}

impl fmt::Display for Nth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = if self.from_end { "last-" } else { "" };
        match &self.of {
            Siblings::All => write!(f, ":nth-{last}child({})", self.formula),
            Siblings::SameType => write!(f, ":nth-{last}of-type({})", self.formula),
            Siblings::Matching(selector) => {
                write!(f, ":nth-{last}child({} of {selector})", self.formula)
            }
        }
    }
}

/// The list `element` is ranked in, or `None` when the element itself is not
/// part of it.
///
/// An element without a parent is the only member of its sibling list.
fn sibling_pool<E: Element>(of: &Siblings, element: &E) -> Result<Option<Vec<E>>> {
    let excluded = match of {
        Siblings::Matching(selector) => !selector.matches_element(element)?,
        Siblings::All | Siblings::SameType => false,
    };
    if excluded {
        return Ok(None);
    }
    let Some(parent) = element.parent()? else {
        return Ok(Some(vec![element.clone()]));
    };
    let pool = match of {
        Siblings::All => parent.children()?,
        Siblings::SameType => {
            let tag = element.tag().unwrap_or_default();
            parent
                .children()?
                .into_iter()
                .filter(|sibling| sibling.tag().is_some_and(|t| t.eq_ignore_ascii_case(tag)))
                .collect()
        }
        Siblings::Matching(selector) => {
            let mut pool = Vec::new();
            for sibling in parent.children()? {
                if selector.matches_element(&sibling)? {
                    pool.push(sibling);
                }
            }
            pool
        }
    };
    Ok(Some(pool))
}

pub(crate) fn nth_matches<E: Element>(nth: &Nth, element: &E) -> Result<bool> {
    let Some(pool) = sibling_pool(&nth.of, element)? else {
        return Ok(false);
    };
    let Some(index) = pool.iter().position(|sibling| sibling == element) else {
        return Ok(false);
    };
    let position = if nth.from_end {
        pool.len() - index
    } else {
        index + 1
    };
    Ok(nth.formula.matches(position))
}

pub(crate) fn only_matches<E: Element>(of: &Siblings, element: &E) -> Result<bool> {
    Ok(sibling_pool(of, element)?
        .is_some_and(|pool| pool.len() == 1 && pool[0] == *element))
}

/// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
///
/// No element children, and direct text (if any) is whitespace only.
pub(crate) fn empty_matches<E: Element>(element: &E) -> Result<bool> {
    Ok(element.children()?.is_empty()
        && element
            .own_text()
            .is_none_or(|text| text.trim().is_empty()))
}

impl Selector {
    fn nth(of: Siblings, from_end: bool, formula: AnPlusB) -> Self {
        Self(Kind::Nth(Nth {
            of,
            from_end,
            formula,
        }))
    }

    fn nth_parsed(of: Siblings, from_end: bool, formula: &str) -> Result<Self> {
        Ok(Self::nth(of, from_end, AnPlusB::parse(formula)?))
    }

    /// `:nth-child(An+B)`
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::InvalidNth`] for a malformed formula.
    pub fn nth_child(formula: &str) -> Result<Self> {
        Self::nth_parsed(Siblings::All, false, formula)
    }

    /// `:nth-last-child(An+B)`
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::InvalidNth`] for a malformed formula.
    pub fn nth_last_child(formula: &str) -> Result<Self> {
        Self::nth_parsed(Siblings::All, true, formula)
    }

    /// `:nth-of-type(An+B)`
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::InvalidNth`] for a malformed formula.
    pub fn nth_of_type(formula: &str) -> Result<Self> {
        Self::nth_parsed(Siblings::SameType, false, formula)
    }

    /// `:nth-last-of-type(An+B)`
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::InvalidNth`] for a malformed formula.
    pub fn nth_last_of_type(formula: &str) -> Result<Self> {
        Self::nth_parsed(Siblings::SameType, true, formula)
    }

    /// Rank among the siblings matched by `selector`; the element itself must
    /// match it too.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::InvalidNth`] for a malformed formula.
    pub fn nth_of(selector: Self, formula: &str) -> Result<Self> {
        Self::nth_parsed(Siblings::Matching(Box::new(selector)), false, formula)
    }

    /// Like [`Selector::nth_of`], counting from the last sibling.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::InvalidNth`] for a malformed formula.
    pub fn nth_last_of(selector: Self, formula: &str) -> Result<Self> {
        Self::nth_parsed(Siblings::Matching(Box::new(selector)), true, formula)
    }

    /// `:first-child`, equal to `nth_child("1")`.
    #[must_use]
    pub fn first_child() -> Self {
        Self::nth(Siblings::All, false, AnPlusB::new(0, 1))
    }

    /// `:last-child`, equal to `nth_last_child("1")`.
    #[must_use]
    pub fn last_child() -> Self {
        Self::nth(Siblings::All, true, AnPlusB::new(0, 1))
    }

    /// `:first-of-type`, equal to `nth_of_type("1")`.
    #[must_use]
    pub fn first_of_type() -> Self {
        Self::nth(Siblings::SameType, false, AnPlusB::new(0, 1))
    }

    /// `:last-of-type`, equal to `nth_last_of_type("1")`.
    #[must_use]
    pub fn last_of_type() -> Self {
        Self::nth(Siblings::SameType, true, AnPlusB::new(0, 1))
    }

    /// `:only-child`
    #[must_use]
    pub const fn only_child() -> Self {
        Self(Kind::Only(Siblings::All))
    }

    /// `:only-of-type`
    #[must_use]
    pub const fn only_of_type() -> Self {
        Self(Kind::Only(Siblings::SameType))
    }

    /// The only sibling matched by `selector`.
    #[must_use]
    pub fn only_of(selector: Self) -> Self {
        Self(Kind::Only(Siblings::Matching(Box::new(selector))))
    }

    /// `:empty`
    #[must_use]
    pub const fn empty() -> Self {
        Self(Kind::Empty)
    }
}
