//! Operator sugar for building selectors.
//!
//! | operator | meaning                     |
//! |----------|-----------------------------|
//! | `a & b`  | [`Selector::all_of`]        |
//! | `a \| b` | [`Selector::any_of`]        |
//! | `a ^ b`  | exactly one of the two      |
//! | `!a`     | [`Selector::not`]           |
//! | `a >> b` | [`Selector::descendant`]    |
//! | `a << b` | [`Selector::ancestor`]      |
//! | `a + b`  | [`Selector::next_sibling`]  |
//! | `a * b`  | [`Selector::subsequent_sibling`] |
//!
//! Child and parent relations have no operator; use [`Selector::child`] and
//! [`Selector::parent`].

use std::ops::{Add, BitAnd, BitOr, BitXor, Mul, Not, Shl, Shr};

use super::Selector;

impl BitAnd for Selector {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::all_of([self, rhs])
    }
}

impl BitOr for Selector {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::union(vec![self, rhs])
    }
}

impl BitXor for Selector {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self::exclusive_pair(self, rhs)
    }
}

impl Not for Selector {
    type Output = Self;

    fn not(self) -> Self {
        Self::not(self)
    }
}

impl Shr for Selector {
    type Output = Self;

    fn shr(self, rhs: Self) -> Self {
        Self::descendant(self, rhs)
    }
}

impl Shl for Selector {
    type Output = Self;

    fn shl(self, rhs: Self) -> Self {
        Self::ancestor(self, rhs)
    }
}

impl Add for Selector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::next_sibling(self, rhs)
    }
}

impl Mul for Selector {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::subsequent_sibling(self, rhs)
    }
}
