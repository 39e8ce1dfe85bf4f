//! Primitive selectors: type, universal, attribute, class, text pattern,
//! user predicates and foreign queries.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::{Kind, Selector};
use crate::element::{Node, QueryLanguage};
use crate::error::{Result, SelectError};

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// How a string value (attribute value or direct text) is tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatcher {
    /// `[att=val]`: "whose value is exactly 'val'".
    Exact(String),
    /// `[att~=val]`: "a whitespace-separated list of words, one of which is
    /// exactly 'val'".
    Includes(String),
    /// `[att|=val]`: "either being exactly 'val' or beginning with 'val'
    /// immediately followed by '-'".
    DashMatch(String),
    /// `[att^=val]`: "begins with the prefix 'val'".
    Prefix(String),
    /// `[att$=val]`: "ends with the suffix 'val'".
    Suffix(String),
    /// `[att*=val]`: "contains at least one instance of the substring 'val'".
    Contains(String),
    /// Regular expression with search semantics (matches anywhere unless
    /// anchored).
    Regex(Pattern),
}

/// A compiled regular expression identified by its pattern text.
///
/// Only [`TextMatcher::regex`] builds one, so every flag is part of the text
/// (inline, as in `(?i)abc`) and equal patterns match the same strings.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// The pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl TextMatcher {
    /// Compile `pattern` into a [`TextMatcher::Regex`].
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::InvalidPattern`] if the pattern does not compile.
    pub fn regex(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(|re| Self::Regex(Pattern(re)))
            .map_err(|source| SelectError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Test `value` against this matcher.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Exact(val) => value == val,
            Self::Includes(val) => value.split_ascii_whitespace().any(|word| word == val),
            Self::DashMatch(val) => value
                .strip_prefix(val.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-')),
            Self::Prefix(val) => value.starts_with(val.as_str()),
            Self::Suffix(val) => value.ends_with(val.as_str()),
            Self::Contains(val) => value.contains(val.as_str()),
            Self::Regex(re) => re.is_match(value),
        }
    }

    /// Test a class attribute value: every matcher except `Includes` is
    /// applied to the individual tokens, and a regex may also match the
    /// whole value.
    fn is_class_match(&self, value: &str) -> bool {
        match self {
            Self::Includes(_) => self.is_match(value),
            Self::Regex(re) => {
                re.is_match(value) || value.split_ascii_whitespace().any(|t| re.is_match(t))
            }
            _ => value.split_ascii_whitespace().any(|token| self.is_match(token)),
        }
    }
}

impl From<&str> for TextMatcher {
    fn from(value: &str) -> Self {
        Self::Exact(value.to_string())
    }
}

impl From<String> for TextMatcher {
    fn from(value: String) -> Self {
        Self::Exact(value)
    }
}

impl fmt::Display for TextMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(val) => write!(f, "={val:?}"),
            Self::Includes(val) => write!(f, "~={val:?}"),
            Self::DashMatch(val) => write!(f, "|={val:?}"),
            Self::Prefix(val) => write!(f, "^={val:?}"),
            Self::Suffix(val) => write!(f, "$={val:?}"),
            Self::Contains(val) => write!(f, "*={val:?}"),
            Self::Regex(re) => write!(f, "=/{}/", re.as_str()),
        }
    }
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// "Represents an element with the att attribute", optionally constrained by
/// a value matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name, compared exactly.
    pub name: String,
    /// Value constraint; `None` only tests presence.
    pub value: Option<TextMatcher>,
}

impl AttributeSelector {
    pub(crate) fn matches(&self, node: &dyn Node) -> bool {
        node.attribute(&self.name)
            .is_some_and(|value| self.value.as_ref().is_none_or(|m| m.is_match(value)))
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, self.name.as_str()) {
            (Some(TextMatcher::Exact(val)), "id") => write!(f, "#{val}"),
            (Some(value), name) => write!(f, "[{name}{value}]"),
            (None, name) => write!(f, "[{name}]"),
        }
    }
}

/// User predicate stored by [`Selector::expression`].
///
/// Two predicates are equal only when they share one allocation.
#[derive(Clone)]
pub(crate) struct Predicate(Arc<dyn Fn(&dyn Node) -> bool + Send + Sync>);

impl Predicate {
    pub(crate) fn call(&self, node: &dyn Node) -> bool {
        (self.0)(node)
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({:p})", Arc::as_ptr(&self.0))
    }
}

/// Element-level test shared by the primitive kinds.
pub(crate) fn class_matches(matcher: &TextMatcher, node: &dyn Node) -> bool {
    node.attribute("class")
        .is_some_and(|value| matcher.is_class_match(value))
}

/// Direct-text test: elements without a direct text child never match.
pub(crate) fn text_matches(matcher: &TextMatcher, node: &dyn Node) -> bool {
    node.own_text().is_some_and(|text| matcher.is_match(&text))
}

impl Selector {
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    ///
    /// "The universal selector ... represents the qualified name of any
    /// element type."
    #[must_use]
    pub const fn universal() -> Self {
        Self(Kind::Universal)
    }

    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Matches elements whose tag name equals `name`, ASCII case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::EmptyName`] if `name` is empty.
    pub fn tag(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(SelectError::EmptyName { what: "tag" });
        }
        Ok(Self(Kind::Type(name.to_ascii_lowercase())))
    }

    /// Matches elements carrying attribute `name` whose value satisfies
    /// `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::EmptyName`] if `name` is empty.
    pub fn attribute(name: &str, value: impl Into<TextMatcher>) -> Result<Self> {
        Self::attribute_selector(name, Some(value.into()))
    }

    /// `[att]`: matches elements carrying attribute `name` with any value.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::EmptyName`] if `name` is empty.
    pub fn has_attribute(name: &str) -> Result<Self> {
        Self::attribute_selector(name, None)
    }

    fn attribute_selector(name: &str, value: Option<TextMatcher>) -> Result<Self> {
        if name.is_empty() {
            return Err(SelectError::EmptyName { what: "attribute" });
        }
        Ok(Self(Kind::Attribute(AttributeSelector {
            name: name.to_string(),
            value,
        })))
    }

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Attribute selector on `id`.
    #[must_use]
    pub fn id(value: impl Into<TextMatcher>) -> Self {
        Self(Kind::Attribute(AttributeSelector {
            name: "id".to_string(),
            value: Some(value.into()),
        }))
    }

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Matches against the class token set: an exact value is a token
    /// membership test and a regex matches any token or the whole value.
    #[must_use]
    pub fn class(value: impl Into<TextMatcher>) -> Self {
        Self(Kind::Class(value.into()))
    }

    /// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
    ///
    /// A tag (or any element when `None`) plus attribute constraints, all of
    /// which must hold.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::DuplicateAttribute`] when an attribute name
    /// appears twice, or [`SelectError::EmptyName`] for an empty name.
    pub fn compound<I, S>(tag: Option<&str>, attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Option<TextMatcher>)>,
        S: AsRef<str>,
    {
        let mut parts = Vec::new();
        if let Some(tag) = tag {
            parts.push(Self::tag(tag)?);
        }
        let mut seen: Vec<String> = Vec::new();
        for (name, value) in attributes {
            let name = name.as_ref();
            if seen.iter().any(|s| s == name) {
                return Err(SelectError::DuplicateAttribute {
                    name: name.to_string(),
                });
            }
            seen.push(name.to_string());
            parts.push(Self::attribute_selector(name, value)?);
        }
        Ok(Self::all_of(parts))
    }

    /// Matches elements whose direct text (own text nodes only, not that of
    /// descendants) satisfies `matcher`.
    #[must_use]
    pub fn text(matcher: impl Into<TextMatcher>) -> Self {
        Self(Kind::Text(matcher.into()))
    }

    /// Matches elements for which `predicate` returns `true`.
    ///
    /// Expression selectors compare equal only to clones of themselves.
    #[must_use]
    pub fn expression<F>(predicate: F) -> Self
    where
        F: Fn(&dyn Node) -> bool + Send + Sync + 'static,
    {
        Self(Kind::Expression(Predicate(Arc::new(predicate))))
    }

    /// Delegates to the backend's native CSS engine.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::EmptyQuery`] for a blank query. Syntax errors and
    /// missing backend support surface when searching.
    pub fn css(query: &str) -> Result<Self> {
        Self::query(QueryLanguage::Css, query)
    }

    /// Delegates to the backend's native XPath engine.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::EmptyQuery`] for a blank query.
    pub fn xpath(query: &str) -> Result<Self> {
        Self::query(QueryLanguage::XPath, query)
    }

    fn query(language: QueryLanguage, query: &str) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(SelectError::EmptyQuery);
        }
        Ok(Self(Kind::Query(language, query.to_string())))
    }
}
