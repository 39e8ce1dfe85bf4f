//! Translation of CSS selector text into [`Selector`] values.
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! "The grammar of Selectors is defined in terms of CSS syntax."
//!
//! Supports:
//! - Type, universal, class and ID selectors: `div`, `*`, `.note`, `#main`
//! - Attribute selectors with every operator and the `i` flag:
//!   `[lang|=en]`, `[href$=".pdf" i]`
//! - Combinators: `div p`, `ul > li`, `h1 + p`, `h1 ~ p`
//! - Selector lists: `h1, h2`
//! - Structural pseudo-classes: `:first-child`, `:nth-child(2n+1 of .x)`,
//!   `:nth-last-of-type(2)`, `:only-child`, `:empty`, ...
//! - Logical pseudo-classes: `:not()`, `:is()`, `:where()`, `:has()`
//!
//! Anything else, including pseudo-elements, is rejected with
//! [`SelectError::InvalidQuery`].

use crate::error::{Result, SelectError};
use crate::selector::{Relation, Selector, TextMatcher};

/// Parse a CSS selector list.
///
/// # Errors
///
/// Returns [`SelectError::InvalidQuery`] for malformed or unsupported
/// selector text.
pub fn parse(query: &str) -> Result<Selector> {
    let mut parser = Parser::new(query);
    let selector = parser.selector_list()?;
    let _ = parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected `{c}`")));
    }
    Ok(selector)
}

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

/// Recursive descent over the characters of one query.
struct Parser<'a> {
    query: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(query: &'a str) -> Self {
        Self {
            query,
            chars: query.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SelectError {
        SelectError::InvalidQuery {
            language: "css".to_string(),
            query: self.query.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{expected}`")))
        }
    }

    /// Returns whether any whitespace was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// [§ 4.3.11 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        let mut lookahead = self.chars[start..].iter().copied();
        let starts = match lookahead.next() {
            Some('-') => lookahead
                .next()
                .is_some_and(|c| is_ident_start_char(c) || c == '-'),
            Some(c) => is_ident_start_char(c),
            None => false,
        };
        if !starts {
            return Err(self.error("expected an identifier"));
        }
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
    ///
    /// "A comma-separated list of selectors represents the union of all
    /// elements selected by each of the individual selectors in the list."
    fn selector_list(&mut self) -> Result<Selector> {
        let mut alternatives = vec![self.complex()?];
        loop {
            let _ = self.skip_whitespace();
            if !self.eat(',') {
                break;
            }
            alternatives.push(self.complex()?);
        }
        Selector::any_of(alternatives)
    }

    /// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
    ///
    /// "A complex selector is a chain of one or more compound selectors
    /// separated by combinators." Chains associate to the left, so
    /// `a > b c` selects `c` descendants of `a > b` matches.
    fn complex(&mut self) -> Result<Selector> {
        let _ = self.skip_whitespace();
        let mut selector = self.compound()?;
        while let Some(relation) = self.combinator() {
            let next = self.compound()?;
            selector = Selector::combine(relation, [selector, next])?;
        }
        Ok(selector)
    }

    /// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
    ///
    /// Whitespace may be the descendant combinator, unless an explicit
    /// combinator or the end of the selector follows it.
    fn combinator(&mut self) -> Option<Relation> {
        let spaced = self.skip_whitespace();
        let relation = match self.peek() {
            Some('>') => Relation::Child,
            Some('+') => Relation::NextSibling,
            Some('~') => Relation::SubsequentSibling,
            Some(',' | ')') | None => return None,
            Some(_) if spaced => return Some(Relation::Descendant),
            Some(_) => return None,
        };
        self.pos += 1;
        let _ = self.skip_whitespace();
        Some(relation)
    }

    /// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
    ///
    /// "A compound selector is a sequence of simple selectors that are not
    /// separated by a combinator."
    fn compound(&mut self) -> Result<Selector> {
        let mut parts = Vec::new();
        if self.eat('*') {
            parts.push(Selector::universal());
        } else if self.peek().is_some_and(|c| is_ident_start_char(c) || c == '-') {
            let name = self.ident()?;
            parts.push(Selector::tag(&name)?);
        }
        loop {
            match self.peek() {
                // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
                Some('.') => {
                    self.pos += 1;
                    parts.push(Selector::class(self.ident()?));
                }
                // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
                Some('#') => {
                    self.pos += 1;
                    parts.push(Selector::id(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    parts.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    parts.push(self.pseudo_class()?);
                }
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected a selector, found `{c}`")),
                None => self.error("expected a selector"),
            });
        }
        Ok(Selector::all_of(parts))
    }

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    fn attribute(&mut self) -> Result<Selector> {
        let _ = self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        let _ = self.skip_whitespace();
        if self.eat(']') {
            return Selector::has_attribute(&name);
        }
        let operator = match self.bump() {
            Some('=') => '=',
            Some(op @ ('~' | '|' | '^' | '$' | '*')) if self.eat('=') => op,
            _ => return Err(self.error("expected an attribute operator")),
        };
        let _ = self.skip_whitespace();
        let value = self.attribute_value()?;
        let _ = self.skip_whitespace();
        // [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
        let insensitive = match self.peek() {
            Some('i' | 'I') => true,
            Some('s' | 'S') => false,
            _ => {
                self.expect(']')?;
                return attribute_selector(&name, operator, value, false);
            }
        };
        self.pos += 1;
        let _ = self.skip_whitespace();
        self.expect(']')?;
        attribute_selector(&name, operator, value, insensitive)
    }

    /// A quoted string or a bare identifier.
    fn attribute_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => return Ok(value),
                        Some('\\') => match self.bump() {
                            Some(escaped) => value.push(escaped),
                            None => break,
                        },
                        Some(c) => value.push(c),
                        None => break,
                    }
                }
                Err(self.error("unterminated string"))
            }
            _ => self.ident(),
        }
    }

    /// [§ 3.6 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    fn pseudo_class(&mut self) -> Result<Selector> {
        if self.peek() == Some(':') {
            return Err(self.error("pseudo-elements are not supported"));
        }
        let name = self.ident()?.to_ascii_lowercase();
        if self.eat('(') {
            let selector = self.functional_pseudo_class(&name)?;
            let _ = self.skip_whitespace();
            self.expect(')')?;
            return Ok(selector);
        }
        match name.as_str() {
            "first-child" => Ok(Selector::first_child()),
            "last-child" => Ok(Selector::last_child()),
            "only-child" => Ok(Selector::only_child()),
            "first-of-type" => Ok(Selector::first_of_type()),
            "last-of-type" => Ok(Selector::last_of_type()),
            "only-of-type" => Ok(Selector::only_of_type()),
            "empty" => Ok(Selector::empty()),
            _ => Err(self.error(format!("unsupported pseudo-class `:{name}`"))),
        }
    }

    fn functional_pseudo_class(&mut self, name: &str) -> Result<Selector> {
        match name {
            "nth-child" | "nth-last-child" => {
                let from_end = name == "nth-last-child";
                let (formula, of) = self.nth_argument(true)?;
                let built = match (of, from_end) {
                    (None, false) => Selector::nth_child(&formula),
                    (None, true) => Selector::nth_last_child(&formula),
                    (Some(of), false) => Selector::nth_of(of, &formula),
                    (Some(of), true) => Selector::nth_last_of(of, &formula),
                };
                built.map_err(|err| self.error(err.to_string()))
            }
            "nth-of-type" | "nth-last-of-type" => {
                let (formula, _) = self.nth_argument(false)?;
                let built = if name == "nth-of-type" {
                    Selector::nth_of_type(&formula)
                } else {
                    Selector::nth_last_of_type(&formula)
                };
                built.map_err(|err| self.error(err.to_string()))
            }
            // [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
            "not" => Ok(Selector::not(self.selector_list()?)),
            // [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches)
            // [§ 4.4 :where()](https://www.w3.org/TR/selectors-4/#zero-matches)
            "is" | "where" => self.selector_list(),
            // [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
            "has" => self.relative_selector_list(),
            _ => Err(self.error(format!("unsupported pseudo-class `:{name}()`"))),
        }
    }

    /// The `An+B` text, plus the `of S` selector list when allowed.
    fn nth_argument(&mut self, allow_of: bool) -> Result<(String, Option<Selector>)> {
        let start = self.pos;
        let mut of = false;
        while let Some(c) = self.peek() {
            if c == ')' {
                break;
            }
            if allow_of && self.at_of_keyword() {
                of = true;
                break;
            }
            self.pos += 1;
        }
        let formula: String = self.chars[start..self.pos].iter().collect();
        if !of {
            return Ok((formula, None));
        }
        self.pos += 2;
        Ok((formula, Some(self.selector_list()?)))
    }

    /// Whether the input continues with the word `of` delimited by
    /// whitespace.
    fn at_of_keyword(&self) -> bool {
        let rest = &self.chars[self.pos..];
        self.pos > 0
            && self.chars[self.pos - 1].is_ascii_whitespace()
            && rest.len() > 2
            && rest[0].eq_ignore_ascii_case(&'o')
            && rest[1].eq_ignore_ascii_case(&'f')
            && rest[2].is_ascii_whitespace()
    }

    /// [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
    ///
    /// "The relational pseudo-class, :has(), is a functional pseudo-class
    /// taking a <relative-selector-list> as an argument."
    fn relative_selector_list(&mut self) -> Result<Selector> {
        let mut alternatives = vec![Selector::has(self.relative_selector()?)];
        loop {
            let _ = self.skip_whitespace();
            if !self.eat(',') {
                break;
            }
            alternatives.push(Selector::has(self.relative_selector()?));
        }
        Selector::any_of(alternatives)
    }

    /// A complex selector whose leading combinator (descendant when absent)
    /// relates it to the element being tested.
    fn relative_selector(&mut self) -> Result<Selector> {
        let _ = self.skip_whitespace();
        let relation = match self.peek() {
            Some('>') => Relation::Child,
            Some('+') => Relation::NextSibling,
            Some('~') => Relation::SubsequentSibling,
            _ => Relation::Descendant,
        };
        if relation != Relation::Descendant {
            self.pos += 1;
            let _ = self.skip_whitespace();
        }
        let mut selector = Selector::relative(relation, self.compound()?);
        while let Some(relation) = self.combinator() {
            let next = self.compound()?;
            selector = Selector::combine(relation, [selector, next])?;
        }
        Ok(selector)
    }
}

/// Build an attribute selector, folding case when asked.
///
/// [§ 6.2](https://www.w3.org/TR/selectors-4/#attribute-substrings)
/// "If 'val' is the empty string then the selector does not represent
/// anything" for the substring operators, and `~=` never matches an empty or
/// whitespace-bearing value.
fn attribute_selector(
    name: &str,
    operator: char,
    value: String,
    insensitive: bool,
) -> Result<Selector> {
    let impossible = match operator {
        '^' | '$' | '*' => value.is_empty(),
        '~' => value.is_empty() || value.contains(|c: char| c.is_ascii_whitespace()),
        _ => false,
    };
    if impossible {
        return Ok(Selector::not(Selector::universal()));
    }
    let matcher = if insensitive {
        let escaped = regex::escape(&value);
        let pattern = match operator {
            '~' => format!(r"(?i)(?:^|\s){escaped}(?:\s|$)"),
            '|' => format!("(?i)^{escaped}(?:-|$)"),
            '^' => format!("(?i)^{escaped}"),
            '$' => format!("(?i){escaped}$"),
            '*' => format!("(?i){escaped}"),
            _ => format!("(?i)^{escaped}$"),
        };
        TextMatcher::regex(&pattern)?
    } else {
        match operator {
            '~' => TextMatcher::Includes(value),
            '|' => TextMatcher::DashMatch(value),
            '^' => TextMatcher::Prefix(value),
            '$' => TextMatcher::Suffix(value),
            '*' => TextMatcher::Contains(value),
            _ => TextMatcher::Exact(value),
        }
    };
    Selector::attribute(name, matcher)
}
