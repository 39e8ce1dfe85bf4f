//! Tests for AND, OR, XOR and NOT, including flattening and their behavior
//! over scope-dependent operands.

use thicket_dom::DomTree;
use thicket_select::{DomElement, Node, SearchOptions, SelectError, Selector};

const LIST: &str = r#"<ul><li class="a">1</li><li class="b">2</li><li class="a b">3</li><li>4</li></ul>"#;

fn list() -> DomTree {
    thicket_html::parse_fragment(LIST)
}

fn texts(elements: &[DomElement<'_>]) -> Vec<String> {
    elements.iter().map(Node::text).collect()
}

fn items(selector: &Selector, tree: &DomTree) -> anyhow::Result<Vec<String>> {
    let root = DomElement::document(tree);
    let ul = Selector::tag("ul")?.find_strict(&root)?;
    let options = SearchOptions::default().recursive(false);
    Ok(texts(&selector.find_all_with(&ul, options)?))
}

#[test]
fn test_and_or_xor_not() -> anyhow::Result<()> {
    let tree = list();
    let a = Selector::class("a");
    let b = Selector::class("b");

    assert_eq!(items(&(a.clone() & b.clone()), &tree)?, ["3"]);
    assert_eq!(items(&(a.clone() | b.clone()), &tree)?, ["1", "2", "3"]);
    assert_eq!(items(&(a.clone() ^ b.clone()), &tree)?, ["1", "2"]);
    assert_eq!(items(&!a, &tree)?, ["2", "4"]);
    Ok(())
}

#[test]
fn test_n_ary_xor_is_exactly_one() -> anyhow::Result<()> {
    let tree = list();
    let li = Selector::tag("li")?;
    let (a, b) = (Selector::class("a"), Selector::class("b"));

    let one = Selector::one_of([a.clone(), b.clone(), li.clone()])?;
    assert_eq!(items(&one, &tree)?, ["4"]);

    // The binary operator nests, which computes parity instead
    let parity = a.clone() ^ b.clone() ^ li.clone();
    assert_eq!(items(&parity, &tree)?, ["3", "4"]);

    // Nested XOR is not flattened
    let nested = Selector::one_of([a.clone(), Selector::one_of([b.clone(), li.clone()])?])?;
    assert_ne!(nested, one);
    Ok(())
}

#[test]
fn test_flattening_and_operand_order() -> anyhow::Result<()> {
    let (a, b, c) = (Selector::class("a"), Selector::class("b"), Selector::tag("li")?);

    assert_eq!((a.clone() & b.clone()) & c.clone(), a.clone() & (b.clone() & c.clone()));
    assert_eq!(
        (a.clone() & b.clone()) & c.clone(),
        Selector::all_of([a.clone(), b.clone(), c.clone()])
    );
    assert_eq!(a.clone() & b.clone(), b.clone() & a.clone());
    assert_eq!((a.clone() | b.clone()) | c.clone(), Selector::any_of([a.clone(), b.clone(), c.clone()])?);
    assert_eq!(a.clone() | b.clone(), b.clone() | a.clone());
    assert_ne!(a.clone() & b.clone(), a.clone() | b.clone());
    Ok(())
}

#[test]
fn test_degenerate_operand_counts() -> anyhow::Result<()> {
    let a = Selector::class("a");

    assert_eq!(Selector::all_of([]), Selector::universal());
    assert_eq!(Selector::all_of([a.clone()]), a);
    assert_eq!(Selector::any_of([a.clone()])?, a);
    assert!(matches!(
        Selector::any_of([]),
        Err(SelectError::TooFewOperands { min: 1, got: 0, .. })
    ));
    assert!(matches!(
        Selector::one_of([a]),
        Err(SelectError::TooFewOperands { min: 2, got: 1, .. })
    ));
    Ok(())
}

#[test]
fn test_double_negation_is_eliminated() -> anyhow::Result<()> {
    let tree = list();
    let a = Selector::class("a");

    assert_eq!(!!a.clone(), a);
    assert_eq!(items(&!!a.clone(), &tree)?, items(&a, &tree)?);
    assert_eq!((!a).to_string(), ":not(.a)");
    Ok(())
}

#[test]
fn test_and_equals_filtering() -> anyhow::Result<()> {
    let tree = list();
    let root = DomElement::document(&tree);
    let (a, b) = (Selector::class("a"), Selector::class("b"));

    let both = (a.clone() & b.clone()).find_all(&root)?;
    let mut filtered = Vec::new();
    for element in a.find_all(&root)? {
        if b.matches(&element)? {
            filtered.push(element);
        }
    }
    assert_eq!(both, filtered);
    Ok(())
}

#[test]
fn test_or_has_no_duplicates() -> anyhow::Result<()> {
    let tree = list();
    let root = DomElement::document(&tree);

    let found = (Selector::tag("li")? | Selector::class("a")).find_all(&root)?;
    assert_eq!(texts(&found), ["1", "2", "3", "4"]);
    Ok(())
}

#[test]
fn test_not_of_combinator_complements_its_results() -> anyhow::Result<()> {
    let tree = list();
    let root = DomElement::document(&tree);

    let within = Selector::tag("ul")? >> Selector::class("a");
    let outside = !within.clone();
    let found = outside.find_all(&root)?;

    let tags: Vec<&str> = found.iter().filter_map(Node::tag).collect();
    assert_eq!(tags, ["html", "ul", "li", "li"]);
    assert_eq!(texts(&found[2..]), ["2", "4"]);

    // Element matching agrees with the search
    let li = Selector::tag("li")?.find_all(&root)?;
    assert!(!outside.matches(&li[0])?);
    assert!(outside.matches(&li[1])?);
    Ok(())
}

#[test]
fn test_and_with_combinator_operand() -> anyhow::Result<()> {
    let tree = list();
    let root = DomElement::document(&tree);

    let selector = Selector::tag("li")? & (Selector::tag("ul")? >> Selector::class("b"));
    assert_eq!(texts(&selector.find_all(&root)?), ["2", "3"]);

    let either = Selector::class("a") | (Selector::tag("ul")? >> Selector::class("b"));
    assert_eq!(texts(&either.find_all(&root)?), ["1", "2", "3"]);
    Ok(())
}
