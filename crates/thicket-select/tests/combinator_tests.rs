//! Tests for relational combinators, relative selectors and `has`.

use std::num::NonZeroUsize;

use thicket_dom::DomTree;
use thicket_select::{DomElement, Node, Relation, SearchOptions, SelectError, Selector};

const SECTION: &str = r#"<section id="s">
  <h2 id="h1">A</h2>
  <p id="p1">one <span id="x1">x</span></p>
  <p id="p2">two</p>
  <div id="d"><p id="p3">three <span id="x2">y</span></p></div>
  <h2 id="h2">B</h2>
  <p id="p4">four</p>
</section>"#;

fn section() -> DomTree {
    thicket_html::parse_fragment(SECTION)
}

fn ids(elements: &[DomElement<'_>]) -> Vec<String> {
    elements
        .iter()
        .map(|element| element.attribute("id").unwrap_or_default().to_string())
        .collect()
}

fn tag(name: &str) -> Selector {
    Selector::tag(name).unwrap()
}

fn by_id<'a>(tree: &'a DomTree, id: &str) -> DomElement<'a> {
    Selector::id(id)
        .find_strict(&DomElement::document(tree))
        .unwrap()
}

#[test]
fn test_descendant_and_child() -> anyhow::Result<()> {
    let tree = section();
    let root = DomElement::document(&tree);

    assert_eq!(ids(&(tag("section") >> tag("p")).find_all(&root)?), ["p1", "p2", "p3", "p4"]);
    assert_eq!(ids(&Selector::child(tag("section"), tag("p")).find_all(&root)?), ["p1", "p2", "p4"]);
    assert_eq!(ids(&(tag("section") >> tag("div") >> tag("span")).find_all(&root)?), ["x2"]);
    Ok(())
}

#[test]
fn test_sibling_combinators() -> anyhow::Result<()> {
    let tree = section();
    let root = DomElement::document(&tree);

    assert_eq!(ids(&(tag("h2") + tag("p")).find_all(&root)?), ["p1", "p4"]);
    // p4 follows both headings but is reported once
    assert_eq!(ids(&(tag("h2") * tag("p")).find_all(&root)?), ["p1", "p2", "p4"]);
    assert_eq!(ids(&(tag("div") + tag("h2")).find_all(&root)?), ["h2"]);
    assert!((tag("p") + tag("h2")).find(&root)?.is_none());
    assert!((tag("span") + tag("span")).find(&root)?.is_none());
    Ok(())
}

#[test]
fn test_ancestor_and_parent() -> anyhow::Result<()> {
    let tree = section();
    let root = DomElement::document(&tree);

    assert_eq!(ids(&(tag("span") << tag("p")).find_all(&root)?), ["p1", "p3"]);
    assert_eq!(
        ids(&Selector::parent(tag("span"), Selector::universal()).find_all(&root)?),
        ["p1", "p3"]
    );
    let one = NonZeroUsize::new(1).unwrap();
    let two = NonZeroUsize::new(2).unwrap();
    assert!(Selector::ancestor_within(tag("span"), tag("div"), one).find(&root)?.is_none());
    assert_eq!(
        ids(&Selector::ancestor_within(tag("span"), tag("div"), two).find_all(&root)?),
        ["d"]
    );
    assert_eq!(Selector::parent(tag("span"), tag("p")), Selector::ancestor_within(tag("span"), tag("p"), one));
    Ok(())
}

#[test]
fn test_descendants_are_deduplicated() -> anyhow::Result<()> {
    let tree = section();
    let root = DomElement::document(&tree);

    // Every ancestor of a span is an anchor, but each span is reported once
    let found = (Selector::universal() >> tag("span")).find_all(&root)?;
    assert_eq!(ids(&found), ["x1", "x2"]);
    Ok(())
}

#[test]
fn test_non_recursive_restricts_anchors() -> anyhow::Result<()> {
    let tree = section();
    let section = by_id(&tree, "s");
    let shallow = SearchOptions::default().recursive(false);

    // Only p children of the section anchor, so the span inside the div is skipped
    let found = (tag("p") >> tag("span")).find_all_with(&section, shallow)?;
    assert_eq!(ids(&found), ["x1"]);

    // Ancestor combinators keep results that are children of the root
    let found = (tag("span") << tag("p")).find_all_with(&section, shallow)?;
    assert_eq!(ids(&found), ["p1"]);
    let found = (tag("span") << tag("p")).find_all_with(&by_id(&tree, "d"), shallow)?;
    assert_eq!(ids(&found), ["p3"]);
    Ok(())
}

#[test]
fn test_relative_selectors() -> anyhow::Result<()> {
    let tree = section();

    let next = Selector::relative(Relation::NextSibling, tag("p"));
    assert_eq!(ids(&next.find_all(&by_id(&tree, "h1"))?), ["p1"]);

    let later = Selector::relative(Relation::SubsequentSibling, Selector::universal());
    assert_eq!(ids(&later.find_all(&by_id(&tree, "h2"))?), ["p4"]);

    let children = Selector::relative(Relation::Child, Selector::universal());
    assert_eq!(ids(&children.find_all(&by_id(&tree, "d"))?), ["p3"]);

    let up = Selector::relative(Relation::ANCESTOR, tag("section"));
    assert_eq!(ids(&up.find_all(&by_id(&tree, "x2"))?), ["s"]);
    Ok(())
}

#[test]
fn test_has_returns_the_anchor() -> anyhow::Result<()> {
    let tree = section();
    let root = DomElement::document(&tree);

    let with_span = tag("p") & Selector::has(tag("span"));
    assert_eq!(ids(&with_span.find_all(&root)?), ["p1", "p3"]);

    let with_p_child = Selector::has_child(tag("p"));
    assert_eq!(ids(&with_p_child.find_all(&root)?), ["s", "d"]);
    assert_eq!(with_p_child.to_string(), ":has(> p)");

    // `:has(+ h2)` looks at the sibling, outside the anchor's subtree
    let before_heading = Selector::has(Selector::relative(Relation::NextSibling, tag("h2")));
    assert_eq!(ids(&before_heading.find_all(&root)?), ["d"]);
    assert!((tag("p") & before_heading).find(&root)?.is_none());
    Ok(())
}

#[test]
fn test_combinator_matches_agrees_with_search() -> anyhow::Result<()> {
    let tree = section();

    assert!((tag("section") >> tag("span")).matches(&by_id(&tree, "x1"))?);
    assert!(Selector::child(tag("div"), tag("p")).matches(&by_id(&tree, "p3"))?);
    assert!(!Selector::child(tag("div"), tag("p")).matches(&by_id(&tree, "p1"))?);
    assert!((tag("h2") * tag("p")).matches(&by_id(&tree, "p2"))?);
    assert!((tag("span") << tag("div")).matches(&by_id(&tree, "d"))?);
    assert!(!(tag("span") << tag("div")).matches(&by_id(&tree, "s"))?);
    Ok(())
}

#[test]
fn test_combinator_equality_and_flattening() -> anyhow::Result<()> {
    let (a, b, c) = (tag("section"), tag("div"), tag("span"));

    let left = (a.clone() >> b.clone()) >> c.clone();
    assert_eq!(left, Selector::combine(Relation::Descendant, [a.clone(), b.clone(), c.clone()])?);
    // Only a leading chain is spliced in
    assert_ne!(a.clone() >> (b.clone() >> c.clone()), left);
    assert_ne!(a.clone() >> b.clone(), Selector::child(a.clone(), b.clone()));

    assert!(matches!(
        Selector::combine(Relation::Child, [a]),
        Err(SelectError::TooFewOperands { min: 2, got: 1, .. })
    ));
    Ok(())
}

#[test]
fn test_display_uses_combinator_symbols() {
    assert_eq!((tag("h2") + tag("p")).to_string(), "h2 + p");
    assert_eq!((tag("h2") * tag("p")).to_string(), "h2 ~ p");
    assert_eq!(Selector::child(tag("ul"), tag("li")).to_string(), "ul > li");
    assert_eq!((tag("a") >> tag("b") >> tag("c")).to_string(), "a b c");
    assert_eq!((tag("span") << tag("p")).to_string(), "span << p");
    let three = NonZeroUsize::new(3).unwrap();
    assert_eq!(Selector::ancestor_within(tag("span"), tag("div"), three).to_string(), "span <3 div");
}
