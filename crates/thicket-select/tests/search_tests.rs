//! Tests for the search protocol: strictness, limits, scope, capability
//! errors and agreement between backends.

use thicket_dom::DomTree;
use thicket_select::{
    Capability, DomElement, Element, HtmlElement, Node, QueryLanguage, SearchOptions, SelectError,
    Selector, TextMatcher,
};

const ARTICLE: &str = r#"<article>
  <h1>Title</h1>
  <p class="x">one <b>bold</b></p>
  <p>two</p>
  <p class="x">three</p>
  <ul><li>a</li><li class="x">b</li></ul>
</article>"#;

fn article() -> DomTree {
    thicket_html::parse_fragment(ARTICLE)
}

fn texts<E: Node>(elements: &[E]) -> Vec<String> {
    elements.iter().map(Node::text).collect()
}

/// How a [`Bare`] handle misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Mode {
    Plain,
    QueryReturnsDocument,
    FailingChildren,
}

/// A backend with no parent pointers and, depending on the mode, a broken
/// query engine or a failing child accessor below `<b>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Bare<'a> {
    inner: DomElement<'a>,
    mode: Mode,
}

impl<'a> Bare<'a> {
    const fn document(tree: &'a DomTree, mode: Mode) -> Self {
        Self {
            inner: DomElement::document(tree),
            mode,
        }
    }
}

impl Node for Bare<'_> {
    fn tag(&self) -> Option<&str> {
        self.inner.tag()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.inner.attribute(name)
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.inner.attribute_names()
    }

    fn own_text(&self) -> Option<String> {
        self.inner.own_text()
    }

    fn text(&self) -> String {
        self.inner.text()
    }
}

impl Element for Bare<'_> {
    const BACKEND: &'static str = "bare";

    fn children(&self) -> thicket_select::Result<Vec<Self>> {
        if self.mode == Mode::FailingChildren && self.tag() == Some("b") {
            return Err(SelectError::Backend("children unavailable".to_string()));
        }
        Ok(self
            .inner
            .children()?
            .into_iter()
            .map(|inner| Self {
                inner,
                mode: self.mode,
            })
            .collect())
    }

    fn query(&self, language: QueryLanguage, _query: &str) -> thicket_select::Result<Vec<Self>> {
        match self.mode {
            Mode::QueryReturnsDocument => Ok(vec![Self::document(self.inner.tree(), self.mode)]),
            Mode::Plain | Mode::FailingChildren => {
                Err(SelectError::unsupported(language.capability(), Self::BACKEND))
            }
        }
    }
}

#[test]
fn test_strict_find_reports_not_found() -> anyhow::Result<()> {
    let tree = article();
    let root = DomElement::document(&tree);
    let table = Selector::tag("table")?;

    assert!(table.find(&root)?.is_none());
    let err = table.find_strict(&root).unwrap_err();
    assert!(matches!(&err, SelectError::NotFound { selector } if selector == "table"));
    assert!(!err.is_construction());

    let strict = SearchOptions::default().strict(true);
    assert!(matches!(table.find_with(&root, strict), Err(SelectError::NotFound { .. })));
    // find_all never fails for finding nothing
    assert!(table.find_all_with(&root, strict)?.is_empty());
    Ok(())
}

#[test]
fn test_limit_returns_a_prefix() -> anyhow::Result<()> {
    let tree = article();
    let root = DomElement::document(&tree);
    let x = Selector::class("x");

    let all = x.find_all(&root)?;
    assert_eq!(texts(&all), ["one bold", "three", "b"]);
    assert_eq!(x.find_all_with(&root, SearchOptions::default().limit(2))?, all[..2]);
    assert!(x.find_all_with(&root, SearchOptions::default().limit(0))?.is_empty());
    assert_eq!(x.find_all_with(&root, SearchOptions::default().limit(10))?, all);
    assert_eq!(x.find(&root)?, all.first().copied());

    let nested = Selector::tag("article")? >> Selector::class("x");
    assert_eq!(nested.find_all_with(&root, SearchOptions::default().limit(2))?, all[..2]);
    Ok(())
}

#[test]
fn test_search_is_idempotent() -> anyhow::Result<()> {
    let tree = article();
    let root = DomElement::document(&tree);
    let selector = (Selector::tag("p")? | Selector::tag("li")?) & !Selector::class("x");

    let first = selector.find_all(&root)?;
    assert_eq!(texts(&first), ["two", "a"]);
    assert_eq!(selector.find_all(&root)?, first);
    Ok(())
}

#[test]
fn test_root_is_never_a_result() -> anyhow::Result<()> {
    let tree = article();
    let root = DomElement::document(&tree);
    let article = Selector::tag("article")?.find_strict(&root)?;

    assert!(Selector::tag("article")?.find(&article)?.is_none());
    assert!(!Selector::universal().matches(&root)?);
    assert!(!(!Selector::tag("p")?).matches(&root)?);
    assert!(Selector::universal().find_all(&root)?.iter().all(Node::is_element));
    Ok(())
}

#[test]
fn test_non_recursive_scope() -> anyhow::Result<()> {
    let tree = article();
    let root = DomElement::document(&tree);
    let article = Selector::tag("article")?.find_strict(&root)?;
    let shallow = SearchOptions::default().recursive(false);

    let x = Selector::class("x");
    assert_eq!(texts(&x.find_all_with(&article, shallow)?), ["one bold", "three"]);
    assert!(Selector::tag("li")?.find_all_with(&article, shallow)?.is_empty());
    Ok(())
}

#[test]
fn test_missing_parent_navigation_is_unsupported() -> anyhow::Result<()> {
    let tree = article();
    let root = Bare::document(&tree, Mode::Plain);

    // Scope-independent selectors and descending combinators need no parent
    assert_eq!(texts(&Selector::class("x").find_all(&root)?), ["one bold", "three", "b"]);
    assert_eq!(
        texts(&(Selector::tag("ul")? >> Selector::tag("li")?).find_all(&root)?),
        ["a", "b"]
    );

    for selector in [
        Selector::first_child(),
        Selector::tag("p")? + Selector::tag("p")?,
        Selector::tag("b")? << Selector::tag("p")?,
    ] {
        let err = selector.find_all(&root).unwrap_err();
        assert!(
            matches!(
                err,
                SelectError::Unsupported {
                    capability: Capability::Parent,
                    backend: "bare"
                }
            ),
            "{selector}: {err}"
        );
    }
    Ok(())
}

#[test]
fn test_missing_query_engine_is_unsupported() -> anyhow::Result<()> {
    let tree = article();
    let root = Bare::document(&tree, Mode::Plain);

    let err = Selector::css("p")?.find_all(&root).unwrap_err();
    assert!(matches!(
        err,
        SelectError::Unsupported {
            capability: Capability::CssQuery,
            ..
        }
    ));
    assert_eq!(err.to_string(), "bare backend does not support css query");
    Ok(())
}

#[test]
fn test_query_yielding_a_non_element_fails() -> anyhow::Result<()> {
    let tree = article();
    let root = Bare::document(&tree, Mode::QueryReturnsDocument);

    let result = Selector::css("p")?.find_all(&root);
    assert!(matches!(result, Err(SelectError::NonElement)));
    Ok(())
}

#[test]
fn test_backend_errors_propagate() -> anyhow::Result<()> {
    let tree = article();
    let root = Bare::document(&tree, Mode::FailingChildren);

    let result = Selector::tag("li")?.find_all(&root);
    assert!(matches!(result, Err(SelectError::Backend(message)) if message == "children unavailable"));
    // Stopping before the failing subtree is reached succeeds
    let heading = Selector::tag("h1")?.find(&root)?;
    assert_eq!(heading.as_ref().map(Node::text).as_deref(), Some("Title"));
    Ok(())
}

#[test]
fn test_foreign_query_errors() -> anyhow::Result<()> {
    let tree = article();
    let html = scraper::Html::parse_fragment(ARTICLE);
    let dom_root = DomElement::document(&tree);
    let html_root = HtmlElement::document(&html);

    assert!(matches!(Selector::css("  "), Err(SelectError::EmptyQuery)));
    assert!(matches!(Selector::xpath(""), Err(SelectError::EmptyQuery)));

    let xpath = Selector::xpath("//p")?;
    for err in [
        xpath.find_all(&dom_root).unwrap_err(),
        xpath.find_all(&html_root).unwrap_err(),
    ] {
        assert!(matches!(
            err,
            SelectError::Unsupported {
                capability: Capability::XPathQuery,
                ..
            }
        ));
    }

    let broken = Selector::css("p[")?;
    assert!(matches!(broken.find_all(&dom_root), Err(SelectError::InvalidQuery { .. })));
    assert!(matches!(broken.find_all(&html_root), Err(SelectError::InvalidQuery { .. })));
    Ok(())
}

#[test]
fn test_css_query_on_both_backends() -> anyhow::Result<()> {
    let tree = article();
    let html = scraper::Html::parse_fragment(ARTICLE);
    let dom_root = DomElement::document(&tree);
    let html_root = HtmlElement::document(&html);

    let query = Selector::css("article > p.x, li:last-child")?;
    assert_eq!(texts(&query.find_all(&dom_root)?), ["one bold", "three", "b"]);
    assert_eq!(texts(&query.find_all(&html_root)?), ["one bold", "three", "b"]);

    // Non-recursive searches keep only children of the root
    let article = Selector::tag("article")?.find_strict(&dom_root)?;
    let shallow = SearchOptions::default().recursive(false);
    assert_eq!(texts(&query.find_all_with(&article, shallow)?), ["one bold", "three"]);

    // Queries evaluated from the document root answer element matching
    let li = Selector::tag("li")?.find_all(&html_root)?;
    assert!(!query.matches(&li[0])?);
    assert!(query.matches(&li[1])?);
    Ok(())
}

fn summary<E: Node>(elements: &[E]) -> Vec<(String, String)> {
    elements
        .iter()
        .map(|element| (element.tag().unwrap_or_default().to_string(), element.text()))
        .collect()
}

#[test]
fn test_backends_agree() -> anyhow::Result<()> {
    let tree = article();
    let html = scraper::Html::parse_fragment(ARTICLE);
    let dom_root = DomElement::document(&tree);
    let html_root = HtmlElement::document(&html);

    let selectors = [
        Selector::universal(),
        Selector::class("x"),
        Selector::text("two"),
        Selector::tag("p")? & !Selector::class("x"),
        Selector::tag("h1")? * Selector::tag("p")?,
        Selector::tag("b")? << Selector::universal(),
        Selector::nth_child("even")?,
        Selector::last_of_type(),
        Selector::has(Selector::tag("b")?),
        Selector::empty(),
    ];
    for selector in &selectors {
        let from_dom = summary(&selector.find_all(&dom_root)?);
        let from_html = summary(&selector.find_all(&html_root)?);
        assert_eq!(from_dom, from_html, "{selector}");
    }
    Ok(())
}

#[test]
fn test_handles_from_different_trees_differ() -> anyhow::Result<()> {
    let first = article();
    let second = article();
    let p = Selector::tag("p")?;

    let a = p.find_strict(&DomElement::document(&first))?;
    let b = p.find_strict(&DomElement::document(&second))?;
    assert_eq!(a.id(), b.id());
    assert_ne!(a, b);
    Ok(())
}

#[test]
fn test_selectors_are_shareable_across_threads() -> anyhow::Result<()> {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let selector = (Selector::tag("p")? & Selector::class(TextMatcher::regex("^x$")?))
        | Selector::expression(|node: &dyn Node| node.attribute("id").is_some());
    assert_send_sync(&selector);

    let handle = std::thread::spawn(move || {
        let tree = article();
        let found = selector.find_all(&DomElement::document(&tree))?;
        Ok::<_, SelectError>(texts(&found))
    });
    let texts = handle.join().map_err(|_| anyhow::anyhow!("search thread panicked"))??;
    assert_eq!(texts, ["one bold", "three"]);
    Ok(())
}

#[test]
fn test_own_text_agrees_between_backends() -> anyhow::Result<()> {
    let markup = "<div><p>a<b>x</b>c</p><p></p><p><i>only</i></p></div>";
    let tree = thicket_html::parse_fragment(markup);
    let html = scraper::Html::parse_fragment(markup);
    let p = Selector::tag("p")?;

    let from_dom: Vec<_> = p
        .find_all(&DomElement::document(&tree))?
        .iter()
        .map(Node::own_text)
        .collect();
    let from_html: Vec<_> = p
        .find_all(&HtmlElement::document(&html))?
        .iter()
        .map(Node::own_text)
        .collect();
    assert_eq!(from_dom, [Some("ac".to_string()), None, None]);
    assert_eq!(from_html, from_dom);
    Ok(())
}
