//! Tests for backend selection, configuration and searching parsed documents.

use std::str::FromStr;

use thicket::{AnyElement, Backend, ConfigError, Document, Node, ParseConfig, SearchOptions, Selector};

const LIST: &str = r#"
<ul id="menu">
  <li class="item first">Home</li>
  <li class="item"><a href="/docs">Docs</a></li>
  <li class="item last"><a href="/about">About</a></li>
</ul>
"#;

fn texts(elements: &[AnyElement<'_>]) -> Vec<String> {
    elements.iter().map(Node::text).collect()
}

#[test]
fn test_backend_names_round_trip() {
    assert_eq!(Backend::Dom.to_string(), "dom");
    assert_eq!(Backend::Html.to_string(), "html");
    assert_eq!(Backend::from_str("HTML").unwrap(), Backend::Html);
    assert!(Backend::from_str("lxml").is_err());
    assert_eq!(Backend::default(), Backend::Dom);
}

#[test]
fn test_config_from_json_uses_defaults() {
    let config = ParseConfig::from_json(r#"{ "fragment": true }"#).unwrap();
    assert_eq!(config, ParseConfig::default().fragment(true));

    let config = ParseConfig::from_json(r#"{ "backend": "html" }"#).unwrap();
    assert_eq!(config.backend, Backend::Html);
    assert!(!config.fragment);
}

#[test]
fn test_config_rejects_unknown_backend() {
    let err = ParseConfig::from_json(r#"{ "backend": "lxml" }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_config_from_path() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("thicket-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "backend": "html", "fragment": true }"#)?;
    let config = ParseConfig::from_path(&path);
    std::fs::remove_file(&path)?;

    assert_eq!(config?, ParseConfig::default().backend(Backend::Html).fragment(true));

    let missing = ParseConfig::from_path(path.with_extension("missing"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));
    Ok(())
}

#[test]
fn test_document_reports_its_backend() {
    for backend in [Backend::Dom, Backend::Html] {
        let document = Document::parse(LIST, &ParseConfig::default().backend(backend));
        assert_eq!(document.backend(), backend);
        assert_eq!(document.dom().is_some(), backend == Backend::Dom);
        assert_eq!(document.html().is_some(), backend == Backend::Html);
        assert!(matches!(
            (backend, document.root()),
            (Backend::Dom, AnyElement::Dom(_)) | (Backend::Html, AnyElement::Html(_))
        ));
    }
}

#[test]
fn test_same_selector_on_both_backends() -> anyhow::Result<()> {
    let selectors = [
        Selector::class("item"),
        Selector::tag("li")? >> Selector::has_attribute("href")?,
        Selector::tag("li")? & Selector::has_child(Selector::tag("a")?),
        Selector::nth_child("odd")? & Selector::tag("li")?,
        Selector::css("ul > li.last a")?,
        Selector::tag("a")? << Selector::tag("li")?,
    ];
    for selector in &selectors {
        let dom = Document::parse(LIST, &ParseConfig::default().backend(Backend::Dom));
        let html = Document::parse(LIST, &ParseConfig::default().backend(Backend::Html));
        let from_dom = texts(&selector.find_all(&dom.root())?);
        let from_html = texts(&selector.find_all(&html.root())?);
        assert_eq!(from_dom, from_html, "{selector}");
        assert!(!from_dom.is_empty(), "{selector}");
    }
    Ok(())
}

#[test]
fn test_fragment_scenario_non_recursive() -> anyhow::Result<()> {
    let markup = r#"<div><p class="x">1</p><p>2</p><p class="x">3</p></div>"#;
    for backend in [Backend::Dom, Backend::Html] {
        let config = ParseConfig::default().backend(backend).fragment(true);
        let document = Document::parse(markup, &config);
        let div = Selector::tag("div")?.find_strict(&document.root())?;

        let selector = Selector::tag("p")? & Selector::class("x");
        let found = selector.find_all_with(&div, SearchOptions::default().recursive(false))?;
        assert_eq!(texts(&found), ["1", "3"]);
    }
    Ok(())
}

#[test]
fn test_parse_issues_are_kept() {
    let config = ParseConfig::default().fragment(true);
    let document = Document::parse("<p>unclosed <b>bold</p>", &config);
    assert!(!document.issues().is_empty());
}
