//! Text and attribute extraction from a rendered document snapshot.

use scraper::{ElementRef, Html, Selector};

/// Errors raised while reading values out of a snapshot
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("no element matches `{0}`")]
    Missing(String),

    #[error("element `{selector}` has no `{attr}` attribute")]
    MissingAttr { selector: String, attr: String },

    #[error("malformed {field}: {value:?}")]
    Malformed { field: &'static str, value: String },
}

/// What to read from a matched element
#[derive(Debug, Clone, Copy)]
pub enum Projection<'a> {
    /// Whitespace-normalized text content
    Text,
    Attr(&'a str),
}

/// Where a selector is evaluated
#[derive(Clone, Copy)]
pub enum Scope<'a> {
    Document(&'a Html),
    Element(ElementRef<'a>),
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|_| ExtractError::Selector(selector.to_string()))
}

/// Collapse runs of whitespace and trim
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of an element with line structure kept
///
/// Text nodes are trimmed and joined with `\n`, approximating `innerText`
/// for block-level children.
pub fn element_lines(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn project(
    element: ElementRef<'_>,
    selector: &str,
    projection: Projection<'_>,
) -> Result<String, ExtractError> {
    match projection {
        Projection::Text => Ok(normalize_text(&element.text().collect::<String>())),
        Projection::Attr(name) => element
            .value()
            .attr(name)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| ExtractError::MissingAttr {
                selector: selector.to_string(),
                attr: name.to_string(),
            }),
    }
}

/// All elements matching `selector` within `scope`, in document order
pub fn select<'a>(scope: Scope<'a>, selector: &str) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let sel = parse_selector(selector)?;
    let elements = match scope {
        Scope::Document(doc) => doc.select(&sel).collect(),
        Scope::Element(el) => el.select(&sel).collect(),
    };
    Ok(elements)
}

/// First element matching `selector` within `scope`
pub fn first<'a>(scope: Scope<'a>, selector: &str) -> Result<ElementRef<'a>, ExtractError> {
    select(scope, selector)?
        .into_iter()
        .next()
        .ok_or_else(|| ExtractError::Missing(selector.to_string()))
}

/// Whether `selector` matches anything within `scope`
pub fn contains(scope: Scope<'_>, selector: &str) -> Result<bool, ExtractError> {
    Ok(!select(scope, selector)?.is_empty())
}

/// Read one value from the first element matching `selector`
pub fn extract(
    scope: Scope<'_>,
    selector: &str,
    projection: Projection<'_>,
) -> Result<String, ExtractError> {
    project(first(scope, selector)?, selector, projection)
}

/// Read one value from every matching element
///
/// Elements lacking a requested attribute are skipped.
pub fn extract_all(
    scope: Scope<'_>,
    selector: &str,
    projection: Projection<'_>,
) -> Result<Vec<String>, ExtractError> {
    let values = select(scope, selector)?
        .into_iter()
        .filter_map(|el| project(el, selector, projection).ok())
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="row" id="r1"><span class="name">  Arsenal
    FC </span><img src="/a.png"></div>
<div class="row" id="r2"><span class="name">Chelsea</span><img></div>
<div class="score"><span>2</span><span>-</span><span>1</span></div>
</body>
</html>"#;

    #[test]
    fn test_extract_text_normalizes_whitespace() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let name = extract(Scope::Document(&doc), "span.name", Projection::Text).unwrap();
        assert_eq!(name, "Arsenal FC");
    }

    #[test]
    fn test_extract_attr() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let src = extract(Scope::Document(&doc), "div.row img", Projection::Attr("src")).unwrap();
        assert_eq!(src, "/a.png");
    }

    #[test]
    fn test_extract_missing_element() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let err = extract(Scope::Document(&doc), "div.nope", Projection::Text).unwrap_err();
        assert!(matches!(err, ExtractError::Missing(_)));
    }

    #[test]
    fn test_extract_all_skips_missing_attrs() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let srcs =
            extract_all(Scope::Document(&doc), "div.row img", Projection::Attr("src")).unwrap();
        assert_eq!(srcs, vec!["/a.png"]);

        let ids = extract_all(Scope::Document(&doc), "div.row", Projection::Attr("id")).unwrap();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn test_scoped_extraction() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let rows = select(Scope::Document(&doc), "div.row").unwrap();
        assert_eq!(rows.len(), 2);

        let second = extract(Scope::Element(rows[1]), "span.name", Projection::Text).unwrap();
        assert_eq!(second, "Chelsea");
        assert!(contains(Scope::Element(rows[0]), "img").unwrap());
        assert!(!contains(Scope::Element(rows[1]), "span.score").unwrap());
    }

    #[test]
    fn test_element_lines() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let score = first(Scope::Document(&doc), "div.score").unwrap();
        assert_eq!(element_lines(score), "2\n-\n1");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let err = extract(Scope::Document(&doc), "div[", Projection::Text).unwrap_err();
        assert!(matches!(err, ExtractError::Selector(_)));
    }
}
