//! Minimal queryable-document capability used by the extractor.
//!
//! The extractor only needs "find elements by tag and optional class" and
//! "read text / attribute". [`Element`] captures exactly that so the
//! extraction logic can run against any parsed-markup backend; [`HtmlPage`]
//! is the `scraper`-backed implementation used in production.

use scraper::{ElementRef, Html, Selector};

/// A tag plus optional class, e.g. `span.price` or `h2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelector {
    pub tag: String,
    pub class: Option<String>,
}

impl TagSelector {
    #[must_use]
    pub fn new(tag: &str, class: Option<&str>) -> Self {
        Self {
            tag: tag.to_string(),
            class: class.map(str::to_string),
        }
    }

    /// Parse `"tag"` or `"tag.class"`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((tag, class)) => Self::new(tag, Some(class)),
            None => Self::new(raw, None),
        }
    }
}

impl std::fmt::Display for TagSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}.{class}", self.tag),
            None => f.write_str(&self.tag),
        }
    }
}

/// A node in already-parsed markup.
pub trait Element: Sized {
    /// All descendants matching `selector`, in document order.
    fn find_all(&self, selector: &TagSelector) -> Vec<Self>;

    /// Text content with whitespace runs collapsed and ends trimmed.
    fn text(&self) -> String;

    fn attr(&self, name: &str) -> Option<String>;

    /// First descendant matching `selector`.
    fn find(&self, selector: &TagSelector) -> Option<Self> {
        self.find_all(selector).into_iter().next()
    }

    /// Trimmed text of the first match, or `None` if absent or blank.
    fn find_text(&self, selector: &TagSelector) -> Option<String> {
        self.find(selector)
            .map(|el| el.text())
            .filter(|text| !text.is_empty())
    }
}

/// An owned, parsed HTML document.
pub struct HtmlPage {
    html: Html,
}

impl HtmlPage {
    /// Parse a full document. Never fails: malformed markup is repaired by
    /// the HTML5 parser, and an empty string yields an empty document.
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    #[must_use]
    pub fn root(&self) -> HtmlElement<'_> {
        HtmlElement(self.html.root_element())
    }
}

/// `scraper`-backed [`Element`].
#[derive(Clone, Copy)]
pub struct HtmlElement<'a>(ElementRef<'a>);

impl Element for HtmlElement<'_> {
    fn find_all(&self, selector: &TagSelector) -> Vec<Self> {
        let Some(css) = build_selector(selector) else {
            tracing::debug!(%selector, "unusable tag selector; treating as no match");
            return Vec::new();
        };
        self.0.select(&css).map(HtmlElement).collect()
    }

    fn text(&self) -> String {
        collapse_whitespace(&self.0.text().collect::<Vec<_>>().join(" "))
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.0.value().attr(name).map(str::to_string)
    }
}

fn is_css_ident(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn build_selector(selector: &TagSelector) -> Option<Selector> {
    if !is_css_ident(&selector.tag) {
        return None;
    }
    let css = match selector.class.as_deref() {
        Some(class) if is_css_ident(class) => format!("{}.{class}", selector.tag),
        Some(_) => return None,
        None => selector.tag.clone(),
    };
    Selector::parse(&css).ok()
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
