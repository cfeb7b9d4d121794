//! Single-page content isolation.
//!
//! Locates the primary content region by a two-step probe (the generator's
//! `article.doc` container, then any `article`), strips navigation and
//! script descendants, and resolves the page title.

use scraper::{Html, Selector};

/// Isolated content from one page.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// `<title>` text, when present and non-empty.
    pub title: Option<String>,
    /// The sanitized article fragment (outer HTML).
    pub body_html: String,
}

/// Probe a page for its primary content region.
///
/// Returns `None` when neither container exists — many generated pages are
/// pure navigation or index shells, and that is not an error.
pub fn extract_page(html: &str) -> Option<ExtractedPage> {
    let doc = Html::parse_document(html);

    let doc_article = Selector::parse("article.doc").unwrap();
    let any_article = Selector::parse("article").unwrap();

    let article = doc
        .select(&doc_article)
        .next()
        .or_else(|| doc.select(&any_article).next())?;

    Some(ExtractedPage {
        title: extract_title(&doc),
        body_html: strip_chrome(&article.html()),
    })
}

/// Remove side-navigation, in-page navigation, and script descendants —
/// they carry no durable semantic content and would pollute downstream
/// text processing.
fn strip_chrome(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let chrome_sel = Selector::parse("aside, nav, script").unwrap();

    let mut result = html.to_string();
    for el in fragment.select(&chrome_sel) {
        result = result.replace(&el.html(), "");
    }
    result
}

/// The document's `<title>` text, trimmed; `None` when absent or empty.
fn extract_title(doc: &Html) -> Option<String> {
    let title_sel = Selector::parse("title").unwrap();
    let text = doc
        .select(&title_sel)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

/// Flatten a page's relative path into a unique output file name.
///
/// Literal underscores are doubled before path separators become `_-`, so
/// the encoding is injective: `a/b/index.html` and `a_b/index.html` can
/// never map to the same flat name.
pub fn flatten_rel_path(rel_path: &std::path::Path) -> String {
    let joined = rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    joined.replace('_', "__").replace('/', "_-")
}
