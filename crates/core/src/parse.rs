//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! origin pages and walking them with CSS selectors.
//!
//! # Example
//!
//! ```rust
//! use mangarelay_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{RelayError, Result};

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| RelayError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Represents a parsed HTML document.
///
/// # Example
///
/// ```rust
/// use mangarelay_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html);
/// assert_eq!(doc.select("p").unwrap()[0].text(), "Hello");
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// html5ever recovers from malformed markup, so parsing itself never fails.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mangarelay_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use mangarelay_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the text content of this element, descendants included.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the first text node that is a direct child of this element.
    ///
    /// Text inside nested elements is ignored, so for
    /// `<td><i class="icon"></i>Status :</td>` this yields `Status :`.
    pub fn own_text(&self) -> Option<String> {
        self.own_text_nodes().next().map(str::to_string)
    }

    /// Returns true when one of this element's direct text nodes, trimmed,
    /// equals `label`.
    pub fn has_own_text(&self, label: &str) -> bool {
        self.own_text_nodes().any(|t| t.trim() == label)
    }

    fn own_text_nodes(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.element
            .children()
            .filter_map(|node| node.value().as_text())
            .map(|text| &**text)
    }

    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Element siblings after this one with the given tag name, in document
    /// order.
    pub fn following_siblings_named(&self, tag: &str) -> Vec<Element<'a>> {
        self.element
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name().eq_ignore_ascii_case(tag))
            .map(|el| Element { element: el })
            .collect()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
        </head>
        <body>
            <h1>Heading</h1>
            <p class="content">Paragraph 1</p>
            <p class="content">Paragraph 2</p>
            <a href="https://example.com">Link</a>
            <table><tbody><tr>
                <td class="label"><i class="icon"></i>Status :</td>
                <td class="value">Ongoing</td>
                <td class="value">Extra</td>
            </tr></tbody></table>
        </body>
        </html>
    "#;

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML);
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_element_attributes() {
        let doc = Document::parse(SAMPLE_HTML);
        let elements = doc.select("a").unwrap();

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].attr("href"), Some("https://example.com"));
        assert_eq!(elements[0].attr("title"), None);
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(RelayError::HtmlParseError(_))));
    }

    #[test]
    fn test_own_text_skips_nested_elements() {
        let doc = Document::parse(SAMPLE_HTML);
        let label = &doc.select("td.label").unwrap()[0];

        assert_eq!(label.own_text(), Some("Status :".to_string()));
        assert!(label.has_own_text("Status :"));
        assert!(!label.has_own_text("Genres :"));
    }

    #[test]
    fn test_following_siblings() {
        let doc = Document::parse(SAMPLE_HTML);
        let label = &doc.select("td.label").unwrap()[0];
        let values = label.following_siblings_named("td");

        assert_eq!(values.len(), 2);
        assert_eq!(values[0].own_text(), Some("Ongoing".to_string()));
        assert_eq!(values[1].text(), "Extra");
    }
}
