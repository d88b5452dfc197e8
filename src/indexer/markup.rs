//! Verse markup tree
//!
//! A small, representation-independent tree of text runs and formatting
//! wrappers. [`parse_markup`] builds it from an HTML fragment with
//! `quick-xml`, tolerating the usual HTML looseness: void elements like
//! `<br>`, unclosed wrappers and HTML entities.

use std::borrow::Cow;

use quick_xml::escape::{partial_escape, unescape_with};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::PsalterError;

/// HTML elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A node of verse markup.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    /// Decoded character data.
    Text(String),
    /// A formatting wrapper; its boundaries never split or number words.
    Element(Element),
    /// Markup emitted unchanged: void tags, comments, stray end tags.
    Verbatim(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub open_tag: String,
    pub children: Vec<MarkupNode>,
    /// `None` when the source never closed the element.
    pub close_tag: Option<String>,
}

impl MarkupNode {
    pub fn text(text: impl Into<String>) -> Self {
        MarkupNode::Text(text.into())
    }

    /// Wrap `children` in `<tag>...</tag>`.
    pub fn element(tag: &str, children: Vec<MarkupNode>) -> Self {
        MarkupNode::Element(Element {
            open_tag: format!("<{}>", tag),
            children,
            close_tag: Some(format!("</{}>", tag)),
        })
    }
}

/// Parse an HTML fragment into markup nodes.
///
/// # Example
/// ```rust
/// use psalter::indexer::{parse_markup, MarkupNode};
///
/// let nodes = parse_markup("<b>שִׁיר</b> לְדָוִד").unwrap();
/// assert_eq!(nodes.len(), 2);
/// assert!(matches!(&nodes[1], MarkupNode::Text(t) if t == " לְדָוִד"));
/// ```
pub fn parse_markup(markup: &str) -> Result<Vec<MarkupNode>, PsalterError> {
    let mut reader = Reader::from_str(markup);
    reader.check_end_names(false);
    reader.trim_text(false);

    let mut root: Vec<MarkupNode> = Vec::new();
    let mut open: Vec<(String, Element)> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| PsalterError::MarkupError {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                let name = tag_name(e.name().as_ref());
                let open_tag = format!("<{}>", String::from_utf8_lossy(&e));
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    attach(&mut open, &mut root, MarkupNode::Verbatim(open_tag));
                } else {
                    open.push((
                        name,
                        Element {
                            open_tag,
                            children: Vec::new(),
                            close_tag: None,
                        },
                    ));
                }
            }
            Event::End(e) => {
                let name = tag_name(e.name().as_ref());
                let close_tag = format!("</{}>", String::from_utf8_lossy(&e));
                match open.iter().rposition(|(open_name, _)| *open_name == name) {
                    Some(pos) => {
                        // Anything opened after the match is closed implicitly.
                        while open.len() > pos + 1 {
                            close_top(&mut open, &mut root, None);
                        }
                        close_top(&mut open, &mut root, Some(close_tag));
                    }
                    None => attach(&mut open, &mut root, MarkupNode::Verbatim(close_tag)),
                }
            }
            Event::Empty(e) => {
                let tag = format!("<{}/>", String::from_utf8_lossy(&e));
                attach(&mut open, &mut root, MarkupNode::Verbatim(tag));
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(&e);
                attach(&mut open, &mut root, MarkupNode::Text(decode_text(&raw)));
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                attach(&mut open, &mut root, MarkupNode::Text(text));
            }
            Event::Comment(e) => {
                let comment = format!("<!--{}-->", String::from_utf8_lossy(&e));
                attach(&mut open, &mut root, MarkupNode::Verbatim(comment));
            }
            Event::Eof => break,
            other => tracing::trace!(?other, "skipping non-content markup"),
        }
    }

    while !open.is_empty() {
        close_top(&mut open, &mut root, None);
    }

    Ok(root)
}

/// Serialize text for inclusion in markup.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    partial_escape(text)
}

fn tag_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

fn attach(open: &mut [(String, Element)], root: &mut Vec<MarkupNode>, node: MarkupNode) {
    match open.last_mut() {
        Some((_, parent)) => parent.children.push(node),
        None => root.push(node),
    }
}

fn close_top(
    open: &mut Vec<(String, Element)>,
    root: &mut Vec<MarkupNode>,
    close_tag: Option<String>,
) {
    if let Some((_, mut element)) = open.pop() {
        element.close_tag = close_tag;
        attach(open, root, MarkupNode::Element(element));
    }
}

/// Decode character and entity references. Unknown entities leave the run
/// as written.
fn decode_text(raw: &str) -> String {
    match unescape_with(raw, resolve_entity) {
        Ok(text) => text.into_owned(),
        Err(e) => {
            tracing::debug!(error = %e, "keeping undecodable text as written");
            raw.to_string()
        }
    }
}

/// XML's predefined entities plus the HTML ones that show up in verse text.
fn resolve_entity(entity: &str) -> Option<&'static str> {
    let resolved = match entity {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => "\u{00A0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "zwnj" => "\u{200C}",
        "zwj" => "\u{200D}",
        "lrm" => "\u{200E}",
        "rlm" => "\u{200F}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        _ => return None,
    };
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_elements() {
        let nodes = parse_markup("<b>a <i>b</i></b>c").unwrap();
        assert_eq!(
            nodes,
            vec![
                MarkupNode::element(
                    "b",
                    vec![
                        MarkupNode::text("a "),
                        MarkupNode::element("i", vec![MarkupNode::text("b")]),
                    ]
                ),
                MarkupNode::text("c"),
            ]
        );
    }

    #[test]
    fn test_void_and_stray_tags() {
        let nodes = parse_markup("a<br>b</span>").unwrap();
        assert_eq!(
            nodes,
            vec![
                MarkupNode::text("a"),
                MarkupNode::Verbatim("<br>".to_string()),
                MarkupNode::text("b"),
                MarkupNode::Verbatim("</span>".to_string()),
            ]
        );
    }

    #[test]
    fn test_unclosed_element() {
        let nodes = parse_markup("<i>open").unwrap();
        assert_eq!(
            nodes,
            vec![MarkupNode::Element(Element {
                open_tag: "<i>".to_string(),
                children: vec![MarkupNode::text("open")],
                close_tag: None,
            })]
        );
    }

    #[test]
    fn test_entities_decoded() {
        let nodes = parse_markup("a&nbsp;b &amp; c&#x5D0;").unwrap();
        assert_eq!(nodes, vec![MarkupNode::text("a\u{00A0}b & c\u{05D0}")]);
    }

    #[test]
    fn test_attributes_preserved() {
        let nodes = parse_markup(r#"<span class="mam-spi-pe">x</span>"#).unwrap();
        match &nodes[0] {
            MarkupNode::Element(element) => {
                assert_eq!(element.open_tag, r#"<span class="mam-spi-pe">"#);
                assert_eq!(element.close_tag.as_deref(), Some("</span>"));
            }
            other => panic!("expected element, got {:?}", other),
        }
    }
}
