//! JSON and XML decoding into [`Tree`].
//!
//! XML has no native maps or lists, so elements are folded the way a generic
//! XML-to-map reader would:
//!
//! - the root element's name is dropped; its content is the document
//! - attributes and child elements become map entries
//! - repeated child names collapse into a list, in document order
//! - an element with only text (or nothing) becomes a string
//! - text next to attributes or children is kept under the `""` key

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::Map;

use crate::{DecodeError, DocumentFormat, Tree};

/// Same element nesting limit serde_json applies to JSON input.
const MAX_XML_DEPTH: usize = 128;

/// Decode raw document bytes.
pub fn decode(bytes: &[u8], format: DocumentFormat) -> Result<Tree, DecodeError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_slice(bytes)?),
        DocumentFormat::Xml => decode_xml(bytes),
    }
}

struct Frame {
    name: String,
    entries: Map<String, Tree>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            name: element_name(start),
            entries: attributes(start)?,
            text: String::new(),
        })
    }

    fn finish(self) -> (String, Tree) {
        let value = if self.entries.is_empty() {
            Tree::String(self.text)
        } else {
            let mut entries = self.entries;
            if !self.text.is_empty() {
                insert_child(&mut entries, String::new(), Tree::String(self.text));
            }
            Tree::Object(entries)
        };
        (self.name, value)
    }
}

fn decode_xml(bytes: &[u8]) -> Result<Tree, DecodeError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Tree> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(DecodeError::MalformedXml("multiple root elements".into()));
                }
                if stack.len() >= MAX_XML_DEPTH {
                    return Err(DecodeError::MalformedXml("nesting too deep".into()));
                }
                stack.push(Frame::open(&start)?);
            }
            Event::Empty(start) => {
                if root.is_some() {
                    return Err(DecodeError::MalformedXml("multiple root elements".into()));
                }
                let (name, value) = Frame::open(&start)?.finish();
                close(&mut stack, &mut root, name, value);
            }
            Event::End(_) => {
                // Reader checks that end names match their start tags.
                let frame = stack
                    .pop()
                    .ok_or_else(|| DecodeError::MalformedXml("unexpected closing tag".into()))?;
                let (name, value) = frame.finish();
                close(&mut stack, &mut root, name, value);
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(cdata) => {
                push_text(&mut stack, &String::from_utf8_lossy(&cdata))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(DecodeError::MalformedXml(format!(
            "unclosed element <{}>",
            stack[stack.len() - 1].name
        )));
    }
    root.ok_or(DecodeError::EmptyXml)
}

fn close(stack: &mut [Frame], root: &mut Option<Tree>, name: String, value: Tree) {
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.entries, name, value),
        None => *root = Some(value),
    }
}

fn push_text(stack: &mut [Frame], text: &str) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(DecodeError::MalformedXml(
            "text outside of root element".into(),
        )),
    }
}

fn insert_child(entries: &mut Map<String, Tree>, name: String, value: Tree) {
    match entries.get_mut(&name) {
        None => {
            entries.insert(name, value);
        }
        Some(Tree::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Tree::Array(vec![first, value]);
        }
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn attributes(start: &BytesStart<'_>) -> Result<Map<String, Tree>, DecodeError> {
    let mut entries = Map::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        insert_child(&mut entries, key, Tree::String(value));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_passes_through() {
        let tree = decode(br#"{"name": "Grand", "stars": 4}"#, DocumentFormat::Json).unwrap();
        assert_eq!(tree, json!({"name": "Grand", "stars": 4}));
    }

    #[test]
    fn malformed_json_fails() {
        let err = decode(b"{not json", DocumentFormat::Json).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn xml_root_content_becomes_map() {
        let xml = br#"<hotel><name>Grand</name><city>Paris</city></hotel>"#;
        let tree = decode(xml, DocumentFormat::Xml).unwrap();
        assert_eq!(tree, json!({"name": "Grand", "city": "Paris"}));
    }

    #[test]
    fn xml_repeated_children_become_list() {
        let xml = br#"
            <hotel>
                <image><url>http://x/a.jpg</url></image>
                <image><url>http://x/b.png</url></image>
            </hotel>"#;
        let tree = decode(xml, DocumentFormat::Xml).unwrap();
        assert_eq!(
            tree,
            json!({"image": [{"url": "http://x/a.jpg"}, {"url": "http://x/b.png"}]})
        );
    }

    #[test]
    fn xml_attributes_and_mixed_text() {
        let xml = br#"<hotel id="7"><rating scale="5">4</rating><empty/></hotel>"#;
        let tree = decode(xml, DocumentFormat::Xml).unwrap();
        assert_eq!(
            tree,
            json!({"id": "7", "rating": {"scale": "5", "": "4"}, "empty": ""})
        );
    }

    #[test]
    fn xml_entities_and_cdata() {
        let xml = br#"<h><a>Tom &amp; Jerry</a><b><![CDATA[<raw>]]></b></h>"#;
        let tree = decode(xml, DocumentFormat::Xml).unwrap();
        assert_eq!(tree, json!({"a": "Tom & Jerry", "b": "<raw>"}));
    }

    #[test]
    fn xml_with_declaration_and_comments() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
            <!-- provider export -->
            <hotel><name>Inn</name></hotel>"#;
        let tree = decode(xml, DocumentFormat::Xml).unwrap();
        assert_eq!(tree, json!({"name": "Inn"}));
    }

    #[test]
    fn xml_mismatched_tags_fail() {
        let err = decode(b"<a><b></a>", DocumentFormat::Xml).unwrap_err();
        assert!(matches!(err, DecodeError::Xml(_)));
    }

    #[test]
    fn xml_unclosed_root_fails() {
        let err = decode(b"<a><b>x</b>", DocumentFormat::Xml).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedXml(_) | DecodeError::Xml(_)));
    }

    #[test]
    fn xml_empty_document_fails() {
        let err = decode(b"   ", DocumentFormat::Xml).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyXml));
    }

    fn nested_xml(depth: usize) -> Vec<u8> {
        let mut xml = String::from("<root>");
        xml.push_str(&"<a>".repeat(depth));
        xml.push_str("x");
        xml.push_str(&"</a>".repeat(depth));
        xml.push_str("</root>");
        xml.into_bytes()
    }

    #[test]
    fn xml_nesting_within_limit_decodes() {
        let tree = decode(&nested_xml(MAX_XML_DEPTH - 1), DocumentFormat::Xml).unwrap();
        let mut node = &tree;
        for _ in 0..MAX_XML_DEPTH - 2 {
            node = &node["a"];
        }
        assert_eq!(node["a"], "x");
    }

    #[test]
    fn xml_nesting_too_deep_fails() {
        let err = decode(&nested_xml(100_000), DocumentFormat::Xml).unwrap_err();
        match err {
            DecodeError::MalformedXml(msg) => assert_eq!(msg, "nesting too deep"),
            other => panic!("expected nesting error, got {other:?}"),
        }
    }

    #[test]
    fn xml_two_roots_fail() {
        let err = decode(b"<a/><b/>", DocumentFormat::Xml).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedXml(_)));
    }
}
