//! Owned XML element tree and its pretty serializer.
//!
//! The builder assembles an [`Element`] tree first and serializes it in one
//! pass, so child order is exactly construction order.

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{BuildError, BuildResult};

/// Indentation width of the serialized document.
const INDENT_SIZE: usize = 2;

/// A namespace-qualified element (`prefix:Local`) with ordered attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Element with text content only.
    pub fn text_element(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), xml_chars_only(value.into())));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(xml_chars_only(text.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct children named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Serialize as a UTF-8 document with an XML declaration.
    ///
    /// Elements without text and children are written self-closing; text is
    /// kept on the same line as its tags.
    pub fn to_xml_string(&self) -> BuildResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);
        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        self.write_to(&mut writer)?;

        let mut xml = String::from_utf8(writer.into_inner())
            .map_err(|e| BuildError::Serialize(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> BuildResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        let text = self.text.as_deref().filter(|t| !t.is_empty());
        if text.is_none() && self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        if let Some(text) = text {
            // only `&`, `<` and `>` need escaping in text content
            let escaped = partial_escape(text);
            write_event(writer, Event::Text(BytesText::from_escaped(escaped)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

/// `true` for characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}'
            | '\u{A}'
            | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Drop characters XML 1.0 cannot carry, such as vertical tabs.
pub fn xml_chars_only(value: String) -> String {
    if value.chars().all(is_xml_char) {
        value
    } else {
        value.chars().filter(|&c| is_xml_char(c)).collect()
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> BuildResult<()> {
    writer
        .write_event(event)
        .map_err(|e| BuildError::Serialize(e.to_string()))
}
