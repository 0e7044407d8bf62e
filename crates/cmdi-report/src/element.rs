//! Immutable XML element tree and its quick-xml serialization.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

/// Attribute name for language tags.
pub(crate) const XML_LANG: &str = "xml:lang";

/// Characters outside the XML 1.0 `Char` production.
///
/// Escaping cannot represent them, so a document carrying one is not
/// well-formed.
pub(crate) fn is_forbidden_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// An XML element assembled by value.
///
/// Elements are built with consuming methods and never mutated once handed
/// to a parent. `text == None` with no children serializes as an empty tag;
/// `Some("")` serializes as an open/close pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Text-only element, written even when `text` is empty.
    pub fn text_node(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Tag the element with `xml:lang`.
    #[must_use]
    pub fn with_lang(self, lang: &str) -> Self {
        self.with_attr(XML_LANG, lang)
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First direct child called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Follow a chain of child names from this element.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Number of direct children called `name`.
    pub fn count(&self, name: &str) -> usize {
        self.children.iter().filter(|child| child.name == name).count()
    }

    /// First forbidden character in this subtree's text or attribute values,
    /// with the name of the element holding it.
    pub fn invalid_char(&self) -> Option<(&str, char)> {
        let own = self
            .text
            .iter()
            .chain(self.attributes.iter().map(|(_, value)| value))
            .find_map(|value| value.chars().find(|c| is_forbidden_xml_char(*c)));
        match own {
            Some(c) => Some((self.name.as_str(), c)),
            None => self.children.iter().find_map(Element::invalid_char),
        }
    }

    /// Write the element and its subtree.
    pub fn write<W: Write>(&self, writer: &mut Writer<W>) -> std::io::Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(element: &Element) -> String {
        let mut writer = Writer::new(Vec::new());
        element.write(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn childless_element_without_text_is_empty_tag() {
        assert_eq!(render(&Element::new("JournalFileProxyList")), "<JournalFileProxyList/>");
    }

    #[test]
    fn empty_text_keeps_open_close_pair() {
        let element = Element::text_node("publicationDate", "");
        assert_eq!(render(&element), "<publicationDate></publicationDate>");
    }

    #[test]
    fn text_is_escaped() {
        let element = Element::text_node("title", "Kot & <Pies>");
        assert_eq!(render(&element), "<title>Kot &amp; &lt;Pies&gt;</title>");
    }

    #[test]
    fn attributes_keep_insertion_order() {
        let element = Element::new("a").with_attr("z", "1").with_lang("pol");
        assert_eq!(render(&element), r#"<a z="1" xml:lang="pol"/>"#);
    }

    #[test]
    fn control_characters_are_found_in_text_and_attributes() {
        let tree = Element::new("root").with_child(
            Element::new("Authors").with_child(Element::text_node("title", "Lalka\u{0B}tom")),
        );
        assert_eq!(tree.invalid_char(), Some(("title", '\u{0B}')));

        let attr = Element::new("ResourceProxy").with_attr("id", "res\u{1}");
        assert_eq!(attr.invalid_char(), Some(("ResourceProxy", '\u{1}')));
    }

    #[test]
    fn whitespace_controls_are_allowed() {
        let element = Element::text_node("Description", "a\tb\nc\rd");
        assert_eq!(element.invalid_char(), None);
        assert!(!is_forbidden_xml_char('\u{20}'));
        assert!(is_forbidden_xml_char('\u{0}'));
        assert!(is_forbidden_xml_char('\u{1F}'));
        assert!(is_forbidden_xml_char('\u{FFFE}'));
    }

    #[test]
    fn find_follows_child_names() {
        let tree = Element::new("root").with_child(
            Element::new("mid").with_child(Element::text_node("leaf", "x")),
        );
        assert_eq!(tree.find(&["mid", "leaf"]).and_then(Element::text), Some("x"));
        assert!(tree.find(&["mid", "missing"]).is_none());
        assert_eq!(tree.count("mid"), 1);
    }
}
