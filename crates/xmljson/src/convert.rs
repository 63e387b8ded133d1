//! XML tree to JSON value conversion
//!
//! Mapping rules:
//!
//! - an element becomes `{ key: value }`, where `key` is `prefix:local` when
//!   namespaces are preserved and the element is prefixed, `local` otherwise;
//! - an element with no attributes and no child elements becomes its text as
//!   a JSON string, or `null` when it has no text;
//! - otherwise the value is an object holding the element's `xmlns` bindings,
//!   then its other attributes (keys carry the attribute prefix), then
//!   `#text`, then child elements. Bindings always come before attributes,
//!   each group in source order;
//! - children whose keys collide are gathered into an array in document order;
//! - whitespace-only text next to child elements is dropped.
//!
//! The walk uses an explicit stack, so deeply nested input does not grow the
//! call stack.

use std::slice;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::options::ConversionOptions;
use crate::value::{GroupedObject, Object, Value};
use crate::xml::model::is_xml_whitespace;
use crate::xml::{Document, Element, Node};

/// Key holding an element's own text when it also has attributes or children
pub const TEXT_KEY: &str = "#text";

/// Convert a single node.
///
/// Elements yield a one-key object; a text node yields its string; comments
/// and processing instructions yield `null`.
#[instrument(
    level = "debug",
    skip_all,
    fields(prefix = %options.attribute_prefix, preserve_namespaces = options.preserve_namespaces)
)]
pub fn convert(root: &Node, options: &ConversionOptions) -> Result<Value> {
    let converter = Converter::new(options)?;
    Ok(converter.convert_node(root))
}

/// Convert every top-level element of a document into one object
#[instrument(
    level = "debug",
    skip_all,
    fields(prefix = %options.attribute_prefix, preserve_namespaces = options.preserve_namespaces)
)]
pub fn convert_document(document: &Document, options: &ConversionOptions) -> Result<Value> {
    let converter = Converter::new(options)?;
    Ok(converter.convert_document(document))
}

/// Converter bound to a validated set of options
#[derive(Clone, Copy, Debug)]
pub struct Converter<'o> {
    options: &'o ConversionOptions,
}

enum Step<'a> {
    /// Value complete without visiting children
    Leaf(String, Value),
    /// Children still to visit
    Branch(Frame<'a>),
}

struct Frame<'a> {
    key: String,
    entries: GroupedObject,
    children: slice::Iter<'a, Node>,
}

impl Frame<'_> {
    fn close(self) -> (String, Value) {
        (self.key, Value::Object(self.entries.finish()))
    }
}

impl<'o> Converter<'o> {
    /// Validate `options` and bind them
    pub fn new(options: &'o ConversionOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Convert one node; see [`convert`]
    pub fn convert_node(&self, node: &Node) -> Value {
        match node {
            Node::Element(element) => {
                let (key, value) = self.convert_element(element);
                Value::Object(Object::from_iter([(key, value)]))
            }
            Node::Text(text) => Value::String(text.clone()),
            Node::Comment(_) | Node::ProcessingInstruction { .. } => Value::Null,
        }
    }

    /// Convert a document; see [`convert_document`]
    pub fn convert_document(&self, document: &Document) -> Value {
        let mut top = GroupedObject::new();
        for element in document.children.iter().filter_map(Node::as_element) {
            let (key, value) = self.convert_element(element);
            top.push(key, value);
        }
        Value::Object(top.finish())
    }

    /// Key and value of one element
    pub fn convert_element(&self, root: &Element) -> (String, Value) {
        let mut stack = match self.open(root) {
            Step::Leaf(key, value) => return (key, value),
            Step::Branch(frame) => vec![frame],
        };
        let mut finished = None;
        let mut max_depth = 1usize;

        while let Some(frame) = stack.last_mut() {
            match frame.children.next() {
                Some(Node::Element(child)) => match self.open(child) {
                    Step::Leaf(key, value) => frame.entries.push(key, value),
                    Step::Branch(child_frame) => {
                        stack.push(child_frame);
                        max_depth = max_depth.max(stack.len());
                    }
                },
                // text was folded in when the frame opened
                Some(_) => {}
                None => {
                    if let Some(done) = stack.pop() {
                        let (key, value) = done.close();
                        match stack.last_mut() {
                            Some(parent) => parent.entries.push(key, value),
                            None => finished = Some((key, value)),
                        }
                    }
                }
            }
        }

        debug!(element = %root.qualified_name(), max_depth, "converted element");
        finished.unwrap_or_else(|| (self.element_key(root), Value::Null))
    }

    fn open<'a>(&self, element: &'a Element) -> Step<'a> {
        let key = self.element_key(element);
        let mut entries = GroupedObject::new();
        self.push_namespaces(element, &mut entries);
        self.push_attributes(element, &mut entries);

        let has_children = element.has_element_children();
        if entries.is_empty() && !has_children {
            return Step::Leaf(key, text_value(element));
        }

        if let Some(text) = own_text(element, has_children) {
            entries.push(TEXT_KEY.to_string(), Value::String(text));
        }

        if has_children {
            Step::Branch(Frame {
                key,
                entries,
                children: element.children.iter(),
            })
        } else {
            Step::Leaf(key, Value::Object(entries.finish()))
        }
    }

    fn element_key(&self, element: &Element) -> String {
        match &element.prefix {
            Some(prefix) if self.options.preserve_namespaces => {
                format!("{prefix}:{}", element.local_name)
            }
            _ => element.local_name.clone(),
        }
    }

    fn push_namespaces(&self, element: &Element, entries: &mut GroupedObject) {
        if !self.options.preserve_namespaces {
            return;
        }
        for namespace in &element.namespaces {
            entries.push(
                self.attribute_key(&namespace.attribute_name()),
                Value::String(namespace.uri.clone()),
            );
        }
    }

    fn push_attributes(&self, element: &Element, entries: &mut GroupedObject) {
        for attribute in &element.attributes {
            let name = if self.options.preserve_namespaces {
                attribute.name.as_str()
            } else if attribute.is_namespace_declaration() {
                continue;
            } else {
                attribute.local_name()
            };
            entries.push(self.attribute_key(name), Value::String(attribute.value.clone()));
        }
    }

    fn attribute_key(&self, name: &str) -> String {
        format!("{}{name}", self.options.attribute_prefix)
    }
}

fn text_segments(element: &Element) -> impl Iterator<Item = &str> {
    element.children.iter().filter_map(|child| match child {
        Node::Text(text) => Some(text.as_str()),
        _ => None,
    })
}

/// Value of an element with no attributes and no child elements
fn text_value(element: &Element) -> Value {
    let text: String = text_segments(element).collect();
    if text.is_empty() {
        Value::Null
    } else {
        Value::String(text)
    }
}

/// `#text` content of an element that also carries attributes or children
fn own_text(element: &Element, has_children: bool) -> Option<String> {
    let text: String = text_segments(element)
        .filter(|segment| !(has_children && is_xml_whitespace(segment)))
        .collect();
    if is_xml_whitespace(&text) {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_json(node: &Node) -> String {
        convert(node, &ConversionOptions::default())
            .map(|value| value.to_json_string())
            .unwrap_or_else(|err| err.to_string())
    }

    #[test]
    fn test_empty_element_is_null() {
        assert_eq!(to_json(&Element::new("a").into()), r#"{"a":null}"#);
    }

    #[test]
    fn test_text_element_collapses_to_string() {
        let node = Element::new("name").text("Hello").into();
        assert_eq!(to_json(&node), r#"{"name":"Hello"}"#);
    }

    #[test]
    fn test_attributes_use_prefix() {
        let node = Element::new("a").attr("id", "1").into();
        assert_eq!(to_json(&node), r#"{"a":{"@id":"1"}}"#);
    }

    #[test]
    fn test_text_with_attributes() {
        let node = Element::new("price").attr("currency", "EUR").text("9.99").into();
        assert_eq!(
            to_json(&node),
            r##"{"price":{"@currency":"EUR","#text":"9.99"}}"##
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        let node = Element::new("a")
            .child(Node::comment("note"))
            .text("x")
            .child(Node::ProcessingInstruction {
                target: "pi".to_string(),
                data: String::new(),
            })
            .into();
        assert_eq!(to_json(&node), r#"{"a":"x"}"#);
    }

    #[test]
    fn test_non_element_roots() {
        assert_eq!(to_json(&Node::text("hi")), r#""hi""#);
        assert_eq!(to_json(&Node::comment("c")), "null");
    }

    #[test]
    fn test_invalid_options_fail_before_output() {
        let node = Element::new("a").into();
        let result = convert(&node, &ConversionOptions::new("", true));
        assert!(matches!(result, Err(e) if e.is_configuration()));
    }

    #[test]
    fn test_bindings_precede_attributes() {
        let node = Element::new("a")
            .attr("id", "1")
            .declare(Some("p"), "urn:p")
            .into();
        assert_eq!(to_json(&node), r#"{"a":{"@xmlns:p":"urn:p","@id":"1"}}"#);
    }
}
