//! Builds the node model from XML text using `quick-xml` events

use quick_xml::events::{BytesStart, Event};
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::xml::model::{
    is_xml_whitespace, split_qname, Attribute, Document, Element, Namespace, Node, XML_NAMESPACE,
};

/// Limits applied while building the tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

impl ReaderConfig {
    /// No nesting limit
    pub const fn unlimited() -> Self {
        Self { max_depth: 0 }
    }

    /// Limit nesting to `max_depth` levels (0 means unlimited)
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

/// XML tree builder
#[derive(Debug)]
pub struct Reader<'a> {
    source: &'a str,
    config: ReaderConfig,
}

/// In-scope namespace bindings, innermost last
#[derive(Debug, Default)]
struct Scopes {
    bindings: Vec<Namespace>,
    /// `bindings.len()` when each open element was entered
    marks: Vec<usize>,
}

impl Scopes {
    fn enter(&mut self, declared: &[Namespace]) {
        self.marks.push(self.bindings.len());
        self.bindings.extend_from_slice(declared);
    }

    fn exit(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.bindings.truncate(mark);
        }
    }

    /// Innermost binding for `prefix`; an empty default namespace means none
    fn resolve(&self, prefix: Option<&str>) -> Option<String> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE.to_string());
        }
        self.bindings
            .iter()
            .rev()
            .find(|ns| ns.prefix.as_deref() == prefix)
            .and_then(|ns| (!ns.uri.is_empty()).then(|| ns.uri.clone()))
    }
}

impl<'a> Reader<'a> {
    /// Reader with the default limits
    pub fn new(source: &'a str) -> Self {
        Self::with_config(source, ReaderConfig::default())
    }

    /// Reader with explicit limits
    pub fn with_config(source: &'a str, config: ReaderConfig) -> Self {
        Self { source, config }
    }

    /// Read the whole document
    #[instrument(level = "debug", skip_all, fields(len = self.source.len()))]
    pub fn read(self) -> Result<Document> {
        let mut events = quick_xml::Reader::from_str(self.source);
        events.config_mut().trim_text(false);

        let mut document = Document::default();
        let mut open: Vec<Element> = Vec::new();
        let mut scopes = Scopes::default();
        let mut elements = 0usize;

        loop {
            let offset = usize::try_from(events.buffer_position()).unwrap_or(usize::MAX);
            let event = events
                .read_event()
                .map_err(|e| Error::xml_at(offset, e.to_string()))?;

            match event {
                Event::Start(start) => {
                    self.check_depth(open.len() + 1, offset)?;
                    let element = build_element(&start, &mut scopes, offset)?;
                    elements += 1;
                    open.push(element);
                }
                Event::Empty(start) => {
                    self.check_depth(open.len() + 1, offset)?;
                    let element = build_element(&start, &mut scopes, offset)?;
                    scopes.exit();
                    elements += 1;
                    attach(&mut open, &mut document, Node::Element(element), offset)?;
                }
                Event::End(end) => {
                    let Some(element) = open.pop() else {
                        return Err(Error::xml_at(offset, "unexpected closing tag"));
                    };
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    if name != element.qualified_name() {
                        return Err(Error::xml_at(
                            offset,
                            format!(
                                "mismatched closing tag: expected </{}>, found </{name}>",
                                element.qualified_name()
                            ),
                        ));
                    }
                    scopes.exit();
                    attach(&mut open, &mut document, Node::Element(element), offset)?;
                }
                Event::Text(text) => {
                    let content = text
                        .unescape()
                        .map_err(|e| Error::xml_at(offset, e.to_string()))?;
                    attach_text(&mut open, content.into_owned(), offset)?;
                }
                Event::CData(data) => {
                    let content = String::from_utf8_lossy(&data).into_owned();
                    attach_text(&mut open, content, offset)?;
                }
                Event::Comment(comment) => {
                    let content = String::from_utf8_lossy(&comment).into_owned();
                    attach(&mut open, &mut document, Node::Comment(content), offset)?;
                }
                Event::PI(pi) => {
                    let raw = String::from_utf8_lossy(&pi).into_owned();
                    let (target, data) = match raw.split_once(char::is_whitespace) {
                        Some((target, data)) => (target.to_string(), data.trim_start().to_string()),
                        None => (raw.clone(), String::new()),
                    };
                    attach(
                        &mut open,
                        &mut document,
                        Node::ProcessingInstruction { target, data },
                        offset,
                    )?;
                }
                Event::Decl(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(element) = open.last() {
            return Err(Error::xml_at(
                self.source.len(),
                format!("unterminated element <{}>", element.qualified_name()),
            ));
        }
        if document.root().is_none() {
            return Err(Error::xml_at(self.source.len(), "no root element"));
        }

        debug!(elements, "built xml tree");
        Ok(document)
    }

    fn check_depth(&self, depth: usize, offset: usize) -> Result<()> {
        let max = self.config.max_depth;
        if max > 0 && depth > max {
            return Err(Error::new(
                ErrorKind::MaxDepthExceeded { max },
                format!("element nesting exceeds {max} levels at byte {offset}"),
            ));
        }
        Ok(())
    }
}

/// Build an element and push its namespace scope onto `scopes`
fn build_element(
    start: &BytesStart<'_>,
    scopes: &mut Scopes,
    offset: usize,
) -> Result<Element> {
    let qname = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let (prefix, local) = split_qname(&qname);
    if prefix == Some("xmlns") {
        return Err(Error::xml_at(offset, format!("reserved prefix on element <{qname}>")));
    }

    let mut declared = Vec::new();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::xml_at(offset, e.to_string()))?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::xml_at(offset, e.to_string()))?
            .into_owned();

        if name == "xmlns" {
            declared.push(Namespace::new(None, value));
        } else if let Some(bound) = name.strip_prefix("xmlns:") {
            declared.push(Namespace::new(Some(bound), value));
        } else {
            attributes.push(Attribute::new(name, value));
        }
    }
    scopes.enter(&declared);

    let namespace_uri = match prefix {
        Some(prefix) => Some(
            scopes
                .resolve(Some(prefix))
                .ok_or_else(|| Error::xml_at(offset, format!("unbound prefix `{prefix}` on <{qname}>")))?,
        ),
        None => scopes.resolve(None),
    };

    for attribute in &attributes {
        if let (Some(prefix), _) = split_qname(&attribute.name) {
            if scopes.resolve(Some(prefix)).is_none() {
                return Err(Error::xml_at(
                    offset,
                    format!("unbound prefix `{prefix}` on attribute `{}`", attribute.name),
                ));
            }
        }
    }

    Ok(Element {
        local_name: local.to_string(),
        namespace_uri,
        prefix: prefix.map(str::to_owned),
        namespaces: declared,
        attributes,
        children: Vec::new(),
    })
}

fn attach(open: &mut [Element], document: &mut Document, node: Node, offset: usize) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if matches!(node, Node::Element(_)) && document.root().is_some() {
                return Err(Error::xml_at(offset, "multiple root elements"));
            }
            document.children.push(node);
        }
    }
    Ok(())
}

fn attach_text(open: &mut [Element], content: String, offset: usize) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(Node::Text(content)),
        None if is_xml_whitespace(&content) => {}
        None => return Err(Error::xml_at(offset, "text outside the root element")),
    }
    Ok(())
}
