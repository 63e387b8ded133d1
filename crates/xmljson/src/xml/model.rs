//! XML node model consumed by the converter

/// Namespace URI bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A parsed XML document: its top-level nodes in document order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    /// Document holding `children` as its top-level nodes
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// The first top-level element
    pub fn root(&self) -> Option<&Element> {
        self.children.iter().find_map(Node::as_element)
    }
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl Node {
    /// Text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Self::Comment(content.into())
    }

    /// Returns the element if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Attribute as written in the source: qualified name and unescaped value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    /// Attribute with a qualified `name`
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name without its `prefix:` part
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// True for `xmlns` and `xmlns:*`
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

/// `xmlns` / `xmlns:prefix` binding declared on an element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespace {
    /// `None` for the default namespace
    pub prefix: Option<String>,
    pub uri: String,
}

impl Namespace {
    /// Binding of `prefix` (or the default namespace) to `uri`
    pub fn new(prefix: Option<&str>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.map(str::to_owned),
            uri: uri.into(),
        }
    }

    /// Attribute name this binding is written under
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        }
    }
}

/// XML element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub local_name: String,
    pub namespace_uri: Option<String>,
    pub prefix: Option<String>,
    /// Bindings declared on this element, excluding inherited ones
    pub namespaces: Vec<Namespace>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    /// Unprefixed element outside any namespace
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace_uri: None,
            prefix: None,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Place the element in `uri`, written with `prefix` (or unprefixed)
    pub fn in_namespace(mut self, prefix: Option<&str>, uri: impl Into<String>) -> Self {
        self.prefix = prefix.map(str::to_owned);
        self.namespace_uri = Some(uri.into());
        self
    }

    /// Declare a namespace binding on this element
    pub fn declare(mut self, prefix: Option<&str>, uri: impl Into<String>) -> Self {
        self.namespaces.push(Namespace::new(prefix, uri));
        self
    }

    /// Append an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Append a child node
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Append a text node
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.children.push(Node::Text(content.into()));
        self
    }

    /// `prefix:local` when prefixed, `local` otherwise
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// True when any child is an element
    pub fn has_element_children(&self) -> bool {
        self.children.iter().any(|c| matches!(c, Node::Element(_)))
    }

    /// Child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Node::as_element)
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            if let Node::Element(element) = &mut node {
                pending.append(&mut element.children);
            }
        }
    }
}

/// XML whitespace: space, tab, carriage return and line feed
pub fn is_xml_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Split `prefix:local` into its parts
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}
