//! xmljson - structural XML-to-JSON conversion
//!
//! Converts an XML node tree into a JSON value tree: attributes become
//! prefixed keys, repeated siblings become arrays, namespace prefixes and
//! `xmlns` bindings are kept or stripped on request, and text-only elements
//! collapse to plain strings.
//!
//! # Quick Start
//!
//! ```
//! use xmljson::{xml_to_json, ConversionOptions};
//! # fn main() -> Result<(), xmljson::Error> {
//! let value = xml_to_json(
//!     "<r><x>1</x><x>2</x><y id=\"7\"/></r>",
//!     &ConversionOptions::default(),
//! )?;
//! assert_eq!(value.to_string(), r#"{"r":{"x":["1","2"],"y":{"@id":"7"}}}"#);
//! # Ok(())
//! # }
//! ```
//!
//! Trees can also be built by hand:
//!
//! ```
//! use xmljson::{convert, ConversionOptions, Element, Node};
//! # fn main() -> Result<(), xmljson::Error> {
//! let root = Node::from(Element::new("name").text("Hello"));
//! let value = convert(&root, &ConversionOptions::default())?;
//! assert_eq!(value.to_string(), r#"{"name":"Hello"}"#);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use tracing::instrument;

pub mod error;
pub use error::{Error, ErrorKind, Result};

pub mod value;
pub use value::{Array, Object, Value};

pub mod json;

pub mod options;
pub use options::ConversionOptions;

pub mod xml;
pub use xml::{Attribute, Document, Element, Namespace, Node, Reader, ReaderConfig};

pub mod convert;
pub use convert::{convert, convert_document, Converter, TEXT_KEY};

pub mod decode;

/// Build a document from XML text
pub fn from_xml_str(s: &str) -> Result<Document> {
    Reader::new(s).read()
}

/// Build a document from XML text with custom reader limits
pub fn from_xml_str_with_config(s: &str, config: ReaderConfig) -> Result<Document> {
    Reader::with_config(s, config).read()
}

/// Read XML text and convert it in one step.
///
/// Options are validated before the text is read.
#[instrument(level = "debug", skip_all, fields(len = s.len()))]
pub fn xml_to_json(s: &str, options: &ConversionOptions) -> Result<Value> {
    xml_to_json_with_config(s, options, ReaderConfig::default())
}

/// [`xml_to_json`] with custom reader limits
pub fn xml_to_json_with_config(
    s: &str,
    options: &ConversionOptions,
    config: ReaderConfig,
) -> Result<Value> {
    let converter = Converter::new(options)?;
    let document = from_xml_str_with_config(s, config)?;
    Ok(converter.convert_document(&document))
}
