//! XML node model and tree builder

pub mod model;
pub mod reader;

pub use model::{Attribute, Document, Element, Namespace, Node};
pub use reader::{Reader, ReaderConfig};
