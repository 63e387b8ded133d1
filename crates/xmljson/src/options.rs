//! Conversion options

use tracing::warn;

use crate::error::{Error, Result};
use crate::value::Value;

/// Attribute prefix used when none is configured
pub const DEFAULT_ATTRIBUTE_PREFIX: &str = "@";

/// Option key holding the attribute prefix in an options object
pub const ATTRIBUTE_PREFIX_KEY: &str = "attributePrefix";
/// Option key holding the namespace flag in an options object
pub const PRESERVE_NAMESPACES_KEY: &str = "preserveNamespaces";

/// Options controlling one conversion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Prepended to every attribute key (and to `xmlns` bindings)
    pub attribute_prefix: String,
    /// Keep `prefix:` on element/attribute keys and emit `xmlns` bindings
    pub preserve_namespaces: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            attribute_prefix: DEFAULT_ATTRIBUTE_PREFIX.to_string(),
            preserve_namespaces: true,
        }
    }
}

impl ConversionOptions {
    /// Options with the given prefix and namespace handling
    pub fn new(attribute_prefix: impl Into<String>, preserve_namespaces: bool) -> Self {
        Self {
            attribute_prefix: attribute_prefix.into(),
            preserve_namespaces,
        }
    }

    /// Replace the attribute prefix
    pub fn with_attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_prefix = prefix.into();
        self
    }

    /// Keep or strip namespace prefixes and bindings
    pub fn with_preserve_namespaces(mut self, preserve: bool) -> Self {
        self.preserve_namespaces = preserve;
        self
    }

    /// Reject options the converter cannot honor.
    ///
    /// An empty prefix would make attribute keys indistinguishable from
    /// child element keys.
    pub fn validate(&self) -> Result<()> {
        if self.attribute_prefix.is_empty() {
            warn!("rejected empty attribute prefix");
            return Err(Error::configuration(format!(
                "`{ATTRIBUTE_PREFIX_KEY}` must not be empty"
            )));
        }
        if self.attribute_prefix.chars().any(char::is_control) {
            warn!("rejected attribute prefix with control characters");
            return Err(Error::configuration(format!(
                "`{ATTRIBUTE_PREFIX_KEY}` must not contain control characters"
            )));
        }
        Ok(())
    }

    /// Read options from a loosely typed object such as
    /// `{"attributePrefix": "@", "preserveNamespaces": true}`.
    ///
    /// Both keys are required; unknown keys are rejected.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(Error::configuration(format!(
                "options must be an object, found {}",
                value.type_name()
            )));
        };

        if let Some(unknown) = obj
            .keys()
            .find(|k| *k != ATTRIBUTE_PREFIX_KEY && *k != PRESERVE_NAMESPACES_KEY)
        {
            return Err(Error::configuration(format!("unknown option `{unknown}`")));
        }

        let attribute_prefix = match obj.get(ATTRIBUTE_PREFIX_KEY) {
            Some(Value::String(prefix)) => prefix.clone(),
            Some(other) => {
                return Err(Error::configuration(format!(
                    "`{ATTRIBUTE_PREFIX_KEY}` must be a string, found {}",
                    other.type_name()
                )))
            }
            None => {
                return Err(Error::configuration(format!(
                    "missing option `{ATTRIBUTE_PREFIX_KEY}`"
                )))
            }
        };

        let preserve_namespaces = match obj.get(PRESERVE_NAMESPACES_KEY) {
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                return Err(Error::configuration(format!(
                    "`{PRESERVE_NAMESPACES_KEY}` must be a boolean, found {}",
                    other.type_name()
                )))
            }
            None => {
                return Err(Error::configuration(format!(
                    "missing option `{PRESERVE_NAMESPACES_KEY}`"
                )))
            }
        };

        let options = Self {
            attribute_prefix,
            preserve_namespaces,
        };
        options.validate()?;
        Ok(options)
    }
}
