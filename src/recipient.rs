//! Message recipients and attribute resolution
//!
//! Stored messages refer to recipient attributes by variable name. The
//! [`Recipient`] trait is the seam where those names are resolved.

use crate::error::{Error, Result};
use crate::template::display_value;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A message recipient
pub trait Recipient: Send + Sync {
    /// Phone number messages are addressed to
    fn number(&self) -> &str;

    /// Resolve a named attribute for this recipient
    fn get_data(&self, variable: &str) -> Result<Value>;
}

/// Recipient backed by a phone number and a JSON attribute map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub number: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Profile {
    /// Create a profile with no attributes
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl Recipient for Profile {
    fn number(&self) -> &str {
        &self.number
    }

    /// Dotted names (`order.id`) walk into nested objects
    fn get_data(&self, variable: &str) -> Result<Value> {
        let mut parts = variable.split('.');
        let first = parts.next().unwrap_or_default();
        let mut current = self.attributes.get(first);

        for part in parts {
            current = current.and_then(|v| v.get(part));
        }

        current.cloned().ok_or_else(|| {
            Error::Variable(format!(
                "Recipient {} has no attribute '{}'",
                self.number, variable
            ))
        })
    }
}

/// Resolve a `placeholder -> variable` mapping into rendered values
pub fn resolve_variables(
    recipient: &dyn Recipient,
    mapping: &Map<String, Value>,
) -> Result<HashMap<String, String>> {
    mapping
        .iter()
        .map(|(placeholder, variable)| {
            let variable = variable.as_str().ok_or_else(|| {
                Error::InvalidMessage(format!(
                    "Variable for placeholder '{}' must be a string, got {}",
                    placeholder, variable
                ))
            })?;
            let value = recipient.get_data(variable)?;
            Ok((placeholder.clone(), display_value(&value)))
        })
        .collect()
}
