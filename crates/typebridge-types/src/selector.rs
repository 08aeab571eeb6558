//! Format selectors.

use std::collections::BTreeMap;

use crate::value::Value;

/// A named format plus its option dictionary.
///
/// Selectors are validated against the format's option schema when they
/// cross into the host, so holders can assume every option is declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatSelector {
    pub format: String,
    pub options: BTreeMap<String, Value>,
}

impl FormatSelector {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }
}
