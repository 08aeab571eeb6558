//! HTTP request and response option records.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::selector::FormatSelector;
use crate::value::Value;

/// Header name to values. Names are stored as given; lookups are
/// case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HttpHeaders(pub BTreeMap<String, Vec<String>>);

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cookies(pub Vec<Cookie>);

/// Options accepted by an HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpOptions {
    pub url: String,
    pub method: String,
    pub request_format: Option<FormatSelector>,
    pub response_format: Option<FormatSelector>,
    pub headers: HttpHeaders,
    pub cookies: Option<Cookies>,
    pub body: Option<Box<Value>>,
}

impl HttpOptions {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            request_format: None,
            response_format: None,
            headers: HttpHeaders::default(),
            cookies: None,
            body: None,
        }
    }
}

/// Outcome of an HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub success: bool,
    pub status_code: i32,
    pub status_message: String,
    pub headers: HttpHeaders,
    pub cookies: Cookies,
    pub body: Option<Box<Value>>,
}
