pub mod cobertura;
pub mod jacoco;

use std::str::FromStr;

use quick_xml::events::BytesStart;
use quick_xml::reader::Reader;

use crate::error::{JacocovError, Result};

pub(crate) fn xml_reader(input: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    reader
}

pub(crate) fn xml_err(source: quick_xml::Error, reader: &Reader<&[u8]>) -> JacocovError {
    JacocovError::Xml {
        source,
        position: reader.buffer_position(),
    }
}

/// Start tags not yet closed. A document that ends while any are open, or
/// that has no root element, is truncated and rejected.
pub(crate) struct OpenTags {
    root: &'static str,
    seen_root: bool,
    names: Vec<String>,
}

impl OpenTags {
    pub fn new(root: &'static str) -> Self {
        Self {
            root,
            seen_root: false,
            names: Vec::new(),
        }
    }

    /// Record a start tag. The first tag of the document must be the root.
    pub fn start(&mut self, e: &BytesStart, position: usize) -> Result<()> {
        self.check_root(e, position)?;
        self.names
            .push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
        Ok(())
    }

    /// Record a self-closing tag.
    pub fn empty(&mut self, e: &BytesStart, position: usize) -> Result<()> {
        self.check_root(e, position)
    }

    pub fn end(&mut self) {
        self.names.pop();
    }

    /// Called at end of input.
    pub fn finish(&self, reader: &Reader<&[u8]>) -> Result<()> {
        if let Some(name) = self.names.last() {
            let source = quick_xml::Error::UnexpectedEof(format!("<{name}>"));
            return Err(xml_err(source, reader));
        }
        if !self.seen_root {
            let source = quick_xml::Error::UnexpectedEof(format!("<{}>", self.root));
            return Err(xml_err(source, reader));
        }
        Ok(())
    }

    fn check_root(&mut self, e: &BytesStart, position: usize) -> Result<()> {
        if self.seen_root {
            return Ok(());
        }
        self.seen_root = true;
        let name = e.name();
        if name.as_ref() == self.root.as_bytes() {
            Ok(())
        } else {
            Err(JacocovError::UnexpectedRoot {
                expected: self.root,
                found: String::from_utf8_lossy(name.as_ref()).into_owned(),
                position,
            })
        }
    }
}

/// Look up a single attribute value by key.
pub(crate) fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// An element being decoded, with enough context to report where a bad
/// attribute was found.
pub(crate) struct Element<'a, 'b> {
    pub name: &'static str,
    pub start: &'a BytesStart<'b>,
    pub position: usize,
}

impl<'a, 'b> Element<'a, 'b> {
    pub fn new(name: &'static str, start: &'a BytesStart<'b>, position: usize) -> Self {
        Self {
            name,
            start,
            position,
        }
    }

    pub fn optional(&self, attribute: &'static str) -> Option<String> {
        get_attr(self.start, attribute.as_bytes())
    }

    pub fn required(&self, attribute: &'static str) -> Result<String> {
        self.optional(attribute)
            .ok_or(JacocovError::MissingAttribute {
                element: self.name,
                attribute,
                position: self.position,
            })
    }

    /// Parse an optional attribute, falling back to `default` when absent.
    pub fn parsed_or<T: FromStr>(&self, attribute: &'static str, default: T) -> Result<T> {
        match self.optional(attribute) {
            Some(value) => self.parse_value(attribute, value),
            None => Ok(default),
        }
    }

    pub fn parsed<T: FromStr>(&self, attribute: &'static str) -> Result<T> {
        let value = self.required(attribute)?;
        self.parse_value(attribute, value)
    }

    fn parse_value<T: FromStr>(&self, attribute: &'static str, value: String) -> Result<T> {
        value
            .trim()
            .parse()
            .map_err(|_| JacocovError::InvalidAttribute {
                element: self.name,
                attribute,
                value,
                position: self.position,
            })
    }
}
