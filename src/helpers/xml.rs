//! Event-level XML reading shared by the OOXML and OpenDocument workbook readers.

use crate::error::ChartError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),

    #[error("Parse attribute '{0}' value '{1}' failed")]
    ParseAttributeValueError(String, String),

    #[error("Missing attribute '{0}'")]
    MissingAttributeError(String),
}

/// Buffered pull reader configured for workbook parts.
///
/// Empty elements are expanded so `<c/>` produces a start and an end event,
/// which lets the readers treat self-closing cells like ordinary ones.
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        XmlReader {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Returns the next event, or `None` at end of document.
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, ChartError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(ChartError::XmlError(error)),
        }
    }
}

pub(crate) trait XmlNodeHelper<'a> {
    /// Gets the unescaped value of an attribute by its qualified name.
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, ChartError>;

    /// Parses an attribute value to the specified type.
    fn parse_attribute_value<T: FromStr>(&'a self, name: &str) -> Result<Option<T>, ChartError>;

    /// Like `get_attribute_value` but a missing attribute is an error.
    fn require_attribute_value(&'a self, name: &str) -> Result<Cow<'a, str>, ChartError> {
        self.get_attribute_value(name)?
            .ok_or_else(|| XmlError::MissingAttributeError(name.to_owned()).into())
    }
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, ChartError> {
        match self.try_get_attribute(name)? {
            Some(attribute) => Ok(Some(attribute.unescape_value()?)),
            None => Ok(None),
        }
    }

    fn parse_attribute_value<T: FromStr>(&'a self, name: &str) -> Result<Option<T>, ChartError> {
        self.get_attribute_value(name)?
            .map(|value| {
                value.parse::<T>().map_err(|_| {
                    XmlError::ParseAttributeValueError(name.to_owned(), value.to_string()).into()
                })
            })
            .transpose()
    }
}

pub(crate) trait XmlTextContextHelper {
    /// Appends the decoded content of a text event.
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), ChartError>;

    /// Appends an entity or character reference (`&amp;`, `&#x41;`).
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), ChartError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), ChartError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), ChartError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }
        Ok(())
    }
}

/// Drives an `XmlReader` to the end of the document, matching each event
/// against the given arms. Unmatched events are ignored; `break` leaves the loop.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_text(xml: &str) -> Result<String, ChartError> {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Text(event) => text.push_bytes_text(&event)?,
            Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
        });
        Ok(text)
    }

    #[test]
    fn resolves_entities_and_character_references() {
        let text = collect_text("<t>Fish &amp; Chips &#65;&#x42;</t>").unwrap();
        assert_eq!(text, "Fish & Chips AB");
    }

    #[test]
    fn rejects_unknown_entity() {
        assert!(collect_text("<t>&bogus;</t>").is_err());
    }

    #[test]
    fn parses_attribute_values() -> Result<(), ChartError> {
        let mut reader = XmlReader::new(r#"<row r="12" spans="x"/>"#.as_bytes());
        let mut seen = false;
        match_xml_events!(reader => {
            Event::Start(event) => {
                assert_eq!(event.parse_attribute_value::<usize>("r")?, Some(12));
                assert!(event.parse_attribute_value::<usize>("spans").is_err());
                assert_eq!(event.get_attribute_value("missing")?, None);
                assert!(event.require_attribute_value("missing").is_err());
                seen = true;
            }
        });
        assert!(seen);
        Ok(())
    }
}
