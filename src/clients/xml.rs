//! Response body decoding.
//!
//! XML documents are converted to the object shape the normalizer expects:
//! the root element becomes a single-key object, every child element is
//! collected into an array under its name, attributes live under `$` and
//! text under `_`. Elements with neither attributes nor children become
//! their text.
//!
//! ```rust
//! use mws_api::clients::xml::parse_xml;
//! use serde_json::json;
//!
//! let doc = r#"<Root xmlns="urn:x"><Item Id="1">a</Item><Item>b</Item></Root>"#;
//! assert_eq!(
//!     parse_xml(doc).unwrap(),
//!     json!({"Root": {
//!         "$": {"xmlns": "urn:x"},
//!         "Item": [{"$": {"Id": "1"}, "_": "a"}, "b"]
//!     }})
//! );
//! ```
//!
//! Tab-separated report bodies become an array of row objects keyed by the
//! header line.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

use crate::clients::errors::TransportError;

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl OpenElement {
    fn start(start: &BytesStart<'_>) -> Result<Self, TransportError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(TransportError::decode)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(TransportError::decode)?
                .into_owned();
            attributes.insert(key, Value::String(value));
        }

        Ok(Self {
            name,
            attributes,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self
            .children
            .entry(name)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => items.push(value),
            other => *other = Value::Array(vec![other.take(), value]),
        }
    }

    fn finish(self) -> (String, Value) {
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, Value::String(self.text));
        }

        let mut object = Map::new();
        if !self.attributes.is_empty() {
            object.insert("$".to_string(), Value::Object(self.attributes));
        }
        if !self.text.trim().is_empty() {
            object.insert("_".to_string(), Value::String(self.text));
        }
        object.extend(self.children);
        (self.name, Value::Object(object))
    }
}

/// Parses an XML document.
///
/// # Errors
///
/// Returns [`TransportError::Decode`] for malformed XML or a document
/// without a root element.
pub fn parse_xml(text: &str) -> Result<Value, TransportError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            TransportError::decode(format!(
                "invalid XML at position {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(start) => stack.push(OpenElement::start(&start)?),
            Event::Empty(start) => {
                let element = OpenElement::start(&start)?;
                close(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| TransportError::decode("unbalanced end tag"))?;
                close(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&text.unescape().map_err(TransportError::decode)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(TransportError::decode("unexpected end of document"));
    }
    root.ok_or_else(|| TransportError::decode("document has no root element"))
}

fn close(element: OpenElement, stack: &mut [OpenElement], root: &mut Option<Value>) {
    let (name, value) = element.finish();
    match stack.last_mut() {
        Some(parent) => parent.push_child(name, value),
        None => {
            let mut object = Map::new();
            object.insert(name, value);
            *root = Some(Value::Object(object));
        }
    }
}

/// Parses tab-separated text into an array of row objects.
///
/// The first line names the columns; missing trailing cells become empty
/// strings and blank lines are skipped.
#[must_use]
pub fn parse_delimited(text: &str) -> Value {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Value::Array(Vec::new());
    };
    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();

    let rows = lines
        .map(|line| {
            let mut cells = line.split('\t');
            let row: Map<String, Value> = columns
                .iter()
                .map(|column| {
                    let cell = cells.next().unwrap_or_default().trim_end_matches('\r');
                    ((*column).to_string(), Value::String(cell.to_string()))
                })
                .collect();
            Value::Object(row)
        })
        .collect();

    Value::Array(rows)
}

/// Returns `true` when the body looks like tab-separated text.
#[must_use]
pub fn looks_delimited(text: &str) -> bool {
    text.lines().next().is_some_and(|line| line.contains('\t'))
}

/// Decodes a response body according to its content type.
///
/// - XML (by content type, or a body starting with `<`) → [`parse_xml`]
/// - tab-separated or plain text with tab-separated lines → [`parse_delimited`]
/// - anything else → the body as a JSON string
///
/// # Errors
///
/// Returns [`TransportError::Decode`] for malformed XML.
pub fn decode_body(content_type: Option<&str>, body: &str) -> Result<Value, TransportError> {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();

    if content_type.contains("xml") || body.trim_start().starts_with("<?xml") {
        return parse_xml(body);
    }
    if content_type.contains("tab-separated")
        || ((content_type.starts_with("text/plain")
            || content_type.starts_with("application/octet-stream"))
            && looks_delimited(body))
    {
        return Ok(parse_delimited(body));
    }

    Ok(Value::String(body.to_string()))
}
