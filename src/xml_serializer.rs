// XML request serialization for the write operations (booking, vouchers)
//
// Two entry points share one writer: `serialize_mapping` takes a hand-built
// `XmlMap`, `serialize_object` walks any `Serialize` value. Equivalent data
// produces byte-identical documents through either path.
use crate::error::GoldenTourError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    // Element text
    Text(String),
    // Child elements, in insertion order
    Map(XmlMap),
    // Repeated sibling elements sharing the parent key
    List(Vec<XmlValue>),
}

impl From<&str> for XmlValue {
    fn from(value: &str) -> Self {
        XmlValue::Text(value.to_string())
    }
}

impl From<String> for XmlValue {
    fn from(value: String) -> Self {
        XmlValue::Text(value)
    }
}

impl From<u32> for XmlValue {
    fn from(value: u32) -> Self {
        XmlValue::Text(value.to_string())
    }
}

impl From<XmlMap> for XmlValue {
    fn from(value: XmlMap) -> Self {
        XmlValue::Map(value)
    }
}

impl<T: Into<XmlValue>> From<Vec<T>> for XmlValue {
    fn from(values: Vec<T>) -> Self {
        XmlValue::List(values.into_iter().map(Into::into).collect())
    }
}

// Ordered mapping from element name to value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlMap {
    entries: Vec<(String, XmlValue)>,
}

impl XmlMap {
    pub fn new() -> Self {
        Self::default()
    }

    // Insert or replace `key`. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<XmlValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<XmlValue>) -> Self {
        self.insert(key, value);
        self
    }

    // `None` leaves the mapping untouched, so the element is not emitted at all
    pub fn with_opt<V: Into<XmlValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl TryFrom<Value> for XmlMap {
    type Error = GoldenTourError;

    // Conversion helper for loosely structured JSON mappings
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match from_json(value)? {
            Some(XmlValue::Map(map)) => Ok(map),
            _ => Err(GoldenTourError::Serialization(
                "expected a mapping at the top level".to_string(),
            )),
        }
    }
}

// JSON nulls disappear: an absent optional field emits no element
fn from_json(value: Value) -> Result<Option<XmlValue>, GoldenTourError> {
    let converted = match value {
        Value::Null => return Ok(None),
        Value::Bool(flag) => XmlValue::Text(flag.to_string()),
        Value::Number(number) => XmlValue::Text(number.to_string()),
        Value::String(text) => XmlValue::Text(text),
        Value::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                if let Some(value) = from_json(item)? {
                    values.push(value);
                }
            }
            XmlValue::List(values)
        }
        Value::Object(fields) => {
            let mut map = XmlMap::new();
            for (key, field) in fields {
                if let Some(value) = from_json(field)? {
                    map.insert(key, value);
                }
            }
            XmlValue::Map(map)
        }
    };
    Ok(Some(converted))
}

// Serialize a document whose single top-level key names the root element.
pub fn serialize_mapping(document: &XmlMap) -> Result<String, GoldenTourError> {
    let mut entries = document.iter();
    match (entries.next(), entries.next()) {
        (Some((root, value)), None) => write_document(root, value),
        (None, _) => Err(GoldenTourError::Serialization(
            "document has no root element".to_string(),
        )),
        (Some(_), Some(_)) => Err(GoldenTourError::Serialization(format!(
            "document must have exactly one root element, found {}",
            document.len()
        ))),
    }
}

// Serialize a typed value as the content of a `root` element. Struct fields
// become child elements using their serialized (serde) names.
pub fn serialize_object<T: Serialize + ?Sized>(
    root: &str,
    value: &T,
) -> Result<String, GoldenTourError> {
    let json =
        serde_json::to_value(value).map_err(|e| GoldenTourError::Serialization(e.to_string()))?;
    let content = from_json(json)?.unwrap_or_else(|| XmlValue::Text(String::new()));
    write_document(root, &content)
}

fn write_document(root: &str, value: &XmlValue) -> Result<String, GoldenTourError> {
    if let XmlValue::List(_) = value {
        return Err(GoldenTourError::Serialization(format!(
            "root element <{}> cannot be a sequence",
            root
        )));
    }

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;
    write_element(&mut writer, root, value)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| GoldenTourError::Serialization(e.to_string()))
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &XmlValue,
) -> Result<(), GoldenTourError> {
    validate_name(name)?;

    match value {
        XmlValue::Text(text) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(write_error)?;
            if !text.is_empty() {
                validate_text(name, text)?;
                writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(write_error)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(write_error)?;
        }
        XmlValue::Map(map) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(write_error)?;
            for (key, child) in map.iter() {
                write_element(writer, key, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(write_error)?;
        }
        XmlValue::List(items) => {
            for item in items {
                if let XmlValue::List(_) = item {
                    return Err(GoldenTourError::Serialization(format!(
                        "unsupported nested sequence under <{}>",
                        name
                    )));
                }
                write_element(writer, name, item)?;
            }
        }
    }

    Ok(())
}

fn write_error(error: impl std::fmt::Display) -> GoldenTourError {
    GoldenTourError::Serialization(error.to_string())
}

// Plain (namespace-free) XML names: letter or underscore, then name characters
fn validate_name(name: &str) -> Result<(), GoldenTourError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(GoldenTourError::Serialization(format!(
            "invalid element name: {:?}",
            name
        )))
    }
}

// XML 1.0 `Char`: control characters other than tab, newline and carriage
// return (and U+FFFE/U+FFFF) cannot appear in a document, escaped or not
fn validate_text(name: &str, text: &str) -> Result<(), GoldenTourError> {
    let invalid = text.chars().find(|&c| {
        !matches!(
            c,
            '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
        )
    });
    match invalid {
        Some(c) => Err(GoldenTourError::Serialization(format!(
            "character U+{:04X} is not allowed in XML text of <{}>",
            c as u32, name
        ))),
        None => Ok(()),
    }
}
