// Generic parsed view of the provider's XML responses
use crate::error::GoldenTourError;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    // Character data directly inside this element. Whitespace-only runs that
    // only indent markup are dropped; everything else (CDATA included) is verbatim.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn from_start(start: &BytesStart) -> Result<Self, GoldenTourError> {
        let name = utf8(start.name().as_ref())?.to_string();

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(malformed)?;
            let key = utf8(attribute.key.as_ref())?.to_string();
            let value = unescape(utf8(&attribute.value)?)
                .map_err(malformed)?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(XmlElement {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }
}

// Element still waiting for its closing tag
struct OpenElement {
    element: XmlElement,
    // Set once real character data (non-blank text, a reference or CDATA) arrives
    significant: bool,
}

// Parse a response body into an element tree.
//
// Bodies that are empty, truncated, have mismatched tags, more than one root
// element or stray text outside the root are rejected as malformed.
pub fn parse_document(body: &str) -> Result<XmlElement, GoldenTourError> {
    let mut reader = Reader::from_str(body);
    let mut open: Vec<OpenElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if open.is_empty() && root.is_some() {
                    return Err(malformed("multiple root elements"));
                }
                open.push(OpenElement {
                    element: XmlElement::from_start(&e)?,
                    significant: false,
                });
            }
            Ok(Event::Empty(e)) => {
                let element = XmlElement::from_start(&e)?;
                attach(element, &mut open, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let OpenElement {
                    mut element,
                    significant,
                } = open
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag"))?;
                if !significant {
                    element.text.clear();
                }
                attach(element, &mut open, &mut root)?;
            }
            Ok(Event::Text(e)) => {
                let text = unescape(utf8(&e)?).map_err(malformed)?;
                let blank = text.trim().is_empty();
                append_text(&mut open, &text, !blank)?;
            }
            Ok(Event::GeneralRef(e)) => {
                let reference = format!("&{};", utf8(&e)?);
                let text = unescape(&reference).map_err(malformed)?;
                append_text(&mut open, &text, true)?;
            }
            Ok(Event::CData(e)) => {
                append_text(&mut open, utf8(&e)?, true)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(format!(
                    "error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            // Declarations, comments, processing instructions and doctypes carry no data
            _ => (),
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(malformed(format!(
            "unclosed element <{}>",
            unclosed.element.name
        )));
    }
    root.ok_or_else(|| malformed("document has no root element"))
}

fn attach(
    element: XmlElement,
    open: &mut [OpenElement],
    root: &mut Option<XmlElement>,
) -> Result<(), GoldenTourError> {
    match open.last_mut() {
        Some(parent) => parent.element.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed("multiple root elements")),
    }
    Ok(())
}

fn append_text(
    open: &mut [OpenElement],
    text: &str,
    significant: bool,
) -> Result<(), GoldenTourError> {
    match open.last_mut() {
        Some(current) => {
            current.element.text.push_str(text);
            current.significant |= significant;
        }
        None if !significant => {}
        None => return Err(malformed("text outside of the root element")),
    }
    Ok(())
}

fn utf8(bytes: &[u8]) -> Result<&str, GoldenTourError> {
    std::str::from_utf8(bytes).map_err(malformed)
}

fn malformed(error: impl std::fmt::Display) -> GoldenTourError {
    GoldenTourError::MalformedResponse(error.to_string())
}
