use crate::xml::value::{Mapping, Value};
use crate::DecodeError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An element whose end tag has not been read yet
struct OpenElement {
    tag: String,
    children: Mapping,
    text: String,
}

impl OpenElement {
    fn new(start: &BytesStart<'_>) -> Self {
        Self {
            tag: tag_name(start),
            children: Mapping::new(),
            text: String::new(),
        }
    }

    fn close(self) -> (String, Value) {
        let value = if !self.children.is_empty() {
            Value::Map(self.children)
        } else if self.text.is_empty() {
            Value::Scalar(None)
        } else {
            Value::Scalar(Some(self.text))
        };
        (self.tag, value)
    }
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

/// Decodes an XML document into a mapping of its root tag to the root's value
///
/// # Arguments
///
/// * `bytes` - The raw document as returned by the engine
///
/// # Returns
///
/// * `Ok(Value::Map)` - A one-entry map `{root_tag: value}`
/// * `Err(DecodeError)` - The document is not well-formed
///
/// # Example
///
/// ```
/// use hapy::xml::{decode_document, Value};
///
/// let doc = decode_document(b"<jobs><value>a</value><value>b</value></jobs>").unwrap();
/// let values = doc.pointer(&["jobs", "value"]).unwrap();
/// assert_eq!(values.items().len(), 2);
/// ```
pub fn decode_document(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut open: Vec<OpenElement> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                reject_second_root(&root)?;
                open.push(OpenElement::new(&start));
            }
            Event::Empty(start) => {
                reject_second_root(&root)?;
                attach(&mut open, &mut root, tag_name(&start), Value::Scalar(None));
            }
            Event::End(_) => {
                // quick-xml rejects unmatched end tags itself
                if let Some(element) = open.pop() {
                    let (tag, value) = element.close();
                    attach(&mut open, &mut root, tag, value);
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                match open.last_mut() {
                    Some(element) => element.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(DecodeError::StrayText),
                }
            }
            Event::CData(cdata) => match open.last_mut() {
                Some(element) => element
                    .text
                    .push_str(&String::from_utf8_lossy(&cdata.into_inner())),
                None => return Err(DecodeError::StrayText),
            },
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    if let Some(element) = open.last() {
        return Err(DecodeError::Unclosed(element.tag.clone()));
    }

    let (tag, value) = root.ok_or(DecodeError::NoRoot)?;
    let mut document = Mapping::new();
    document.insert(tag, value);
    Ok(Value::Map(document))
}

fn reject_second_root(root: &Option<(String, Value)>) -> Result<(), DecodeError> {
    match root {
        Some((tag, _)) => Err(DecodeError::TrailingContent(tag.clone())),
        None => Ok(()),
    }
}

/// Hands a closed element to its parent, or records it as the root
fn attach(
    open: &mut [OpenElement],
    root: &mut Option<(String, Value)>,
    tag: String,
    value: Value,
) {
    match open.last_mut() {
        Some(parent) => Value::insert_child(&mut parent.children, tag, value),
        None => *root = Some((tag, value)),
    }
}
