//! XML response decoding
//!
//! The engine answers every query with an XML document. This module turns
//! such a document into a nested [`Value`] tree:
//! - a leaf element becomes a [`Value::Scalar`] holding its text
//! - an element with children becomes a [`Value::Map`] keyed by child tag
//! - a tag repeated under the same parent becomes a [`Value::Sequence`]
//!   in document order
//!
//! Attributes are ignored, and so is text that sits between child elements.

mod decode;
mod value;

pub use decode::decode_document;
pub use value::{Mapping, Value};
