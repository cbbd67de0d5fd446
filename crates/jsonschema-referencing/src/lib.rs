//! # referencing
//!
//! Reference resolution for JSON Schema documents.
//!
//! A [`Registry`] owns every document taking part in a single schema load: the root document
//! and whatever remote documents `$ref` values point at. Each [`Document`] carries an index of
//! the `$id` values it declares, so references can be resolved either through an identifier or
//! through a plain JSON Pointer.
mod document;
mod error;
mod pointer;
mod registry;
mod retriever;
mod segments;
mod specification;
pub mod uri;

pub use document::Document;
pub use error::Error;
pub use pointer::{parse_index, pointer, unescape_segment};
pub use registry::{Registry, Resolved};
pub use retriever::{DefaultRetriever, Retrieve};
pub use specification::Draft;
pub use url::Url;
