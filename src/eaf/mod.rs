//! EAF XML format: loading a document into an
//! [`AnnotationStore`](crate::AnnotationStore) and regenerating a
//! document image after edits.
//!
//! The reader is strict about the attributes the data model needs — a
//! tier without a linguistic-type reference, or an annotation without an
//! id, is a [`MalformedDocument`](crate::Error::MalformedDocument) and no
//! partial store is returned. Everything else (unknown elements, extra
//! header properties, document-level attributes) is either skipped or
//! preserved verbatim for re-emission.
//!
//! The writer never touches the live store: [`Serializer`] works on an
//! owned clone, so the original store and tree remain valid until the
//! output is produced.

mod reader;
mod writer;

pub use reader::{read_path, read_str};
pub use writer::Serializer;
