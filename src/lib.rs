//! # glossa
//!
//! Interlinear-gloss annotation for Rust.
//!
//! Manages linguistically annotated speech transcripts stored as
//! hierarchical, cross-referencing tiers (utterance → word → morpheme →
//! gloss, plus free translations), the model used by ELAN and similar
//! interlinear annotation tools.
//!
//! - **Store**: the flat data layer — tiers, linguistic types, time
//!   order, and two annotation variants (time-interval-anchored and
//!   reference-chained) with lookup, chain-traversal, interval-query,
//!   and mutation primitives.
//! - **Roles**: mapping from abstract semantic roles (utterance, word,
//!   morpheme, gloss, part of speech, translation) to the concrete
//!   linguistic-type labels that identify tiers.
//! - **Projection**: reconciling interval containment and chain
//!   traversal into one nested, editable tree.
//! - **Edits**: structural tree operations that write through to the
//!   store and keep every reference chain single-headed and acyclic by
//!   construction.
//! - **Serialization**: regenerating a consistent EAF document image
//!   after edits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use glossa::{eaf, InterlinearStyle, Serializer, TierRoleResolver, TreeProjector};
//!
//! let store = eaf::read_path("transcript.eaf")?;
//! let mut tree = TreeProjector::new(TierRoleResolver::default(), InterlinearStyle::FullGloss)
//!     .project(store);
//!
//! for utterance in tree.utterances() {
//!     println!("{}: {}", utterance.id, utterance.text);
//! }
//!
//! tree.remove_word("a12");
//! Serializer::new(&tree).write_to_path("transcript.eaf")?;
//! ```
//!
//! ## Formats
//!
//! | Format | Variant | Source |
//! |--------|---------|--------|
//! | ELAN EAF XML | [`FileFormat::Eaf`] | [`eaf::read_path`] |
//! | Toolbox-style records | [`FileFormat::Toolbox`] | [`ToolboxReader`] |
//!
//! Both converge on the same [`AnnotationTree`] contract; the XML path
//! additionally carries an [`AnnotationStore`] so edits persist.
//!
//! ## Design Philosophy
//!
//! - **Absence is data**: lookups against unknown tiers or ids return
//!   empty results, never errors — a partially annotated document is the
//!   normal case.
//! - **Unrepresentable violations**: chain repair lives in the tree's
//!   mutation contracts, not in after-the-fact validation.
//! - **The store is the durable form**: the tree is a projection; every
//!   tree edit writes through immediately.
//! - **Single-threaded by design**: one store, one tree, one document at
//!   a time; callers needing concurrency operate on independent copies.

#![warn(missing_docs)]

pub mod eaf;
mod error;
mod project;
mod roles;
mod shape;
mod store;
mod time;
pub mod toolbox;
mod tree;

pub use error::{Error, Result};
pub use project::{InterlinearStyle, TreeProjector};
pub use roles::{TierRole, TierRoleResolver};
pub use shape::{Delimiters, MorphemeShape, WordShape};
pub use store::{
    AlignableAnnotation, Annotation, AnnotationId, AnnotationStore, LinguisticType, RefAnnotation,
    Tier, TierId,
};
pub use time::{TimeOrder, TimeSlot};
pub use toolbox::ToolboxReader;
pub use tree::{AnnotationTree, Gloss, Morpheme, Translation, Utterance, Word};

pub use eaf::Serializer;

use std::path::Path;

/// Supported input formats, selected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// ELAN `.eaf` XML documents.
    Eaf,
    /// Toolbox-style line-oriented marker files.
    Toolbox,
}

/// Load a transcript file and project it into an editable tree.
///
/// Dispatches on `format`: EAF documents are loaded into an
/// [`AnnotationStore`] and projected; Toolbox records are parsed
/// directly into the tree shape over an empty store.
pub fn load_path(
    path: impl AsRef<Path>,
    format: FileFormat,
    resolver: TierRoleResolver,
    style: InterlinearStyle,
) -> Result<AnnotationTree> {
    match format {
        FileFormat::Eaf => {
            let store = eaf::read_path(path)?;
            Ok(TreeProjector::new(resolver, style).project(store))
        }
        FileFormat::Toolbox => {
            let text = std::fs::read_to_string(path)?;
            Ok(ToolboxReader::new().read_to_tree(&text, resolver, style))
        }
    }
}
