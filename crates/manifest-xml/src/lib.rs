//! Position-aware XML for Android manifests
//!
//! [`Document`] is an arena of elements addressed by [`ElementId`], with
//! parent links stored as plain indices. Every element and attribute keeps
//! its byte span and 1-based line/column position so merger records can be
//! mapped back onto nodes.
//!
//! [`SourceDocument`] edits the original text in place through span-based
//! [`Edit`]s, so untouched formatting survives a round trip.

pub mod document;
pub mod edit;
pub mod error;
pub mod node;
pub mod ns;
pub mod position;
pub mod source;

pub use document::{Attribute, Document, Element};
pub use edit::{Edit, EditKind};
pub use error::{Error, Result};
pub use node::{AttributeId, ElementId, NodeRef};
pub use position::SourcePosition;
pub use source::SourceDocument;
