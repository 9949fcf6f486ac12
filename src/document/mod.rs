//! Document module - Path-addressed reading and editing of value trees.
//!
//! A [`Document`] owns a root [`Value`](crate::value::Value) and an active path
//! [`Separator`](crate::path::Separator). Every mutation either fully applies
//! or leaves the document untouched.

mod document;
mod error;

#[cfg(test)]
mod document_test;

pub use document::*;
pub use error::*;
