//! Path module - Textual paths addressing nodes inside a document.
//!
//! A path is a sequence of key segments and `[N]` index segments joined with
//! the document's active separator, e.g. `spec.template.spec.containers[0].env`.

mod path;

pub use path::*;
