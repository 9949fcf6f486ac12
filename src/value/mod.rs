//! Value module - In-memory representation of YAML/JSON documents.
//!
//! Both rendered (desired) and live (observed) resources are held as a tree of
//! [`Value`]s so that the path engine and the comparator can walk them
//! generically.

mod value;

pub use value::*;
