//! Compare module - Drift detection between desired and observed documents.
//!
//! The comparator walks the observed document and checks that the desired
//! document agrees with it, ignoring keys listed in a [`SkipKeys`] set.

mod comparison;


pub use comparison::*;
