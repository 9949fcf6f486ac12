//! Config module - Router parameters and declarative edits.
//!
//! A [`RouterConfig`] is usually loaded from a YAML parameter file and then
//! adjusted from command line flags. It renders the dry-run option list and
//! carries the [`Edit`]s applied to the rendered deployment config.

mod edit;
mod router_config;

pub use edit::*;
pub use router_config::*;
