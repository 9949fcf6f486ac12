//! Router module - Reconciliation of the router bundle.
//!
//! A pass observes the five managed parts on the cluster, renders the desired
//! bundle with a dry-run, and then creates, replaces, deletes or leaves the
//! parts alone:
//!
//! ```text
//! present, nothing observed   -> create every rendered part
//! present, parts drifted      -> delete all, settle, create
//! present, no drift           -> no-op
//! absent, something observed  -> delete all
//! absent, nothing observed    -> no-op
//! ```

mod bundle;
mod controller;
mod error;
mod status;


pub use bundle::*;
pub use controller::*;
pub use error::*;
pub use status::*;
