//! # Router Manager
//!
//! Declarative management of an OpenShift router bundle.
//!
//! The crate edits YAML/JSON documents through textual paths, compares a
//! rendered (desired) document against a live (observed) one while ignoring
//! server-populated fields, and drives a reconciliation pass that creates,
//! replaces or deletes the parts of a router through the cluster CLI.
//!
//! ## Modules
//!
//! - [`value`] - In-memory representation of YAML/JSON documents
//! - [`path`] - Path grammar and parsing
//! - [`document`] - Path-addressed document editing and persistence
//! - [`compare`] - Structural comparison under a skip-set
//! - [`resource`] - The managed resource kinds and their typed views
//! - [`cli`] - The cluster command line collaborator
//! - [`artifact`] - Scoped temporary files
//! - [`config`] - Router parameters and declarative edits
//! - [`router`] - The reconciliation controller
//! - [`telemetry`] - Logging setup

pub mod artifact;
pub mod cli;
pub mod compare;
pub mod config;
pub mod document;
pub mod path;
pub mod resource;
pub mod router;
pub mod telemetry;
pub mod value;

pub use cli::{ClusterClient, OcClient};
pub use compare::{equal_under_skip, SkipKeys};
pub use config::{Edit, RouterConfig, State};
pub use document::Document;
pub use path::{Path, Separator};
pub use router::{Router, RouterError, Status};
pub use value::Value;
