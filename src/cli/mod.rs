//! CLI module - The cluster command line collaborator.
//!
//! The controller talks to the cluster only through [`ClusterClient`]. The
//! production implementation, [`OcClient`], shells out to `oc` and `oadm`.

mod client;
mod oc;

pub use client::*;
pub use oc::*;
