//! # resilient-ecmpmgrd - Resilient ECMP Configuration Manager
//!
//! Reconciles the per-address-family hardware FIB ECMP resilience settings of
//! an EOS device against a declared desired state.
//!
//! ## Responsibilities
//! - Render `ip|ipv6 hardware fib ecmp resilience` commands from structured entries
//! - Compute ordered command lists for the merged, replaced, overridden and
//!   deleted states
//! - Gather current settings from the running config
//! - Apply commands through a CLI session, or only report them in check mode
//!
//! ## Key Features
//! - The reconciliation engine is pure and synchronous; collaborators are
//!   async traits from `eos-cfgmgr-common`
//! - Commands carry their structured fields, so diffs never depend on
//!   string formatting
//! - In `replaced`, removals are emitted before additions to free table
//!   capacity first

mod ecmp_mgr;
mod facts;
mod reconcile;
mod render;
mod tables;
mod task;
mod transport;
mod types;

pub use ecmp_mgr::{EcmpResult, ResilientEcmpMgr};
pub use facts::{parse_line, parse_running_config, CliFacts, RunningConfigFile};
pub use reconcile::reconcile;
pub use render::{render, render_all, to_cli_lines, Command};
pub use tables::*;
pub use task::TaskFile;
pub use transport::{CliTransport, SimulatedDevice};
pub use types::*;
