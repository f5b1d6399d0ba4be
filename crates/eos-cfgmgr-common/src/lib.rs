//! Common infrastructure for EOS configuration manager daemons.
//!
//! This crate provides shared functionality for resource managers that
//! reconcile one device feature against its desired state:
//!
//! - [`shell`]: Shell command execution and CLI session helpers with quoting
//! - [`manager`]: Collaborator traits ([`FactsProvider`], [`CommandTransport`])
//!   and the [`ModuleResult`] report
//! - [`error`]: Error types for cfgmgr operations
//!
//! # Architecture
//!
//! Resource managers follow this pattern:
//!
//! 1. Gather the current configuration as structured facts
//! 2. Compute the ordered command list for the requested state
//! 3. Apply the commands through a CLI session (skipped in check mode)
//! 4. Gather facts again and report before/after

pub mod error;
pub mod manager;
pub mod shell;

// Re-export commonly used items at crate root
pub use error::{CfgMgrError, CfgMgrResult};
pub use manager::{CommandTransport, FactsProvider, ModuleResult, NEGATION_PREFIX};
