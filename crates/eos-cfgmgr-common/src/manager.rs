//! Resource manager collaborator traits and common abstractions.
//!
//! A resource manager reconciles one device feature at a time. It reads the
//! current configuration through a [`FactsProvider`], computes commands, and
//! hands them to a [`CommandTransport`]. Both collaborators are traits so the
//! daemon can run against a live CLI session and tests can run against
//! in-memory fakes.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CfgMgrResult;

/// Removal marker prefixed to negative device commands.
pub const NEGATION_PREFIX: &str = "no ";

/// Supplies the current configuration of a resource as structured facts.
///
/// Implementations return an empty collection when the resource is not
/// configured on the device.
#[async_trait]
pub trait FactsProvider: Send + Sync {
    /// Structured facts for the resource.
    type Facts: Send;

    /// Returns the resource name these facts describe (e.g. "resilient_ecmp").
    fn resource_name(&self) -> &str;

    /// Reads the current configuration from the device.
    async fn gather(&self) -> CfgMgrResult<Self::Facts>;
}

/// Applies an ordered batch of device commands.
///
/// The batch must be applied as a single unit in the given order; callers
/// never reorder or deduplicate it.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Applies the commands to the device.
    async fn edit_config(&mut self, commands: &[String]) -> CfgMgrResult<()>;
}

/// Outcome of one resource manager run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleResult<T> {
    /// True when the command list was non-empty.
    pub changed: bool,
    /// Commands computed for the device, in application order.
    pub commands: Vec<String>,
    /// Facts gathered before any change.
    pub before: T,
    /// Facts gathered after the change; only present when `changed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<T>,
    /// Non-fatal findings about the input.
    pub warnings: Vec<String>,
}

impl<T> ModuleResult<T> {
    /// Creates an unchanged result carrying the `before` facts.
    pub fn unchanged(before: T) -> Self {
        Self {
            changed: false,
            commands: Vec::new(),
            before,
            after: None,
            warnings: Vec::new(),
        }
    }
}
