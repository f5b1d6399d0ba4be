//! ResilientEcmpMgr - resilient ECMP resource manager
//!
//! Drives one reconciliation run:
//! 1. Gather current facts (`before`)
//! 2. Reconcile the desired set against them for the requested state
//! 3. Apply the commands unless running in check mode
//! 4. Gather facts again and report `after` when something changed

use tracing::{debug, info, instrument, warn};

use eos_cfgmgr_common::{CfgMgrResult, CommandTransport, FactsProvider, ModuleResult};

use crate::reconcile::reconcile;
use crate::render::to_cli_lines;
use crate::types::{validate_set, AddressFamilyConfig, ConfigurationSet, ResourceState};

/// Result of a resilient ECMP run.
pub type EcmpResult = ModuleResult<ConfigurationSet>;

/// Reconciles resilient ECMP configuration on one device.
pub struct ResilientEcmpMgr<F, T> {
    /// Source of current configuration
    facts: F,

    /// Destination for computed commands
    transport: T,

    /// Compute commands without applying them
    check_mode: bool,
}

impl<F, T> ResilientEcmpMgr<F, T>
where
    F: FactsProvider<Facts = ConfigurationSet>,
    T: CommandTransport,
{
    /// Creates a new manager over the given collaborators
    pub fn new(facts: F, transport: T) -> Self {
        Self {
            facts,
            transport,
            check_mode: false,
        }
    }

    /// Enables check mode (dry run)
    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    /// Runs one reconciliation of `want` under `state`.
    #[instrument(skip(self, want), fields(resource = %self.facts.resource_name(), check_mode = self.check_mode))]
    pub async fn execute(
        &mut self,
        want: &[AddressFamilyConfig],
        state: ResourceState,
    ) -> CfgMgrResult<EcmpResult> {
        let before = self.facts.gather().await?;
        debug!(families = before.len(), "Gathered current configuration");

        let mut warnings = validate_set(want);
        if state == ResourceState::Overridden {
            warnings.push(
                "state 'overridden' is not supported for resilient_ecmp and made no changes"
                    .to_string(),
            );
        }
        for warning in &warnings {
            warn!("{}", warning);
        }

        let commands = to_cli_lines(&reconcile(want, &before, state));
        let mut result = EcmpResult::unchanged(before);
        result.warnings = warnings;

        if commands.is_empty() {
            info!(state = %state, "Configuration already in desired state");
            return Ok(result);
        }

        if self.check_mode {
            info!(state = %state, count = commands.len(), "Check mode: commands not applied");
        } else {
            self.transport.edit_config(&commands).await?;
            info!(state = %state, count = commands.len(), "Applied commands");
        }

        result.changed = true;
        result.commands = commands;
        result.after = Some(self.facts.gather().await?);
        Ok(result)
    }
}
