//! Task file loading
//!
//! A task file declares the desired configuration and the state to apply:
//!
//! ```yaml
//! state: replaced
//! config:
//!   - afi: ipv4
//!     routes:
//!       - dest: 10.0.0.0/8
//!         capacity: 16
//!         redundancy: 2
//! ```
//!
//! Files ending in `.json` are parsed as JSON, everything else as YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use eos_cfgmgr_common::{CfgMgrError, CfgMgrResult};

use crate::tables::TASK_FILE;
use crate::types::{ConfigurationSet, ResourceState};

/// Desired state declared by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskFile {
    #[serde(default)]
    pub state: ResourceState,

    #[serde(default)]
    pub config: ConfigurationSet,
}

impl TaskFile {
    /// Parses task file content; `json` selects the JSON parser.
    pub fn parse(content: &str, json: bool) -> CfgMgrResult<Self> {
        if json {
            serde_json::from_str(content)
                .map_err(|e| CfgMgrError::invalid_config(TASK_FILE, e.to_string()))
        } else {
            // An empty YAML document means "all defaults".
            if content.trim().is_empty() {
                return Ok(Self::default());
            }
            serde_yaml::from_str(content)
                .map_err(|e| CfgMgrError::invalid_config(TASK_FILE, e.to_string()))
        }
    }

    /// Loads a task file from disk.
    pub async fn load(path: &Path) -> CfgMgrResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CfgMgrError::io(path.display().to_string(), e))?;
        let json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let task = Self::parse(&content, json)?;
        info!(
            path = %path.display(),
            state = %task.state,
            families = task.config.len(),
            "Loaded task file"
        );
        Ok(task)
    }
}
