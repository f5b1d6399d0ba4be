//! Facts gathering for resilient ECMP
//!
//! Reads `show running-config` output and turns the resilience lines into a
//! [`ConfigurationSet`]. Families are listed in the order they first appear;
//! lines that are not resilience commands are ignored.

use std::path::PathBuf;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use eos_cfgmgr_common::{shell, CfgMgrError, CfgMgrResult, FactsProvider};

use crate::tables::{RESOURCE_NAME, SHOW_RUNNING_CONFIG_CMD};
use crate::types::{AddressFamilyConfig, Afi, ConfigurationSet, RouteEntry};

static RESILIENCE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(ipv6|ip)\s+hardware\s+fib\s+ecmp\s+resilience\s+(\S+)\s+capacity\s+(\d+)\s+redundancy\s+(\d+)\s*$",
    )
    .expect("Invalid regex pattern")
});

/// Parses one running-config line into its family and route.
pub fn parse_line(line: &str) -> Option<(Afi, RouteEntry)> {
    let caps = RESILIENCE_LINE_RE.captures(line)?;
    let afi = Afi::from_cli_prefix(&caps[1])?;
    let capacity = caps[3].parse().ok()?;
    let redundancy = caps[4].parse().ok()?;
    Some((afi, RouteEntry::new(&caps[2], capacity, redundancy)))
}

/// Parses running-config text into structured facts.
pub fn parse_running_config(text: &str) -> ConfigurationSet {
    let mut facts: ConfigurationSet = Vec::new();

    for (afi, route) in text.lines().filter_map(parse_line) {
        match facts.iter_mut().find(|family| family.afi == afi) {
            Some(family) => family.routes.push(route),
            None => facts.push(AddressFamilyConfig::new(afi, vec![route])),
        }
    }

    facts
}

/// Facts read from a saved running-config file.
#[derive(Debug, Clone)]
pub struct RunningConfigFile {
    path: PathBuf,
}

impl RunningConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FactsProvider for RunningConfigFile {
    type Facts = ConfigurationSet;

    fn resource_name(&self) -> &str {
        RESOURCE_NAME
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn gather(&self) -> CfgMgrResult<ConfigurationSet> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CfgMgrError::io(self.path.display().to_string(), e))?;
        let facts = parse_running_config(&text);
        debug!(families = facts.len(), "Gathered facts from file");
        Ok(facts)
    }
}

/// Facts read from the device CLI.
#[derive(Debug, Clone)]
pub struct CliFacts {
    cli_path: String,
}

impl CliFacts {
    pub fn new(cli_path: impl Into<String>) -> Self {
        Self {
            cli_path: cli_path.into(),
        }
    }
}

#[async_trait]
impl FactsProvider for CliFacts {
    type Facts = ConfigurationSet;

    fn resource_name(&self) -> &str {
        RESOURCE_NAME
    }

    #[instrument(skip(self))]
    async fn gather(&self) -> CfgMgrResult<ConfigurationSet> {
        let cmd = shell::cli_show(&self.cli_path, SHOW_RUNNING_CONFIG_CMD);
        let output = shell::exec_or_throw(&cmd)
            .await
            .map_err(|e| CfgMgrError::facts(RESOURCE_NAME, e.to_string()))?;
        let facts = parse_running_config(&output);
        debug!(families = facts.len(), "Gathered facts from device");
        Ok(facts)
    }
}
