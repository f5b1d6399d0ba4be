//! Type definitions for resilient-ecmpmgrd

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::keywords;

/// Address family of a resilient ECMP entry.
///
/// Unrecognized names deserialize as [`Afi::Ipv4`], matching how the device
/// CLI falls back to the `ip` prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Afi {
    #[default]
    Ipv4,
    Ipv6,
}

impl Afi {
    /// Returns the family name used in task files and facts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Afi::Ipv4 => "ipv4",
            Afi::Ipv6 => "ipv6",
        }
    }

    /// Returns the CLI prefix of commands for this family.
    pub fn cli_prefix(&self) -> &'static str {
        match self {
            Afi::Ipv4 => keywords::IPV4_PREFIX,
            Afi::Ipv6 => keywords::IPV6_PREFIX,
        }
    }

    /// Maps a CLI prefix (`ip` / `ipv6`) back to the family.
    pub fn from_cli_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            keywords::IPV4_PREFIX => Some(Afi::Ipv4),
            keywords::IPV6_PREFIX => Some(Afi::Ipv6),
            _ => None,
        }
    }
}

impl From<String> for Afi {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ipv6" => Afi::Ipv6,
            "ipv4" => Afi::Ipv4,
            other => {
                warn!(afi = %other, "Unrecognized address family, treating as ipv4");
                Afi::Ipv4
            }
        }
    }
}

impl fmt::Display for Afi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resilient route rule.
///
/// `capacity` and `redundancy` are either both set or both absent; the
/// engine never invents defaults for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Destination prefix (e.g. "10.0.0.0/8")
    #[serde(
        rename = "dest",
        alias = "destination",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub destination: Option<String>,

    /// Hardware table slots reserved for the destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,

    /// Standby slots reserved for the destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redundancy: Option<u32>,
}

impl RouteEntry {
    /// Creates a fully specified route.
    pub fn new(destination: impl Into<String>, capacity: u32, redundancy: u32) -> Self {
        Self {
            destination: Some(destination.into()),
            capacity: Some(capacity),
            redundancy: Some(redundancy),
        }
    }

    /// Creates a route that names only a destination, as used in delete selectors.
    pub fn destination_only(destination: impl Into<String>) -> Self {
        Self {
            destination: Some(destination.into()),
            ..Default::default()
        }
    }

    /// Returns the values needed to render this route, if all are present.
    pub fn renderable(&self) -> Option<(&str, u32, u32)> {
        match (&self.destination, self.capacity, self.redundancy) {
            (Some(dest), Some(capacity), Some(redundancy)) => {
                Some((dest.as_str(), capacity, redundancy))
            }
            _ => None,
        }
    }

    /// Returns capacity and redundancy when both are set and non-zero.
    ///
    /// Zero counts as unset, so a selector with `capacity: 0` matches any
    /// capacity.
    pub fn qualifier(&self) -> Option<(u32, u32)> {
        match (self.capacity, self.redundancy) {
            (Some(capacity), Some(redundancy)) if capacity != 0 && redundancy != 0 => {
                Some((capacity, redundancy))
            }
            _ => None,
        }
    }
}

/// Resilient ECMP settings of one address family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFamilyConfig {
    pub afi: Afi,

    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl AddressFamilyConfig {
    pub fn new(afi: Afi, routes: Vec<RouteEntry>) -> Self {
        Self { afi, routes }
    }

    /// Returns one warning per route that cannot be rendered.
    pub fn validate(&self) -> Vec<String> {
        self.routes
            .iter()
            .enumerate()
            .filter_map(|(idx, route)| match route {
                RouteEntry {
                    destination: None, ..
                } => Some(format!(
                    "{} route #{} has no destination and was skipped",
                    self.afi, idx
                )),
                RouteEntry {
                    destination: Some(dest),
                    ..
                } if route.renderable().is_none() => Some(format!(
                    "{} route {} needs both capacity and redundancy and was skipped",
                    self.afi, dest
                )),
                _ => None,
            })
            .collect()
    }
}

/// Ordered desired or current configuration.
pub type ConfigurationSet = Vec<AddressFamilyConfig>;

/// Validates every family of a configuration set.
pub fn validate_set(set: &[AddressFamilyConfig]) -> Vec<String> {
    set.iter().flat_map(AddressFamilyConfig::validate).collect()
}

/// Reconciliation strategy requested for a run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    /// Add the desired entries, never remove anything
    #[default]
    Merged,
    /// Make each declared family match the desired entries exactly
    Replaced,
    /// Reserved; produces no commands
    Overridden,
    /// Remove the selected (or all) entries
    Deleted,
}

impl ResourceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Merged => "merged",
            ResourceState::Replaced => "replaced",
            ResourceState::Overridden => "overridden",
            ResourceState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
