//! Command keyword and resource name constants for resilient-ecmpmgrd

/// Resource name reported in facts and logs
pub const RESOURCE_NAME: &str = "resilient_ecmp";

/// Name used in errors about the task file
pub const TASK_FILE: &str = "task file";

/// Show command used to read the current configuration from the device
pub const SHOW_RUNNING_CONFIG_CMD: &str = "show running-config | section hardware fib ecmp";

/// Keywords of the resilient ECMP command
pub mod keywords {
    /// Address family prefix for IPv4 routes
    pub const IPV4_PREFIX: &str = "ip";

    /// Address family prefix for IPv6 routes
    pub const IPV6_PREFIX: &str = "ipv6";

    /// Fixed middle part of every command
    pub const RESILIENCE: &str = "hardware fib ecmp resilience";

    pub const CAPACITY: &str = "capacity";
    pub const REDUNDANCY: &str = "redundancy";
}

/// Configuration session framing
pub mod session {
    /// Enters (or re-enters) a named configuration session
    pub const CONFIGURE_SESSION: &str = "configure session";

    /// Leaves the session with its changes still pending
    pub const END: &str = "end";

    /// Applies the pending session to the running config
    pub const COMMIT: &str = "commit";

    /// Discards the pending session
    pub const ABORT: &str = "abort";
}
