//! Reconciliation integration tests
//!
//! Exercises the public engine API and a full manager run against a
//! simulated device.

use eos_resilient_ecmpmgrd::{
    reconcile, render, to_cli_lines, AddressFamilyConfig, Afi, ResilientEcmpMgr, ResourceState,
    RouteEntry, SimulatedDevice, TaskFile,
};
use pretty_assertions::assert_eq;

fn family(afi: Afi, routes: Vec<RouteEntry>) -> AddressFamilyConfig {
    AddressFamilyConfig::new(afi, routes)
}

fn dual_stack_have() -> Vec<AddressFamilyConfig> {
    vec![
        family(Afi::Ipv4, vec![RouteEntry::new("10.0.0.0/8", 16, 2)]),
        family(Afi::Ipv6, vec![RouteEntry::new("2001:db8::/32", 8, 1)]),
    ]
}

/// Merging a single entry into an empty device
#[test]
fn test_merge_into_empty_device() {
    let want = vec![family(Afi::Ipv4, vec![RouteEntry::new("10.0.0.0/8", 16, 2)])];

    let commands = to_cli_lines(&reconcile(&want, &[], ResourceState::Merged));

    assert_eq!(
        commands,
        vec!["ip hardware fib ecmp resilience 10.0.0.0/8 capacity 16 redundancy 2"]
    );
}

/// Replacing a family with an empty route list only removes
#[test]
fn test_replace_with_empty_family() {
    let have = vec![family(Afi::Ipv4, vec![RouteEntry::new("10.0.0.0/8", 16, 2)])];
    let want = vec![family(Afi::Ipv4, vec![])];

    let commands = to_cli_lines(&reconcile(&want, &have, ResourceState::Replaced));

    assert_eq!(
        commands,
        vec!["no ip hardware fib ecmp resilience 10.0.0.0/8 capacity 16 redundancy 2"]
    );
}

/// Deleting by destination leaves the other family untouched
#[test]
fn test_delete_by_destination_keeps_ipv6() {
    let want = vec![family(
        Afi::Ipv4,
        vec![RouteEntry::destination_only("10.0.0.0/8")],
    )];

    let commands = reconcile(&want, &dual_stack_have(), ResourceState::Deleted);

    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].afi(), Afi::Ipv4);
    assert!(commands[0].is_negated());
}

#[test]
fn test_render_matches_command_template() {
    for (afi, prefix) in [(Afi::Ipv4, "ip"), (Afi::Ipv6, "ipv6")] {
        let entry = family(afi, vec![RouteEntry::new("192.0.2.0/24", 12, 3)]);
        assert_eq!(
            to_cli_lines(&render(&entry)),
            vec![format!(
                "{} hardware fib ecmp resilience 192.0.2.0/24 capacity 12 redundancy 3",
                prefix
            )]
        );
    }
}

#[test]
fn test_delete_all_counts_every_route() {
    let have = vec![
        family(
            Afi::Ipv4,
            vec![
                RouteEntry::new("10.0.0.0/8", 16, 2),
                RouteEntry::new("172.16.0.0/12", 8, 1),
            ],
        ),
        family(Afi::Ipv6, vec![RouteEntry::new("2001:db8::/32", 8, 1)]),
        family(Afi::Ipv4, vec![RouteEntry::new("192.168.0.0/16", 4, 1)]),
    ];
    let total: usize = have.iter().map(|f| f.routes.len()).sum();

    let commands = to_cli_lines(&reconcile(&[], &have, ResourceState::Deleted));

    assert_eq!(commands.len(), total);
    assert!(commands.iter().all(|c| c.starts_with("no ")));
}

#[test]
fn test_overridden_produces_nothing() {
    let want = vec![family(Afi::Ipv6, vec![RouteEntry::new("::/0", 8, 1)])];
    assert!(reconcile(&want, &dual_stack_have(), ResourceState::Overridden).is_empty());
}

/// Full run: task file -> manager -> simulated device
#[tokio::test]
async fn test_replaced_run_updates_device() {
    let device = SimulatedDevice::from_running_config(
        "ip hardware fib ecmp resilience 10.0.0.0/8 capacity 16 redundancy 2\n\
         ip hardware fib ecmp resilience 172.16.0.0/12 capacity 8 redundancy 1\n\
         ipv6 hardware fib ecmp resilience 2001:db8::/32 capacity 8 redundancy 1\n",
    );
    let task = TaskFile::parse(
        r#"
state: replaced
config:
  - afi: ipv4
    routes:
      - dest: 10.0.0.0/8
        capacity: 32
        redundancy: 4
"#,
        false,
    )
    .unwrap();

    let mut mgr = ResilientEcmpMgr::new(device.clone(), device.clone());
    let result = mgr.execute(&task.config, task.state).await.unwrap();

    assert!(result.changed);
    assert_eq!(
        result.commands,
        vec![
            "no ip hardware fib ecmp resilience 10.0.0.0/8 capacity 16 redundancy 2",
            "no ip hardware fib ecmp resilience 172.16.0.0/12 capacity 8 redundancy 1",
            "ip hardware fib ecmp resilience 10.0.0.0/8 capacity 32 redundancy 4",
        ]
    );
    assert_eq!(
        result.after,
        Some(vec![
            family(Afi::Ipv6, vec![RouteEntry::new("2001:db8::/32", 8, 1)]),
            family(Afi::Ipv4, vec![RouteEntry::new("10.0.0.0/8", 32, 4)]),
        ])
    );

    // Applying the same task again only re-adds the desired entry.
    let again = mgr.execute(&task.config, task.state).await.unwrap();
    assert_eq!(
        again.commands,
        vec!["ip hardware fib ecmp resilience 10.0.0.0/8 capacity 32 redundancy 4"]
    );
}
