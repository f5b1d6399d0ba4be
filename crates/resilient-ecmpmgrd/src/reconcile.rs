//! Reconciliation of desired against current resilient ECMP configuration
//!
//! Every strategy is a pure function of `(want, have)`. The returned order
//! is the order the device must apply the commands in: in `replaced`,
//! removals come first so table capacity is freed before entries are added
//! back.

use std::collections::HashSet;

use tracing::debug;

use crate::render::{render, render_all, Command};
use crate::types::{AddressFamilyConfig, ResourceState, RouteEntry};

/// Computes the ordered command list that moves `have` to `want` under `state`.
pub fn reconcile(
    want: &[AddressFamilyConfig],
    have: &[AddressFamilyConfig],
    state: ResourceState,
) -> Vec<Command> {
    let commands = match state {
        ResourceState::Merged => merged(want),
        ResourceState::Replaced => replaced(want, have),
        ResourceState::Overridden => overridden(),
        ResourceState::Deleted => deleted(want, have),
    };

    debug!(
        state = %state,
        want_families = want.len(),
        have_families = have.len(),
        commands = commands.len(),
        "Reconciled resilient ECMP configuration"
    );
    commands
}

/// Adds every desired entry; `have` is never consulted.
fn merged(want: &[AddressFamilyConfig]) -> Vec<Command> {
    render_all(want)
}

/// Rewrites each declared family to the desired entries.
///
/// Families present only in `have` are left alone.
fn replaced(want: &[AddressFamilyConfig], have: &[AddressFamilyConfig]) -> Vec<Command> {
    let mut removals = Vec::new();
    let mut additions = Vec::new();

    for have_entry in have {
        for want_entry in want.iter().filter(|w| w.afi == have_entry.afi) {
            let wanted = render(want_entry);
            let wanted_set: HashSet<&Command> = wanted.iter().collect();
            let mut seen = HashSet::new();

            for current in render(have_entry) {
                if !wanted_set.contains(&current) && seen.insert(current.clone()) {
                    removals.push(current.negate());
                }
            }
            additions.extend(wanted);
        }
    }

    removals.extend(additions);
    removals
}

// TODO: decide whether overridden should remove families absent from want
// once the device exposes a global reset for resilient ECMP.
fn overridden() -> Vec<Command> {
    Vec::new()
}

/// Removes the selected entries from `have`, or everything when `want` is empty.
fn deleted(want: &[AddressFamilyConfig], have: &[AddressFamilyConfig]) -> Vec<Command> {
    let removals: Vec<Command> = render_all(have).into_iter().map(Command::negate).collect();
    if want.is_empty() {
        return removals;
    }

    want.iter()
        .flat_map(|selector| {
            removals
                .iter()
                .filter(move |command| selects(selector, command))
                .cloned()
        })
        .collect()
}

/// True when a delete selector covers the command.
///
/// A selector without routes covers its whole family.
fn selects(selector: &AddressFamilyConfig, command: &Command) -> bool {
    if command.afi() != selector.afi {
        return false;
    }
    if selector.routes.is_empty() {
        return true;
    }
    selector
        .routes
        .iter()
        .any(|route| route_selects(route, command))
}

fn route_selects(route: &RouteEntry, command: &Command) -> bool {
    if route.destination.as_deref() != Some(command.destination()) {
        return false;
    }
    match route.qualifier() {
        Some((capacity, redundancy)) => {
            command.capacity() == capacity && command.redundancy() == redundancy
        }
        None => true,
    }
}
