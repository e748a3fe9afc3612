// DvRoute: Distance-Vector Routing Engine written in Rust
// Copyright (C) 2023 The dvrouted developers
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use super::{check_invariants, triangle};
use crate::prelude::*;

fn router(self_id: u16) -> Router {
    Router::new(&triangle(self_id), Instant::now())
}

/// Shorthand to read `(next_hop, cost)` of a route.
fn route(r: &Router, dest: u16) -> (Option<ServerId>, Cost) {
    let entry = r.routes().get(ServerId(dest)).unwrap();
    (entry.next_hop, entry.cost)
}

#[test]
fn improvement_adopts_the_sender() {
    let mut r = router(1);
    let now = Instant::now();
    // 2 advertises a path to 3 of cost 2: 5 + 2 = 7 beats the direct 8
    let changed = r.handle_announcement(ServerId(2), &[(ServerId(3), Cost::Finite(2))], now);
    assert!(changed);
    assert_eq!(route(&r, 3), (Some(ServerId(2)), Cost::Finite(7)));
    check_invariants(&r);
}

#[test]
fn tie_keeps_the_current_next_hop() {
    let mut r = router(1);
    let now = Instant::now();
    // 5 + 3 = 8 ties with the direct route to 3, which stays in place
    let changed = r.handle_announcement(ServerId(2), &[(ServerId(3), Cost::Finite(3))], now);
    assert!(!changed);
    assert_eq!(route(&r, 3), (Some(ServerId(3)), Cost::Finite(8)));
    check_invariants(&r);
}

#[test]
fn forced_refresh_follows_a_worse_cost() {
    let mut r = router(1);
    let now = Instant::now();
    r.handle_announcement(ServerId(2), &[(ServerId(3), Cost::Finite(2))], now);
    assert_eq!(route(&r, 3), (Some(ServerId(2)), Cost::Finite(7)));
    // our next hop now advertises a worse path; we must follow it
    let changed = r.handle_announcement(ServerId(2), &[(ServerId(3), Cost::Finite(10))], now);
    assert!(changed);
    assert_eq!(route(&r, 3), (Some(ServerId(2)), Cost::Finite(15)));
    check_invariants(&r);
}

#[test]
fn forced_refresh_to_infinity() {
    let mut r = router(1);
    let now = Instant::now();
    r.handle_announcement(ServerId(2), &[(ServerId(3), Cost::Finite(2))], now);
    // the next hop lost the destination entirely
    let changed = r.handle_announcement(ServerId(2), &[(ServerId(3), Cost::Infinite)], now);
    assert!(changed);
    assert_eq!(route(&r, 3), (None, Cost::Infinite));
    check_invariants(&r);
}

#[test]
fn self_entry_is_never_overwritten() {
    let mut r = router(1);
    let now = Instant::now();
    let changed = r.handle_announcement(ServerId(2), &[(ServerId(1), Cost::ZERO)], now);
    assert!(!changed);
    assert_eq!(route(&r, 1), (Some(ServerId(1)), Cost::ZERO));
}

#[test]
fn announcement_from_non_neighbor_is_ignored() {
    // node 3 is not a neighbor of node 1 in this chain
    let topology: Topology = "\
3
1
1 127.0.0.1 5001
2 127.0.0.1 5002
3 127.0.0.1 5003
1 2 5
"
    .parse()
    .unwrap();
    let mut r = Router::new(&topology, Instant::now());
    let changed = r.handle_announcement(
        ServerId(3),
        &[(ServerId(2), Cost::Finite(1))],
        Instant::now(),
    );
    assert!(!changed);
    assert_eq!(route(&r, 3), (None, Cost::Infinite));
}

#[test]
fn announcement_over_a_dead_link_is_ignored() {
    let mut r = router(1);
    let now = Instant::now();
    r.disable_link(ServerId(2), now);
    let changed = r.handle_announcement(ServerId(2), &[(ServerId(3), Cost::Finite(1))], now);
    assert!(!changed);
    assert_eq!(route(&r, 2), (None, Cost::Infinite));
    check_invariants(&r);
}

#[test]
fn announcement_is_idempotent() {
    let mut r = router(1);
    let now = Instant::now();
    let vector = [
        (ServerId(1), Cost::Finite(5)),
        (ServerId(2), Cost::ZERO),
        (ServerId(3), Cost::Finite(2)),
    ];
    assert!(r.handle_announcement(ServerId(2), &vector, now));
    let snapshot = r.routes().snapshot();
    assert!(!r.handle_announcement(ServerId(2), &vector, now));
    assert_eq!(r.routes().snapshot(), snapshot);
    check_invariants(&r);
}

#[test]
fn unknown_destination_is_learned() {
    let mut r = router(1);
    let now = Instant::now();
    let changed = r.handle_announcement(ServerId(2), &[(ServerId(9), Cost::Finite(1))], now);
    assert!(changed);
    assert_eq!(route(&r, 9), (Some(ServerId(2)), Cost::Finite(6)));
    check_invariants(&r);
}

#[test]
fn update_link_to_infinity_invalidates_routes() {
    let mut r = router(1);
    let now = Instant::now();
    r.handle_announcement(ServerId(2), &[(ServerId(3), Cost::Finite(2))], now);
    assert!(r.update_link(ServerId(2), Cost::Infinite, now));
    assert_eq!(route(&r, 2), (None, Cost::Infinite));
    assert_eq!(route(&r, 3), (None, Cost::Infinite));
    check_invariants(&r);
}

#[test]
fn update_link_improvement_adopts_the_direct_route() {
    let mut r = router(1);
    let now = Instant::now();
    assert!(r.update_link(ServerId(2), Cost::Finite(1), now));
    assert_eq!(route(&r, 2), (Some(ServerId(2)), Cost::Finite(1)));
    check_invariants(&r);
}

#[test]
fn update_link_increase_leaves_the_route_to_the_next_announcement() {
    let mut r = router(1);
    let now = Instant::now();
    assert!(r.update_link(ServerId(2), Cost::Finite(20), now));
    // the stale route survives until 2 announces again
    assert_eq!(route(&r, 2), (Some(ServerId(2)), Cost::Finite(5)));
    // 2 advertises itself at cost 0; the forced refresh corrects the entry
    r.handle_announcement(ServerId(2), &[(ServerId(2), Cost::ZERO)], now);
    assert_eq!(route(&r, 2), (Some(ServerId(2)), Cost::Finite(20)));
    check_invariants(&r);
}

#[test]
fn update_link_revives_a_disabled_neighbor() {
    let mut r = router(1);
    let now = Instant::now();
    r.disable_link(ServerId(2), now);
    assert!(r.update_link(ServerId(2), Cost::Finite(4), now));
    assert_eq!(route(&r, 2), (Some(ServerId(2)), Cost::Finite(4)));
    assert_eq!(r.neighbors().cost_of(ServerId(2)), Some(Cost::Finite(4)));
    check_invariants(&r);
}

#[test]
fn update_link_rejects_non_neighbors() {
    let mut r = router(1);
    assert!(!r.update_link(ServerId(9), Cost::Finite(1), Instant::now()));
}

#[test]
fn disable_link_scenario() {
    let mut r = router(1);
    let now = Instant::now();
    assert!(r.disable_link(ServerId(2), now));
    assert_eq!(route(&r, 2), (None, Cost::Infinite));
    // the route to 3 was direct and is unaffected
    assert_eq!(route(&r, 3), (Some(ServerId(3)), Cost::Finite(8)));
    check_invariants(&r);
}

#[test]
fn timeout_sweep() {
    let start = Instant::now();
    let mut r = Router::new(&triangle(1), start);
    let threshold = Duration::from_secs(15);

    // 2 keeps announcing, 3 stays silent
    r.touch(ServerId(2), start + Duration::from_secs(10));
    let expired = r.sweep_timeouts(start + Duration::from_secs(16), threshold);
    assert_eq!(expired, vec![ServerId(3)]);
    assert_eq!(r.neighbors().cost_of(ServerId(3)), Some(Cost::Infinite));
    assert_eq!(route(&r, 3), (None, Cost::Infinite));
    assert_eq!(route(&r, 2), (Some(ServerId(2)), Cost::Finite(5)));
    check_invariants(&r);

    // a dead neighbor does not expire twice
    let expired = r.sweep_timeouts(start + Duration::from_secs(60), threshold);
    assert_eq!(expired, vec![ServerId(2)]);
    assert_eq!(r.sweep_timeouts(start + Duration::from_secs(90), threshold), vec![]);
}

/// Deliver every router's current vector to its live neighbors, in id order.
fn exchange_round(routers: &mut [Router], now: Instant) {
    let vectors: Vec<(ServerId, Vec<(ServerId, Cost)>)> = routers
        .iter()
        .map(|r| (r.id(), r.routes().snapshot()))
        .collect();
    for r in routers.iter_mut() {
        for (sender, vector) in &vectors {
            if *sender != r.id() && r.is_neighbor(*sender) {
                r.touch(*sender, now);
                r.handle_announcement(*sender, vector, now);
            }
        }
    }
}

#[test]
fn cold_convergence() {
    let now = Instant::now();
    let mut routers = vec![router(1), router(2), router(3)];
    for _ in 0..3 {
        exchange_round(&mut routers, now);
    }
    // shortest paths in the triangle: d(1,2) = 5, d(2,3) = 3, d(1,3) = 8.
    // node 1 keeps its direct route to 3 (the path through 2 only ties).
    assert_eq!(route(&routers[0], 2), (Some(ServerId(2)), Cost::Finite(5)));
    assert_eq!(route(&routers[0], 3), (Some(ServerId(3)), Cost::Finite(8)));
    assert_eq!(route(&routers[1], 1), (Some(ServerId(1)), Cost::Finite(5)));
    assert_eq!(route(&routers[1], 3), (Some(ServerId(3)), Cost::Finite(3)));
    assert_eq!(route(&routers[2], 1), (Some(ServerId(1)), Cost::Finite(8)));
    assert_eq!(route(&routers[2], 2), (Some(ServerId(2)), Cost::Finite(3)));
    for r in &routers {
        check_invariants(r);
    }

    // stable state: another round changes nothing
    let snapshots: Vec<_> = routers.iter().map(|r| r.routes().snapshot()).collect();
    exchange_round(&mut routers, now);
    for (r, snapshot) in routers.iter().zip(snapshots) {
        assert_eq!(r.routes().snapshot(), snapshot);
    }
}

#[test]
fn link_improvement_propagates() {
    let now = Instant::now();
    let mut routers = vec![router(1), router(2), router(3)];
    for _ in 0..3 {
        exchange_round(&mut routers, now);
    }

    // operators on both ends lower c(1,2) to 1
    routers[0].update_link(ServerId(2), Cost::Finite(1), now);
    routers[1].update_link(ServerId(1), Cost::Finite(1), now);
    for _ in 0..2 {
        exchange_round(&mut routers, now);
    }

    // node 3 now reaches 1 through 2 at cost 3 + 1 = 4
    assert_eq!(route(&routers[2], 1), (Some(ServerId(2)), Cost::Finite(4)));
    assert_eq!(route(&routers[2], 2), (Some(ServerId(2)), Cost::Finite(3)));
    for r in &routers {
        check_invariants(r);
    }
}
