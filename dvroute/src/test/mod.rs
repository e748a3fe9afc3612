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

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::prelude::*;

/// Address of a test server on localhost.
fn addr(port: u16) -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)
}

/// The three-node test network with link costs c(1,2) = 5, c(2,3) = 3 and
/// c(1,3) = 8, seen from the given node.
fn triangle(self_id: u16) -> Topology {
    let links: &[(u16, u16, u32)] = match self_id {
        1 => &[(1, 2, 5), (1, 3, 8)],
        2 => &[(2, 1, 5), (2, 3, 3)],
        3 => &[(3, 1, 8), (3, 2, 3)],
        _ => panic!("the triangle has nodes 1, 2 and 3"),
    };
    let mut s = String::from("3\n2\n1 127.0.0.1 5001\n2 127.0.0.1 5002\n3 127.0.0.1 5003\n");
    for (a, b, cost) in links {
        s.push_str(&format!("{a} {b} {cost}\n"));
    }
    s.parse().unwrap()
}

/// Assert the routing table invariants: cost 0 to self, infinite cost if and
/// only if there is no next hop, and every finite route passing through a
/// live neighbor.
fn check_invariants(router: &Router) {
    let self_entry = router.routes().get(router.id()).unwrap();
    assert_eq!(self_entry.next_hop, Some(router.id()));
    assert_eq!(self_entry.cost, Cost::ZERO);
    for (dest, entry) in router.routes().iter() {
        if dest == router.id() {
            continue;
        }
        assert_eq!(
            entry.cost.is_infinite(),
            entry.next_hop.is_none(),
            "entry for {dest} violates the infinity invariant: {entry:?}"
        );
        if let Some(hop) = entry.next_hop {
            assert!(
                router.neighbors().cost_of(hop).unwrap().is_finite(),
                "route to {dest} passes through dead neighbor {hop}"
            );
        }
    }
}

mod test_engine;
