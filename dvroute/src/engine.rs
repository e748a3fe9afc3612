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

//! The update engine: Bellman--Ford relaxation with next-hop adoption.
//!
//! A [`Router`] owns the routing table and the neighbor registry of one node
//! and applies everything that can change them: received announcements,
//! operator link mutations, and the neighbor timeout sweep. It performs no
//! I/O; the daemon feeds it decoded announcements and the current time.

use std::{net::SocketAddrV4, time::Instant};

use log::*;

use crate::{
    neighbors::NeighborRegistry,
    table::RoutingTable,
    topology::{PeerDirectory, Topology},
    types::{Cost, ServerId},
};

/// Number of announcement intervals a neighbor may stay silent before its
/// link is considered down.
pub const TIMEOUT_INTERVALS: u32 = 3;

/// The routing state of one node, and every rule that mutates it.
#[derive(Debug, Clone)]
pub struct Router {
    /// id of the local server
    id: ServerId,
    /// address the local server announces as its own
    addr: SocketAddrV4,
    /// directory of all servers in the network
    peers: PeerDirectory,
    /// the direct neighbors with their link state
    neighbors: NeighborRegistry,
    /// the routing table
    routes: RoutingTable,
}

impl Router {
    /// Build the startup state from a parsed topology.
    pub fn new(topology: &Topology, now: Instant) -> Self {
        let mut neighbors = NeighborRegistry::new();
        for (&id, &cost) in &topology.neighbor_costs {
            if let Some(addr) = topology.peers.addr_of(id) {
                neighbors.insert(id, addr, cost, now);
            }
        }
        let routes = RoutingTable::new(
            topology.self_id,
            &topology.peers,
            &topology.neighbor_costs,
            now,
        );
        Self {
            id: topology.self_id,
            addr: topology.self_addr,
            peers: topology.peers.clone(),
            neighbors,
            routes,
        }
    }

    /// Id of the local server.
    pub fn id(&self) -> ServerId {
        self.id
    }

    /// Address the local server announces as its own.
    pub fn addr(&self) -> SocketAddrV4 {
        self.addr
    }

    /// The peer directory.
    pub fn peers(&self) -> &PeerDirectory {
        &self.peers
    }

    /// The neighbor registry.
    pub fn neighbors(&self) -> &NeighborRegistry {
        &self.neighbors
    }

    /// The routing table.
    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    /// Returns `true` if the given id is a direct neighbor.
    pub fn is_neighbor(&self, id: ServerId) -> bool {
        self.neighbors.contains(id)
    }

    /// Record that an announcement from the given server arrived at `now`.
    pub fn touch(&mut self, id: ServerId, now: Instant) {
        self.neighbors.touch(id, now);
    }

    /// Apply a received distance vector: for every advertised destination,
    /// relax the routing table with the path through the sender. Returns
    /// `true` if any entry changed.
    ///
    /// The vector is ignored (returning `false`) unless the sender is a
    /// neighbor with a live link. For each entry, in order:
    ///
    /// 1. a strictly cheaper path through the sender replaces the current
    ///    route and adopts the sender as next hop (ties do *not* replace the
    ///    next hop, keeping routes sticky),
    /// 2. if the current route already passes through the sender, its cost
    ///    follows the sender's view even when it got worse -- including all
    ///    the way to infinity, when the sender lost the destination,
    /// 3. a destination the table has never seen is inserted with the sender
    ///    as next hop.
    ///
    /// The entry for the local server is never touched.
    pub fn handle_announcement(
        &mut self,
        sender: ServerId,
        entries: &[(ServerId, Cost)],
        now: Instant,
    ) -> bool {
        let link = match self.neighbors.cost_of(sender) {
            Some(cost) if cost.is_finite() => cost,
            Some(_) => {
                debug!("ignoring announcement from server {sender}: link is down");
                return false;
            }
            None => {
                warn!("ignoring announcement from server {sender}: not a neighbor");
                return false;
            }
        };

        let mut changed = false;
        for &(dest, advertised) in entries {
            if dest == self.id {
                continue;
            }
            let candidate = link + advertised;
            match self.routes.get(dest) {
                Some(current) => {
                    if candidate < current.cost {
                        trace!(
                            "route to {dest}: {} via {sender} improves on {}",
                            candidate,
                            current.cost
                        );
                        self.routes.update(dest, Some(sender), candidate, now);
                        changed = true;
                    } else if current.next_hop == Some(sender) && candidate != current.cost {
                        // our next hop changed its mind; follow it, even to
                        // infinity
                        trace!(
                            "route to {dest}: next hop {sender} now advertises {}",
                            candidate
                        );
                        let next_hop = candidate.is_finite().then_some(sender);
                        self.routes.update(dest, next_hop, candidate, now);
                        changed = true;
                    }
                }
                None => {
                    debug!("learned new destination {dest} via {sender} at {candidate}");
                    let next_hop = candidate.is_finite().then_some(sender);
                    self.routes.update(dest, next_hop, candidate, now);
                    changed = true;
                }
            }
        }
        changed
    }

    /// Apply an operator change of the link cost toward a neighbor. Returns
    /// `false` if the id is not a neighbor.
    ///
    /// An infinite cost invalidates every route through the neighbor. A
    /// finite cost adopts the direct route for the neighbor itself when it
    /// beats the current entry; routes to other destinations through this
    /// neighbor are corrected by its next announcement. The last-heard
    /// timestamp is refreshed so a revived link does not immediately time
    /// out again.
    pub fn update_link(&mut self, neighbor: ServerId, cost: Cost, now: Instant) -> bool {
        if !self.neighbors.set_cost(neighbor, cost) {
            return false;
        }
        self.neighbors.touch(neighbor, now);
        match cost {
            Cost::Infinite => {
                let dropped = self.routes.invalidate_via(neighbor, now);
                debug!("link to {neighbor} set to inf, {dropped} routes invalidated");
            }
            cost => {
                let current = self.routes.get(neighbor).map(|e| e.cost);
                if current.map_or(true, |c| cost < c) {
                    self.routes.update(neighbor, Some(neighbor), cost, now);
                }
            }
        }
        true
    }

    /// Take the link toward a neighbor down and invalidate every route
    /// through it. Returns `false` if the id is not a neighbor.
    pub fn disable_link(&mut self, neighbor: ServerId, now: Instant) -> bool {
        if !self.neighbors.set_cost(neighbor, Cost::Infinite) {
            return false;
        }
        let dropped = self.routes.invalidate_via(neighbor, now);
        debug!("link to {neighbor} disabled, {dropped} routes invalidated");
        true
    }

    /// Age out silent neighbors: every live neighbor not heard from for
    /// longer than `threshold` has its link taken down and its routes
    /// invalidated. Returns the ids that timed out.
    pub fn sweep_timeouts(
        &mut self,
        now: Instant,
        threshold: std::time::Duration,
    ) -> Vec<ServerId> {
        let mut expired: Vec<ServerId> = self
            .neighbors
            .iter()
            .filter(|(_, n)| {
                n.link_cost.is_finite() && now.saturating_duration_since(n.last_heard) > threshold
            })
            .map(|(id, _)| id)
            .collect();
        expired.sort();
        for &id in &expired {
            self.neighbors.set_cost(id, Cost::Infinite);
            self.routes.invalidate_via(id, now);
        }
        expired
    }
}
