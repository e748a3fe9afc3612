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

//! Registry of the directly connected neighbors.
//!
//! The set of neighbors is fixed at startup; only the link cost and the
//! last-heard timestamp of each entry change over the lifetime of the
//! process. A neighbor whose link cost is infinite is *dead*: it receives no
//! announcements and contributes no routes until an operator revives the
//! link.

use std::{net::SocketAddrV4, time::Instant};

use itertools::Itertools;

use crate::types::{Cost, ServerId};
use std::collections::HashMap;

/// State of one direct neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    /// Socket address announcements for this neighbor are sent to.
    pub addr: SocketAddrV4,
    /// Current cost of the direct link.
    pub link_cost: Cost,
    /// When the last announcement from this neighbor arrived (initialized at
    /// startup so a silent neighbor times out relative to process start).
    pub last_heard: Instant,
}

/// All direct neighbors, keyed by server id.
#[derive(Debug, Clone, Default)]
pub struct NeighborRegistry {
    /// per-neighbor state
    neighbors: HashMap<ServerId, Neighbor>,
}

impl NeighborRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a neighbor. Only called at startup.
    pub fn insert(&mut self, id: ServerId, addr: SocketAddrV4, link_cost: Cost, now: Instant) {
        self.neighbors.insert(
            id,
            Neighbor {
                addr,
                link_cost,
                last_heard: now,
            },
        );
    }

    /// Returns `true` if the given id is a direct neighbor.
    pub fn contains(&self, id: ServerId) -> bool {
        self.neighbors.contains_key(&id)
    }

    /// Current link cost toward a neighbor.
    pub fn cost_of(&self, id: ServerId) -> Option<Cost> {
        self.neighbors.get(&id).map(|n| n.link_cost)
    }

    /// Socket address of a neighbor.
    pub fn addr_of(&self, id: ServerId) -> Option<SocketAddrV4> {
        self.neighbors.get(&id).map(|n| n.addr)
    }

    /// Set the link cost toward a neighbor. Returns `false` if the id is not
    /// a neighbor.
    pub fn set_cost(&mut self, id: ServerId, cost: Cost) -> bool {
        match self.neighbors.get_mut(&id) {
            Some(n) => {
                n.link_cost = cost;
                true
            }
            None => false,
        }
    }

    /// Record that an announcement from this neighbor arrived at `now`.
    /// Ignored for ids that are not neighbors.
    pub fn touch(&mut self, id: ServerId, now: Instant) {
        if let Some(n) = self.neighbors.get_mut(&id) {
            n.last_heard = now;
        }
    }

    /// All neighbors whose link is up, sorted by id.
    pub fn all_live(&self) -> Vec<(ServerId, SocketAddrV4)> {
        self.neighbors
            .iter()
            .filter(|(_, n)| n.link_cost.is_finite())
            .map(|(id, n)| (*id, n.addr))
            .sorted()
            .collect()
    }

    /// Iterate over all neighbors in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ServerId, &Neighbor)> + '_ {
        self.neighbors.iter().map(|(id, n)| (*id, n))
    }

    /// Number of neighbors.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns `true` if this node has no neighbors.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}
