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

//! The routing table: the current best-known route to every destination.
//!
//! Invariants, maintained by every operation:
//!
//! - the entry for the local server is `(next_hop = self, cost = 0)` and is
//!   never mutated,
//! - an entry has an infinite cost if and only if it has no next hop,
//! - the table holds an entry for every server of the peer directory (plus
//!   any destination learned from an announcement).

use std::{collections::HashMap, time::Instant};

use itertools::Itertools;

use crate::{
    topology::PeerDirectory,
    types::{Cost, ServerId},
};

/// One routing table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    /// The neighbor the route passes through, or `None` when the destination
    /// is unreachable.
    pub next_hop: Option<ServerId>,
    /// Total cost of the route.
    pub cost: Cost,
    /// When this entry was last written.
    pub last_update: Instant,
}

/// The routing table of the local server.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    /// id of the local server, whose entry is immutable
    self_id: ServerId,
    /// one entry per known destination
    entries: HashMap<ServerId, RouteEntry>,
}

impl RoutingTable {
    /// Create the startup table: cost 0 to self, the link cost to every
    /// direct neighbor, and infinity everywhere else.
    pub fn new(
        self_id: ServerId,
        peers: &PeerDirectory,
        neighbor_costs: &HashMap<ServerId, Cost>,
        now: Instant,
    ) -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            self_id,
            RouteEntry {
                next_hop: Some(self_id),
                cost: Cost::ZERO,
                last_update: now,
            },
        );
        for (id, _) in peers.iter() {
            if id == self_id {
                continue;
            }
            let entry = match neighbor_costs.get(&id) {
                Some(&cost) => RouteEntry {
                    next_hop: Some(id),
                    cost,
                    last_update: now,
                },
                None => RouteEntry {
                    next_hop: None,
                    cost: Cost::Infinite,
                    last_update: now,
                },
            };
            entries.insert(id, entry);
        }
        Self { self_id, entries }
    }

    /// Id of the local server.
    pub fn self_id(&self) -> ServerId {
        self.self_id
    }

    /// Look up the route toward a destination.
    pub fn get(&self, dest: ServerId) -> Option<&RouteEntry> {
        self.entries.get(&dest)
    }

    /// Write the route toward a destination. The entry for the local server
    /// is protected and silently left unchanged.
    pub fn update(&mut self, dest: ServerId, next_hop: Option<ServerId>, cost: Cost, now: Instant) {
        if dest == self.self_id {
            return;
        }
        self.entries.insert(
            dest,
            RouteEntry {
                next_hop,
                cost,
                last_update: now,
            },
        );
    }

    /// Invalidate every route whose next hop is the given neighbor. Returns
    /// how many entries were invalidated.
    pub fn invalidate_via(&mut self, neighbor: ServerId, now: Instant) -> usize {
        let mut invalidated = 0;
        for (dest, entry) in self.entries.iter_mut() {
            if *dest != self.self_id && entry.next_hop == Some(neighbor) {
                entry.next_hop = None;
                entry.cost = Cost::Infinite;
                entry.last_update = now;
                invalidated += 1;
            }
        }
        invalidated
    }

    /// The current distance vector: every `(destination, cost)` pair, sorted
    /// by destination id. This is what gets announced to the neighbors.
    pub fn snapshot(&self) -> Vec<(ServerId, Cost)> {
        self.entries
            .iter()
            .map(|(dest, entry)| (*dest, entry.cost))
            .sorted()
            .collect()
    }

    /// Render the table for the `display` command: one line per destination,
    /// sorted by id, as `<dest> <next_hop|-> <cost|inf>`.
    pub fn fmt_rows(&self) -> Vec<String> {
        self.entries
            .iter()
            .sorted_by_key(|(dest, _)| *dest)
            .map(|(dest, entry)| {
                let next_hop = match entry.next_hop {
                    Some(hop) => hop.to_string(),
                    None => "-".to_string(),
                };
                format!("{dest} {next_hop} {}", entry.cost)
            })
            .collect()
    }

    /// Iterate over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ServerId, &RouteEntry)> + '_ {
        self.entries.iter().map(|(dest, entry)| (*dest, entry))
    }

    /// Number of destinations in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table is empty (never the case after startup).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
