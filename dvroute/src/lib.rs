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

#![deny(missing_docs, missing_debug_implementations)]

//! # DvRoute
//!
//! This is the protocol engine of `dvrouted`, a distance-vector routing
//! daemon. Every node of the network runs one daemon; the daemons exchange
//! their distance vectors over UDP and cooperatively compute shortest-cost
//! paths with a Bellman--Ford relaxation that adopts the announcing neighbor
//! as next hop.
//!
//! This crate contains everything that can be computed without touching the
//! network or the clock:
//!
//! - [`types`] defines node identifiers ([`types::ServerId`]) and path costs
//!   ([`types::Cost`], with an explicit, absorbing infinity),
//! - [`wire`] encodes and decodes announcement datagrams,
//! - [`table`] and [`neighbors`] hold the routing table and the per-neighbor
//!   link state,
//! - [`engine`] ties them together in a [`engine::Router`] implementing the
//!   relaxation, the link mutations, and the neighbor timeout sweep,
//! - [`topology`] loads the startup configuration from a topology file.
//!
//! All operations take the current [`std::time::Instant`] as an argument, so
//! every protocol rule is deterministic and unit-testable. The daemon crate
//! wraps a [`engine::Router`] in a mutex and drives it from its periodic
//! ticker, its UDP receiver, and its operator command processor.
//!
//! ## Example
//!
//! ```
//! use dvroute::prelude::*;
//! use std::time::Instant;
//!
//! let topology: Topology = "\
//! 3
//! 2
//! 1 127.0.0.1 5001
//! 2 127.0.0.1 5002
//! 3 127.0.0.1 5003
//! 1 2 5
//! 1 3 8
//! "
//! .parse()
//! .unwrap();
//!
//! let now = Instant::now();
//! let mut router = Router::new(&topology, now);
//!
//! // neighbor 2 advertises a cheap path to 3
//! router.handle_announcement(
//!     ServerId(2),
//!     &[(ServerId(3), Cost::Finite(1))],
//!     now,
//! );
//! assert_eq!(router.routes().get(ServerId(3)).unwrap().cost, Cost::Finite(6));
//! ```

pub mod engine;
pub mod neighbors;
pub mod prelude;
pub mod table;
pub mod topology;
pub mod types;
pub mod wire;

#[cfg(test)]
mod test;
