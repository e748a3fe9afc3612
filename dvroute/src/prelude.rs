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

//! Convenience re-export of the most important structures

pub use crate::engine::{Router, TIMEOUT_INTERVALS};
pub use crate::neighbors::{Neighbor, NeighborRegistry};
pub use crate::table::{RouteEntry, RoutingTable};
pub use crate::topology::{PeerDirectory, Topology, TopologyError};
pub use crate::types::{Cost, ParseCostError, ServerId, WireError};
pub use crate::wire::{decode_announcement, encode_announcement, Announcement};
