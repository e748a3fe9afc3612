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

//! Loader for the startup topology configuration.
//!
//! A topology file is plain text. The first line holds the number of servers
//! in the network, the second the number of links incident to this node.
//! Then follow one `id ip port` line per server, and one `a b cost` line per
//! incident link. The local server id is not marked explicitly: it is the id
//! that every link line has in common (ties broken toward the first field of
//! the first link line).
//!
//! ```text
//! 3
//! 2
//! 1 127.0.0.1 5001
//! 2 127.0.0.1 5002
//! 3 127.0.0.1 5003
//! 1 2 5
//! 1 3 8
//! ```

use std::{
    collections::HashMap,
    net::{Ipv4Addr, SocketAddrV4},
    path::Path,
    str::FromStr,
};

use thiserror::Error;

use crate::types::{Cost, ServerId};

/// Directory of every node in the network, including the local one, keyed by
/// id with a reverse index by socket address. Immutable after startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerDirectory {
    /// address of each server
    by_id: HashMap<ServerId, SocketAddrV4>,
    /// reverse index, used to resolve datagram senders
    by_addr: HashMap<SocketAddrV4, ServerId>,
}

impl PeerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a server. Returns `false` (and changes nothing) if the id is
    /// already present.
    pub fn insert(&mut self, id: ServerId, addr: SocketAddrV4) -> bool {
        if self.by_id.contains_key(&id) {
            return false;
        }
        self.by_id.insert(id, addr);
        self.by_addr.insert(addr, id);
        true
    }

    /// Look up the address of a server.
    pub fn addr_of(&self, id: ServerId) -> Option<SocketAddrV4> {
        self.by_id.get(&id).copied()
    }

    /// Resolve a socket address back to a server id.
    pub fn id_of(&self, addr: SocketAddrV4) -> Option<ServerId> {
        self.by_addr.get(&addr).copied()
    }

    /// Returns `true` if the given id is part of the network.
    pub fn contains(&self, id: ServerId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Iterate over all `(id, addr)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ServerId, SocketAddrV4)> + '_ {
        self.by_id.iter().map(|(id, addr)| (*id, *addr))
    }

    /// Number of servers in the network.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<(ServerId, SocketAddrV4)> for PeerDirectory {
    fn from_iter<T: IntoIterator<Item = (ServerId, SocketAddrV4)>>(iter: T) -> Self {
        let mut dir = Self::new();
        for (id, addr) in iter {
            dir.insert(id, addr);
        }
        dir
    }
}

/// The parsed startup configuration: who we are, where everybody lives, and
/// the cost of every direct link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    /// Id of the local server.
    pub self_id: ServerId,
    /// Address the local server binds its UDP socket to.
    pub self_addr: SocketAddrV4,
    /// Directory of all servers, including the local one.
    pub peers: PeerDirectory,
    /// Initial link cost of every direct neighbor.
    pub neighbor_costs: HashMap<ServerId, Cost>,
}

impl Topology {
    /// Read and parse a topology file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TopologyError> {
        std::fs::read_to_string(path)?.parse()
    }
}

impl FromStr for Topology {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let num_servers = parse_count(lines.next(), "number of servers")?;
        let num_neighbors = parse_count(lines.next(), "number of neighbors")?;

        // one `id ip port` line per server
        let mut peers = PeerDirectory::new();
        for _ in 0..num_servers {
            let (no, line) = lines.next().ok_or(TopologyError::MissingLine("server"))?;
            let mut fields = line.split_whitespace();
            let id: ServerId = parse_field(fields.next(), no, "server id")?;
            let ip: Ipv4Addr = parse_field(fields.next(), no, "server ip")?;
            let port: u16 = parse_field(fields.next(), no, "server port")?;
            if fields.next().is_some() {
                return Err(TopologyError::TrailingFields(no));
            }
            if !peers.insert(id, SocketAddrV4::new(ip, port)) {
                return Err(TopologyError::DuplicateServer(id));
            }
        }

        // one `a b cost` line per incident link
        let mut links = Vec::with_capacity(num_neighbors);
        for _ in 0..num_neighbors {
            let (no, line) = lines.next().ok_or(TopologyError::MissingLine("link"))?;
            let mut fields = line.split_whitespace();
            let a: ServerId = parse_field(fields.next(), no, "link endpoint")?;
            let b: ServerId = parse_field(fields.next(), no, "link endpoint")?;
            let cost: u32 = parse_field(fields.next(), no, "link cost")?;
            if fields.next().is_some() {
                return Err(TopologyError::TrailingFields(no));
            }
            if a == b {
                return Err(TopologyError::SelfLink(a));
            }
            for id in [a, b] {
                if !peers.contains(id) {
                    return Err(TopologyError::UnknownServer(id));
                }
            }
            links.push((a, b, Cost::Finite(cost)));
        }

        // the local id is the endpoint shared by all link lines
        let self_id = infer_self_id(&links)?;
        let self_addr = peers
            .addr_of(self_id)
            .ok_or(TopologyError::UnknownServer(self_id))?;

        let mut neighbor_costs = HashMap::new();
        for (a, b, cost) in links {
            let neighbor = if a == self_id { b } else { a };
            neighbor_costs.insert(neighbor, cost);
        }

        Ok(Topology {
            self_id,
            self_addr,
            peers,
            neighbor_costs,
        })
    }
}

/// Find the id common to all link lines. Ties (possible when every line
/// names the same pair) go to the first field of the first line.
fn infer_self_id(links: &[(ServerId, ServerId, Cost)]) -> Result<ServerId, TopologyError> {
    let (first_a, first_b, _) = *links.first().ok_or(TopologyError::NoLinks)?;
    let mut candidates = vec![first_a, first_b];
    for (a, b, _) in links.iter().skip(1) {
        candidates.retain(|c| c == a || c == b);
    }
    candidates.first().copied().ok_or(TopologyError::NoCommonEndpoint)
}

/// Parse one of the two leading count lines.
fn parse_count(
    line: Option<(usize, &str)>,
    what: &'static str,
) -> Result<usize, TopologyError> {
    let (no, line) = line.ok_or(TopologyError::MissingLine(what))?;
    line.split_whitespace()
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or(TopologyError::BadField { line: no, what })
}

/// Parse a single whitespace-separated field.
fn parse_field<T: FromStr>(
    field: Option<&str>,
    line: usize,
    what: &'static str,
) -> Result<T, TopologyError> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or(TopologyError::BadField { line, what })
}

/// Error loading a topology file. All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The file could not be read.
    #[error("cannot read topology file: {0}")]
    Io(#[from] std::io::Error),
    /// The file ended before all declared lines were found.
    #[error("missing {0} line")]
    MissingLine(&'static str),
    /// A field is absent or does not parse.
    #[error("line {line}: cannot parse {what}")]
    BadField {
        /// Line number in the file (1-based, blank lines counted).
        line: usize,
        /// Which field failed to parse.
        what: &'static str,
    },
    /// A line carries more fields than its format allows.
    #[error("line {0}: unexpected trailing fields")]
    TrailingFields(usize),
    /// Two server lines use the same id.
    #[error("duplicate server id {0}")]
    DuplicateServer(ServerId),
    /// A link line references an id with no server line.
    #[error("link references unknown server {0}")]
    UnknownServer(ServerId),
    /// A link line connects a server to itself.
    #[error("server {0} has a link to itself")]
    SelfLink(ServerId),
    /// The file declares no links, so the local server cannot be inferred.
    #[error("topology has no links; cannot determine the local server")]
    NoLinks,
    /// The link lines do not share a common endpoint.
    #[error("link lines do not share a common endpoint")]
    NoCommonEndpoint,
}
