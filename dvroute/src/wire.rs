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

//! Codec for distance-vector announcement datagrams.
//!
//! An announcement is a single UDP datagram carrying the sender's complete
//! distance vector. All fields are big-endian:
//!
//! ```text
//!   offset  size  field
//!     0      2    N (number of entries)
//!     2      2    sender_port
//!     4      4    sender_ip
//!   then N x 12 bytes:
//!     +0     4    dest_ip
//!     +4     2    dest_port
//!     +6     2    padding (0 on emit, ignored on receive)
//!     +8     2    dest_id
//!     +10    2    cost (0xFFFF encodes infinity)
//! ```
//!
//! The sender is identified by looking its `(ip, port)` pair up in the peer
//! directory; a datagram from an address outside the directory is rejected
//! with [`WireError::UnknownSender`]. Bytes beyond the `N` declared entries
//! are ignored.

use std::net::SocketAddrV4;

use serde::{Deserialize, Serialize};

use crate::{
    topology::PeerDirectory,
    types::{Cost, ServerId, WireError},
};

/// Length of the fixed datagram header.
pub const HEADER_LEN: usize = 8;
/// Length of one distance-vector entry.
pub const ENTRY_LEN: usize = 12;
/// Wire value encoding an infinite cost.
pub const INFINITE_COST: u16 = 0xFFFF;

/// A decoded announcement: the resolved sender and its advertised distance
/// vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Id of the sending server, resolved through the peer directory.
    pub sender: ServerId,
    /// Advertised `(destination, cost)` pairs, in wire order.
    pub entries: Vec<(ServerId, Cost)>,
}

/// Encode the local distance vector into an announcement datagram.
///
/// Every entry of the vector is emitted, including the one for the sender
/// itself. Destination addresses come from the peer directory; destinations
/// learned from announcements but absent from the directory are emitted with
/// address `0.0.0.0:0`. Finite costs at or above [`INFINITE_COST`] cannot be
/// represented in the 16-bit field and saturate to it, turning into infinity
/// on the receiving side.
pub fn encode_announcement(
    self_addr: SocketAddrV4,
    vector: &[(ServerId, Cost)],
    peers: &PeerDirectory,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + vector.len() * ENTRY_LEN);
    buf.extend_from_slice(&(vector.len() as u16).to_be_bytes());
    buf.extend_from_slice(&self_addr.port().to_be_bytes());
    buf.extend_from_slice(&self_addr.ip().octets());
    for &(dest, cost) in vector {
        let addr = peers
            .addr_of(dest)
            .unwrap_or_else(|| SocketAddrV4::new([0, 0, 0, 0].into(), 0));
        buf.extend_from_slice(&addr.ip().octets());
        buf.extend_from_slice(&addr.port().to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&dest.0.to_be_bytes());
        buf.extend_from_slice(&cost_to_wire(cost).to_be_bytes());
    }
    buf
}

/// Decode an announcement datagram and resolve its sender.
pub fn decode_announcement(
    buf: &[u8],
    peers: &PeerDirectory,
) -> Result<Announcement, WireError> {
    if buf.len() < HEADER_LEN {
        return Err(WireError::Truncated {
            expected: HEADER_LEN,
            got: buf.len(),
        });
    }
    let num_entries = read_u16(buf, 0) as usize;
    let sender_port = read_u16(buf, 2);
    let sender_ip: [u8; 4] = buf[4..8].try_into().expect("slice of length 4");
    let sender_addr = SocketAddrV4::new(sender_ip.into(), sender_port);
    let sender = peers
        .id_of(sender_addr)
        .ok_or(WireError::UnknownSender(sender_addr))?;

    let expected = HEADER_LEN + num_entries * ENTRY_LEN;
    if buf.len() < expected {
        return Err(WireError::Truncated {
            expected,
            got: buf.len(),
        });
    }

    let mut entries = Vec::with_capacity(num_entries);
    for i in 0..num_entries {
        let base = HEADER_LEN + i * ENTRY_LEN;
        // dest_ip (+0), dest_port (+4) and the padding (+6) are not needed to
        // apply the vector; the id alone identifies the destination.
        let dest = ServerId(read_u16(buf, base + 8));
        let cost = cost_from_wire(read_u16(buf, base + 10));
        entries.push((dest, cost));
    }

    Ok(Announcement { sender, entries })
}

/// Read a big-endian `u16` at the given offset. The caller has checked the
/// buffer length.
fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes(buf[offset..offset + 2].try_into().expect("slice of length 2"))
}

/// Map a cost onto the 16-bit wire field.
fn cost_to_wire(cost: Cost) -> u16 {
    match cost {
        Cost::Finite(c) if c < INFINITE_COST as u32 => c as u16,
        _ => INFINITE_COST,
    }
}

/// Map a 16-bit wire field back onto a cost.
fn cost_from_wire(wire: u16) -> Cost {
    if wire == INFINITE_COST {
        Cost::Infinite
    } else {
        Cost::Finite(wire as u32)
    }
}
