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

//! Module containing all basic type definitions

use std::{net::SocketAddrV4, num::ParseIntError, ops::Add, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a server (one node of the network). The wire format carries
/// identifiers as unsigned 16-bit integers.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ServerId(pub u16);

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ServerId {
    fn from(x: u16) -> Self {
        Self(x)
    }
}

impl From<i32> for ServerId {
    fn from(x: i32) -> Self {
        Self(x as u16)
    }
}

impl From<usize> for ServerId {
    fn from(x: usize) -> Self {
        Self(x as u16)
    }
}

impl FromStr for ServerId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u16>().map(Self)
    }
}

/// Cost of a link or a path.
///
/// Unreachable destinations carry [`Cost::Infinite`], which is absorbing
/// under addition and compares greater than every finite cost. Finite costs
/// are stored as `u32` even though the wire carries only 16 bits, so that
/// sums of wire-range costs never wrap; [`Cost::add`] saturates.
///
/// The two variants are never mixed with numeric sentinels: a cost is either
/// a real number or `Infinite`, and it stays that way through decoding,
/// arithmetic, and encoding.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Cost {
    /// A finite, non-negative cost.
    Finite(u32),
    /// The destination is unreachable.
    Infinite,
}

impl Cost {
    /// The cost of the path from a node to itself.
    pub const ZERO: Cost = Cost::Finite(0);

    /// Returns `true` if the cost is finite.
    pub fn is_finite(&self) -> bool {
        matches!(self, Cost::Finite(_))
    }

    /// Returns `true` if the cost is infinite.
    pub fn is_infinite(&self) -> bool {
        matches!(self, Cost::Infinite)
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        match (self, rhs) {
            (Cost::Finite(a), Cost::Finite(b)) => Cost::Finite(a.saturating_add(b)),
            _ => Cost::Infinite,
        }
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cost::Finite(c) => write!(f, "{c}"),
            Cost::Infinite => write!(f, "inf"),
        }
    }
}

impl From<u32> for Cost {
    fn from(x: u32) -> Self {
        Cost::Finite(x)
    }
}

impl FromStr for Cost {
    type Err = ParseCostError;

    /// Parse a cost as entered by an operator or read from a topology file:
    /// either the literal `inf` (case-insensitive) or a non-negative number.
    /// Fractional values are truncated toward zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("inf") {
            return Ok(Cost::Infinite);
        }
        if let Ok(c) = s.parse::<u32>() {
            return Ok(Cost::Finite(c));
        }
        // fall back to a float so that negative and fractional inputs can be
        // told apart from garbage
        let f = s.parse::<f64>().map_err(|_| ParseCostError::NotNumeric)?;
        if f.is_nan() {
            Err(ParseCostError::NotNumeric)
        } else if f < 0.0 {
            Err(ParseCostError::Negative)
        } else if f.is_infinite() {
            Ok(Cost::Infinite)
        } else {
            Ok(Cost::Finite(f as u32))
        }
    }
}

/// Error parsing a [`Cost`] from its text form.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ParseCostError {
    /// The input is neither a number nor `inf`.
    #[error("cost is not a number")]
    NotNumeric,
    /// The input is a number, but negative.
    #[error("cost cannot be negative")]
    Negative,
}

/// Error decoding a received announcement datagram. The receiver drops the
/// datagram (without counting it) on any of these.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum WireError {
    /// The datagram is shorter than its header, or than the number of entries
    /// the header declares.
    #[error("datagram truncated: need at least {expected} bytes, got {got}")]
    Truncated {
        /// Number of bytes the header requires.
        expected: usize,
        /// Number of bytes actually received.
        got: usize,
    },
    /// The sender address is not in the peer directory.
    #[error("unknown sender {0}")]
    UnknownSender(SocketAddrV4),
}
