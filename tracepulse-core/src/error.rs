// Copyright 2025 Tracepulse (https://github.com/tracepulse)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Error types shared across the Tracepulse workspace.

use thiserror::Error;

/// Errors surfaced by the stats pipeline.
///
/// An empty result set is not an error: a query matching zero groups
/// returns an empty vec. Internal errors are propagated to the caller
/// unmodified; mapping them to user-visible responses is the transport
/// layer's concern.
#[derive(Debug, Error)]
pub enum TracepulseError {
    /// Rejected before any data-source call.
    #[error("invalid time window: gte {gte_us} must be before lt {lt_us}")]
    InvalidWindow { gte_us: u64, lt_us: u64 },

    /// Data-source read failure. The whole query fails; no partial or
    /// degraded result is returned and no retry is attempted here.
    #[error("data source error: {0}")]
    Source(String),

    /// The caller's cancellation token fired or its deadline passed.
    #[error("query cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, TracepulseError>;
