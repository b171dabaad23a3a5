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

//! Tracepulse Core
//!
//! Fundamental types for span health statistics: time windows, span
//! rows, filters, grouping dimensions, event-system classification,
//! cancellation, and the shared error type.

pub mod cancel;
pub mod config;
pub mod error;
pub mod filter;
pub mod group;
pub mod span;
pub mod system;
pub mod window;

pub use cancel::CancelToken;
pub use config::{
    StatsConfig, DEFAULT_COMPACT_SERIES_POINTS, DEFAULT_DIGEST_COMPRESSION,
    DEFAULT_MAX_SERIES_POINTS,
};
pub use error::{Result, TracepulseError};
pub use filter::SpanFilter;
pub use group::GroupBy;
pub use span::{SpanRecord, INTERNAL_SPAN_SYSTEM};
pub use system::EventSystemPolicy;
pub use window::{TimeWindow, DAY_US, HOUR_US, MINUTE_US};
