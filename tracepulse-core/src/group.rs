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

//! Grouping dimensions for stats queries.

use serde::{Deserialize, Serialize};

use crate::span::SpanRecord;

/// Dimension to group spans by.
///
/// `System`, `Service` and `Host` are served from precomputed rollups;
/// grouping by an arbitrary attribute has no rollup table and always
/// reads raw spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    System,
    Service,
    Host,
    Attr(String),
}

impl GroupBy {
    /// Whether a precomputed rollup exists for this dimension.
    pub fn has_rollup(&self) -> bool {
        !matches!(self, GroupBy::Attr(_))
    }

    /// Extract the group key from a span. `None` drops the span from the
    /// result (e.g. the attribute is absent).
    pub fn key_of(&self, span: &SpanRecord) -> Option<String> {
        match self {
            GroupBy::System => Some(span.system.clone()),
            GroupBy::Service => Some(span.service.clone()),
            GroupBy::Host => Some(span.host.clone()),
            GroupBy::Attr(key) => span.attr(key).map(str::to_string),
        }
    }
}
