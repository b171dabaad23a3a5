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

//! Span predicates evaluated by the data source.
//!
//! The pipeline treats the filter as opaque: it is handed to the data
//! source unchanged and never inspected during aggregation, so sources
//! backed by a real query engine can compile it into their own
//! where-clause. Decoding query parameters into a filter lives with the
//! transport layer, not here.

use serde::{Deserialize, Serialize};

use crate::span::SpanRecord;

/// Conjunctive span predicate.
///
/// All set fields must match; an empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanFilter {
    pub system: Option<String>,
    pub env: Option<String>,
    pub service: Option<String>,
    pub host: Option<String>,
}

impl SpanFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn matches(&self, span: &SpanRecord) -> bool {
        if let Some(system) = &self.system {
            if span.system != *system {
                return false;
            }
        }
        if let Some(env) = &self.env {
            if span.env != *env {
                return false;
            }
        }
        if let Some(service) = &self.service {
            if span.service != *service {
                return false;
            }
        }
        if let Some(host) = &self.host {
            if span.host != *host {
                return false;
            }
        }
        true
    }
}
