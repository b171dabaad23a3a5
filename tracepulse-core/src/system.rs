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

//! Event-system classification.
//!
//! Some systems record point-in-time events (logs, exceptions, messages)
//! rather than spans with a meaningful duration, so latency and error
//! metrics do not apply to them and are suppressed from stats responses.
//! The classification is injected configuration consumed by the pipeline
//! and the response shaper, never re-derived ad hoc.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Event system prefixes suppressed by default. A system id is matched
/// on the part before the first `:`, so `log:error` is classified by
/// `log`.
const DEFAULT_EVENT_SYSTEMS: &[&str] = &["log", "exceptions", "message", "events", "other-events"];

/// Decides whether a system's duration/error metrics are meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSystemPolicy {
    event_systems: BTreeSet<String>,
}

impl Default for EventSystemPolicy {
    fn default() -> Self {
        Self {
            event_systems: DEFAULT_EVENT_SYSTEMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EventSystemPolicy {
    /// Policy with an explicit prefix set, replacing the defaults.
    pub fn with_event_systems<I, S>(systems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            event_systems: systems.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the system records events, so duration/error stats are
    /// suppressed. Pure classification, no side effects.
    pub fn is_event(&self, system: &str) -> bool {
        let prefix = system.split(':').next().unwrap_or(system);
        self.event_systems.contains(prefix)
    }
}
