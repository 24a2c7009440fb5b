// crates/conch-core/src/history.rs - Invocation history records

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::grammar::{Arguments, Grammar};

/// Record of one successful dispatch
///
/// Entries are appended by the dispatcher and never mutated or reordered.
/// They serialize to JSON for session logs; `alias` is omitted when the
/// command was invoked under its canonical name.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// When the operation was invoked
    pub timestamp: DateTime<Utc>,

    /// Canonical name of the dispatched command
    pub command: String,

    /// Alias actually typed, only when it differs from the canonical name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Arguments as parsed, in the shape the grammar produced
    pub arguments: Arguments,

    /// Grammar in effect at invocation time
    pub grammar: Grammar,

    /// Value the operation returned
    pub result: Value,
}
