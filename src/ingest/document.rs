//! Rendering of CSV rows into indexable documents.

use serde::{Deserialize, Serialize};

use super::table::EventRow;

/// Every document starts with this sentence.
pub const OPENING_SENTENCE: &str = "A cybersecurity event was recorded.";

/// Stand-in for an absent `event_id` or `timestamp`.
pub const NOT_AVAILABLE: &str = "N/A";

/// The event columns rendered into document text, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    AttackType,
    AttackSeverity,
    DataExfiltrated,
    ThreatIntelligence,
    ResponseAction,
    UserAgent,
}

impl EventField {
    pub const ALL: [EventField; 6] = [
        Self::AttackType,
        Self::AttackSeverity,
        Self::DataExfiltrated,
        Self::ThreatIntelligence,
        Self::ResponseAction,
        Self::UserAgent,
    ];

    /// Normalized column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::AttackType => "attack_type",
            Self::AttackSeverity => "attack_severity",
            Self::DataExfiltrated => "data_exfiltrated",
            Self::ThreatIntelligence => "threat_intelligence",
            Self::ResponseAction => "response_action",
            Self::UserAgent => "user_agent",
        }
    }

    /// Human-readable label used in the rendered clause.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AttackType => "Attack Type",
            Self::AttackSeverity => "Attack Severity",
            Self::DataExfiltrated => "Data Exfiltrated",
            Self::ThreatIntelligence => "Threat Intelligence",
            Self::ResponseAction => "Response Action",
            Self::UserAgent => "User Agent",
        }
    }
}

/// Metadata stored next to each document's vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// File name (no directories) of the CSV the row came from.
    pub source_csv: String,
    pub event_id: String,
    pub timestamp: String,
}

impl DocumentMetadata {
    /// Resolve optional identifiers to [`NOT_AVAILABLE`] when absent.
    pub fn new(source_csv: &str, event_id: Option<&str>, timestamp: Option<&str>) -> Self {
        Self {
            source_csv: source_csv.to_string(),
            event_id: event_id.unwrap_or(NOT_AVAILABLE).to_string(),
            timestamp: timestamp.unwrap_or(NOT_AVAILABLE).to_string(),
        }
    }
}

/// One row rendered as text plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// True when the content is the opening sentence alone.
    pub fn is_uninformative(&self) -> bool {
        self.content == OPENING_SENTENCE
    }
}

/// Render a row: the opening sentence followed by one `"Label: value."` clause per
/// present event field, in [`EventField::ALL`] order.
pub fn render_document(row: &EventRow<'_>, source_csv: &str) -> Document {
    let mut parts = vec![OPENING_SENTENCE.to_string()];
    parts.extend(
        EventField::ALL
            .iter()
            .filter_map(|field| row.value(field.column()).map(|v| format!("{}: {v}.", field.label()))),
    );

    Document {
        content: parts.join(" "),
        metadata: DocumentMetadata::new(source_csv, row.value("event_id"), row.value("timestamp")),
    }
}
