use serde::{Deserialize, Serialize};

/// Inclusive range of five-digit ZIP strings assigned to one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipRange {
    pub start: String,
    pub end: String,
    pub state_code: String,
    pub region: Option<String>,
}

/// Metropolitan-area override range. Checked before the general ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetroArea {
    pub name: String,
    pub state_code: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZipMatchKind {
    /// Matched a metropolitan override; carries the metro name.
    Metropolitan(String),
    /// Matched a general state range; carries the region label, if any.
    General(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipMatch {
    pub state_code: String,
    pub kind: ZipMatchKind,
}
