//! Expertises - keyed `(type, id)` entries on an actor's expertise collection

use serde::{Deserialize, Serialize};

/// A single expertise entry.
///
/// Identity is the `(kind, id)` pair; the label is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expertise {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Expertise {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.kind, &self.id)
    }

    pub fn same_key(&self, other: &Expertise) -> bool {
        self.key() == other.key()
    }
}

/// Add entries not already present. Returns `None` when nothing changed.
pub fn merge_expertises(existing: &[Expertise], added: &[Expertise]) -> Option<Vec<Expertise>> {
    let mut merged = existing.to_vec();
    for expertise in added {
        if !merged.iter().any(|e| e.same_key(expertise)) {
            merged.push(expertise.clone());
        }
    }
    (merged.len() != existing.len()).then_some(merged)
}

/// Drop entries whose key is listed. Returns `None` when nothing changed.
pub fn remove_expertises(existing: &[Expertise], removed: &[Expertise]) -> Option<Vec<Expertise>> {
    let kept: Vec<Expertise> = existing
        .iter()
        .filter(|e| !removed.iter().any(|r| r.same_key(e)))
        .cloned()
        .collect();
    (kept.len() != existing.len()).then_some(kept)
}
