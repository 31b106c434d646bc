//! Label/name predicates for selecting instances

use crate::instance::InstanceEntry;
use serde::{Deserialize, Serialize};

/// Predicate over instance entries.
///
/// Serialized as `{ names: [..] }`, `{ label: L }` or `{ labels: [..] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    /// Entry name is one of the given names
    Names(Vec<String>),
    /// Entry carries the label
    Label(String),
    /// Entry carries at least one of the labels
    Labels(Vec<String>),
}

impl Selector {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selector::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn label(label: impl Into<String>) -> Self {
        Selector::Label(label.into())
    }

    pub fn labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selector::Labels(labels.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, entry: &InstanceEntry) -> bool {
        match self {
            Selector::Names(names) => names.iter().any(|name| name == entry.name()),
            Selector::Label(label) => entry.has_label(label),
            Selector::Labels(labels) => labels.iter().any(|label| entry.has_label(label)),
        }
    }
}
