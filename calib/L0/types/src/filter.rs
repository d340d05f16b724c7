//! Allow-lists selecting which muscles and coordinates take part in a run.
//!
//! Setup files express "everything" as an empty list or as a single `"ALL"`
//! (or empty string) entry. That convention is collapsed into
//! [`AllowList::All`] at the boundary so the rest of the pipeline never sees
//! the sentinel strings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Sentinel name meaning "every item".
pub const ALLOW_ALL: &str = "ALL";

/// Names enabled for processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum AllowList {
    /// Every name is enabled.
    #[default]
    All,
    /// Only the listed names are enabled.
    Subset(BTreeSet<String>),
}

impl AllowList {
    /// Build an allow-list from setup-file entries.
    ///
    /// An empty list, or a list whose first entry is `"ALL"` or `""`, enables
    /// everything.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        match names.first() {
            None => Self::All,
            Some(first) if first == ALLOW_ALL || first.is_empty() => Self::All,
            Some(_) => Self::Subset(names.into_iter().collect()),
        }
    }

    /// Check whether `name` is enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Subset(names) => names.contains(name),
        }
    }

    /// Check whether this list enables everything.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<Vec<String>> for AllowList {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<AllowList> for Vec<String> {
    fn from(list: AllowList) -> Self {
        match list {
            AllowList::All => vec![ALLOW_ALL.to_string()],
            AllowList::Subset(names) => names.into_iter().collect(),
        }
    }
}

/// Check whether `name` is enabled by `allow_list`.
#[must_use]
pub fn is_enabled(name: &str, allow_list: &AllowList) -> bool {
    allow_list.is_enabled(name)
}
