//! Bunch slot selection.

use std::collections::BTreeSet;
use std::fmt;

/// Set of bunch crossing ids allowed to contribute. Empty means all bunches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotFilter {
    selected: BTreeSet<u32>,
}

impl SlotFilter {
    /// Filter that accepts every bunch.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter restricted to `ids`. An empty iterator accepts every bunch.
    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        Self { selected: ids.into_iter().collect() }
    }

    /// Parse a comma-separated list such as `"1,25,1001"`.
    ///
    /// Entries that are not integers are reported and skipped.
    pub fn parse_list(list: &str) -> Self {
        let mut selected = BTreeSet::new();
        for entry in list.split(',') {
            match entry.trim().parse::<u32>() {
                Ok(bx) => {
                    selected.insert(bx);
                }
                Err(_) => tracing::warn!("{entry} is not an int"),
            }
        }
        Self { selected }
    }

    /// Whether `bx` participates.
    pub fn accepts(&self, bx: u32) -> bool {
        self.selected.is_empty() || self.selected.contains(&bx)
    }

    /// True when no selection is active.
    pub fn is_all(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.selected.iter().copied()
    }
}

impl fmt::Display for SlotFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return f.write_str("all BX");
        }
        let ids: Vec<String> = self.ids().map(|bx| bx.to_string()).collect();
        write!(f, "selected BXs: [{}]", ids.join(", "))
    }
}
