use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::event::ActionStat;

/// Mean duration per label, read from an [`EventStore`](super::EventStore).
///
/// Each label's mean comes from one consistent `(count, sum)` pair, but
/// different labels may have been read at slightly different moments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    means: HashMap<String, Decimal>,
}

impl Snapshot {
    pub(crate) fn from_means(means: HashMap<String, Decimal>) -> Self {
        Self { means }
    }

    pub fn get(&self, label: &str) -> Option<Decimal> {
        self.means.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.means.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Report rows sorted by label, ready for serialization.
    pub fn into_records(self) -> Vec<ActionStat> {
        let mut rows: Vec<ActionStat> = self
            .means
            .into_iter()
            .map(|(action, time)| ActionStat { action, time })
            .collect();
        rows.sort_by(|a, b| a.action.cmp(&b.action));
        rows
    }

    pub fn into_map(self) -> HashMap<String, Decimal> {
        self.means
    }
}

impl IntoIterator for Snapshot {
    type Item = (String, Decimal);
    type IntoIter = std::collections::hash_map::IntoIter<String, Decimal>;

    fn into_iter(self) -> Self::IntoIter {
        self.means.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_sorted_by_label() {
        let snap = Snapshot::from_means(HashMap::from([
            ("skip".to_string(), Decimal::from(3)),
            ("jump".to_string(), Decimal::from(1)),
            ("run".to_string(), Decimal::from(2)),
        ]));
        let labels: Vec<_> = snap
            .into_records()
            .into_iter()
            .map(|r| r.action)
            .collect();
        assert_eq!(labels, ["jump", "run", "skip"]);
    }

    #[test]
    fn default_is_empty() {
        let snap = Snapshot::default();
        assert!(snap.is_empty());
        assert_eq!(snap.get("jump"), None);
        assert!(snap.into_records().is_empty());
    }
}
