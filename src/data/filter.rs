//! State selection filter

use crate::data::processor::{StateRow, StateSummary};
use std::collections::HashSet;

/// Rows of a `StateSummary` whose codes were selected, in summary order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSummary<'a> {
    rows: Vec<&'a StateRow>,
}

impl<'a> FilteredSummary<'a> {
    pub fn rows(&self) -> &[&'a StateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn codes(&self) -> Vec<&'a str> {
        self.rows.iter().map(|r| r.state_code.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a StateRow> + '_ {
        self.rows.iter().copied()
    }
}

/// Keep the rows whose state code is in `selected`.
///
/// Codes that are not in the summary are ignored; an empty selection gives an
/// empty view.
pub fn filter_by_states<'a, S: AsRef<str>>(
    summary: &'a StateSummary,
    selected: &[S],
) -> FilteredSummary<'a> {
    let wanted: HashSet<&str> = selected.iter().map(|s| s.as_ref()).collect();
    FilteredSummary {
        rows: summary
            .rows()
            .iter()
            .filter(|row| wanted.contains(row.state_code.as_str()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> StateSummary {
        StateSummary::from_rows(
            vec![
                StateRow::new("California", "CA", 2, 39_000_000),
                StateRow::new("Wyoming", "WY", 0, 580_000),
                StateRow::new("Texas", "TX", 1, 29_000_000),
            ],
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn all_codes_give_the_full_table() {
        let summary = summary();
        let filtered = filter_by_states(&summary, &summary.state_codes());
        let full: Vec<&StateRow> = summary.rows().iter().collect();
        assert_eq!(filtered.rows(), full.as_slice());
    }

    #[test]
    fn empty_selection_is_empty() {
        let summary = summary();
        let none: [&str; 0] = [];
        assert!(filter_by_states(&summary, &none).is_empty());
    }

    #[test]
    fn keeps_summary_order_not_selection_order() {
        let summary = summary();
        let filtered = filter_by_states(&summary, &["TX", "CA", "ZZ"]);
        assert_eq!(filtered.codes(), vec!["CA", "TX"]);
        assert_eq!(filtered.len(), 2);
    }
}
