use tracing::{debug, warn};

use crate::model::{Record, RecordSet};

const KEY_DELIMITER: &str = "|";

/// Columns of `left` (in order, as cased there) that also exist in `right`
/// under any casing.
pub(crate) fn common_columns(left: &RecordSet, right: &RecordSet) -> Vec<String> {
    let right_columns = right
        .columns()
        .iter()
        .map(|name| name.to_lowercase())
        .collect::<Vec<_>>();

    left.columns()
        .iter()
        .filter(|name| right_columns.contains(&name.to_lowercase()))
        .map(|name| (*name).to_string())
        .collect()
}

/// Canonical join key: the record's values at the shared columns, trimmed and
/// lower-cased, joined with a delimiter that keeps column boundaries from
/// colliding.
pub(crate) fn normalized_key(record: &Record, columns: &[String]) -> String {
    columns
        .iter()
        .map(|name| {
            record
                .get_ignore_case(name)
                .unwrap_or("")
                .trim()
                .to_lowercase()
        })
        .collect::<Vec<_>>()
        .join(KEY_DELIMITER)
}

/// First right-hand index whose key equals `key` and is not yet consumed.
fn first_unconsumed_match(keys: &[String], consumed: &[bool], key: &str) -> Option<usize> {
    keys.iter()
        .enumerate()
        .find(|(index, candidate)| !consumed[*index] && candidate.as_str() == key)
        .map(|(index, _)| index)
}

fn merge_pair(left: &Record, right: &Record) -> Record {
    let mut merged = left.clone();
    for (name, value) in right.iter() {
        merged.insert(name, value);
    }
    merged
}

/// Greedily matches `left` rows against `right` rows on their shared columns
/// and returns the merged rows.
///
/// Matching is first-available, not best-match: each left row takes the first
/// unconsumed right row with an equal normalized key, and every right row is
/// consumed at most once. Left rows without a match are dropped. On column
/// collisions the right-hand value wins, but only for exact-cased names;
/// differently cased duplicates survive side by side. Empty inputs and an
/// empty column overlap degrade to an empty result, never an error.
#[must_use]
pub fn merge_record_sets(left: &RecordSet, right: &RecordSet) -> Vec<Record> {
    merge_with_columns(left, right).0
}

/// [`merge_record_sets`] plus the shared columns the match keyed on, so a
/// caller reporting the columns sees exactly the set the merge used.
pub(crate) fn merge_with_columns(
    left: &RecordSet,
    right: &RecordSet,
) -> (Vec<Record>, Vec<String>) {
    let columns = common_columns(left, right);
    if left.is_empty() || right.is_empty() {
        return (Vec::new(), columns);
    }
    if columns.is_empty() {
        warn!("the two documents share no columns; nothing to merge");
        return (Vec::new(), columns);
    }
    debug!(?columns, "matching rows on shared columns");

    let right_keys = right
        .records()
        .iter()
        .map(|record| normalized_key(record, &columns))
        .collect::<Vec<_>>();
    let mut consumed = vec![false; right_keys.len()];

    let mut merged = Vec::new();
    for record in left.records() {
        let key = normalized_key(record, &columns);
        let Some(index) = first_unconsumed_match(&right_keys, &consumed, &key) else {
            continue;
        };
        consumed[index] = true;
        merged.push(merge_pair(record, &right.records()[index]));
    }
    (merged, columns)
}
