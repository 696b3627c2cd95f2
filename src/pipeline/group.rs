//! Positional regrouping of data tokens into room records.
//!
//! Token `i` of a page's data-token sequence fills field `i mod 5` of record
//! `i / 5`. There is no validation: a page whose headers slip past the filter
//! simply produces shifted records.

use crate::config::PartialRecords;
use crate::output::{RoomField, RoomRecord};

/// Fold a page's data tokens into records.
///
/// The accumulator is `(finished records, record being filled)`; a record is
/// moved to the finished list as soon as its last field is set. A trailing
/// record with fewer than five fields is appended after the fold.
pub fn group_records<I>(tokens: I) -> Vec<RoomRecord>
where
    I: IntoIterator<Item = String>,
{
    let (mut records, pending) = tokens.into_iter().enumerate().fold(
        (Vec::new(), RoomRecord::default()),
        |(mut records, mut current), (position, token)| {
            let field = RoomField::at(position);
            current.set(field, token);
            if field.is_last() {
                records.push(std::mem::take(&mut current));
            }
            (records, current)
        },
    );

    if !pending.is_empty() {
        records.push(pending);
    }
    records
}

/// Apply the partial-record policy to one page's records.
///
/// Only the final record of a page can be partial.
pub fn apply_partial_policy(mut records: Vec<RoomRecord>, policy: PartialRecords) -> Vec<RoomRecord> {
    if policy == PartialRecords::Discard && records.last().is_some_and(|r| !r.is_complete()) {
        records.pop();
    }
    records
}
