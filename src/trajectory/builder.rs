use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use super::types::Trajectory;
use crate::store::PositionRecord;

/// Largest gap allowed between two consecutive records of one trajectory.
pub const SEGMENT_GAP: Duration = Duration::minutes(30);

/// Rebuild trajectories from an unordered set of records.
///
/// Records without a position are dropped. The rest are grouped by hex,
/// sorted by timestamp (store order breaks ties) and cut wherever two
/// consecutive records are more than [`SEGMENT_GAP`] apart. Output is ordered
/// by hex, then chronologically.
pub fn build_trajectories<'a, I>(records: I) -> Vec<Trajectory>
where
    I: IntoIterator<Item = &'a PositionRecord>,
{
    let mut groups: BTreeMap<&str, Vec<&PositionRecord>> = BTreeMap::new();
    for record in records {
        if record.position().is_none() {
            continue;
        }
        groups.entry(record.hex.as_str()).or_default().push(record);
    }

    let mut trajectories = Vec::new();
    for (_, mut group) in groups {
        // stable: equal timestamps keep store order
        group.sort_by_key(|r| r.timestamp);

        let mut open: Vec<PositionRecord> = Vec::new();
        for record in group {
            if let Some(previous) = open.last() {
                if record.timestamp - previous.timestamp > SEGMENT_GAP {
                    trajectories.extend(Trajectory::new(std::mem::take(&mut open)));
                }
            }
            open.push(record.clone());
        }
        trajectories.extend(Trajectory::new(open));
    }
    trajectories
}

/// Trajectories rebuilt per local calendar date, from the records of that
/// date only.
pub fn partition_by_date(records: &[PositionRecord]) -> BTreeMap<NaiveDate, Vec<Trajectory>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&PositionRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.position().is_some()) {
        by_date.entry(record.date()).or_default().push(record);
    }

    by_date
        .into_iter()
        .map(|(date, subset)| (date, build_trajectories(subset)))
        .collect()
}
