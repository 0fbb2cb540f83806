//! Injured counts re-bucketed into coarse age groups.

use serde::Serialize;

use super::counts::{count_by, injured_filters};
use crate::error::StoreError;
use crate::store::{AccidentStore, DateWindow, Field, Filters, GroupCount, Table};

/// Oldest age an open-ended range (`"85+"`) is taken to reach.
const MAX_AGE: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    Children,
    Youth,
    Adults,
    Elderly,
    Unknown,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 5] = [
        AgeBucket::Children,
        AgeBucket::Youth,
        AgeBucket::Adults,
        AgeBucket::Elderly,
        AgeBucket::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Children => "0-14",
            AgeBucket::Youth => "15-24",
            AgeBucket::Adults => "25-64",
            AgeBucket::Elderly => "65+",
            AgeBucket::Unknown => "unknown",
        }
    }

    fn bounds(self) -> Option<(u32, u32)> {
        match self {
            AgeBucket::Children => Some((0, 14)),
            AgeBucket::Youth => Some((15, 24)),
            AgeBucket::Adults => Some((25, 64)),
            AgeBucket::Elderly => Some((65, MAX_AGE)),
            AgeBucket::Unknown => None,
        }
    }

    /// Bucket holding the whole of `[min, max]`. A range straddling two
    /// buckets is unknown.
    pub fn for_range(min: u32, max: u32) -> AgeBucket {
        AgeBucket::ALL
            .into_iter()
            .find(|b| b.bounds().is_some_and(|(lo, hi)| lo <= min && max <= hi))
            .unwrap_or(AgeBucket::Unknown)
    }
}

fn two_digits(s: &str) -> Option<u32> {
    let digits = s.get(..2)?;
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Parses the leading `"NN-NN"` or `"NN+"` of an age group label.
pub fn parse_age_range(label: &str) -> Option<(u32, u32)> {
    let min = two_digits(label)?;
    let rest = &label[2..];
    if let Some(upper) = rest.strip_prefix('-') {
        return two_digits(upper).map(|max| (min, max));
    }
    rest.starts_with('+').then_some((min, MAX_AGE))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeGroupCount {
    pub age_group: &'static str,
    pub count: i64,
}

/// Attributes every group's count to exactly one bucket. Buckets with no
/// input are left out.
pub fn group_by_age_bucket(groups: &[GroupCount]) -> Vec<AgeGroupCount> {
    let mut totals = [None::<i64>; AgeBucket::ALL.len()];
    for group in groups {
        let bucket = group
            .key
            .as_str()
            .and_then(parse_age_range)
            .map_or(AgeBucket::Unknown, |(min, max)| AgeBucket::for_range(min, max));
        let slot = &mut totals[bucket as usize];
        *slot = Some(slot.unwrap_or(0) + group.count);
    }
    AgeBucket::ALL
        .into_iter()
        .zip(totals)
        .filter_map(|(bucket, total)| {
            total.map(|count| AgeGroupCount {
                age_group: bucket.label(),
                count,
            })
        })
        .collect()
}

pub async fn injured_count_per_age_group(
    store: &dyn AccidentStore,
    location: &Filters,
    window: DateWindow,
) -> Result<Vec<AgeGroupCount>, StoreError> {
    let groups = count_by(
        store,
        Table::Involved,
        &injured_filters(location),
        Field::AgeGroupHebrew,
        window,
    )
    .await?;
    Ok(group_by_age_bucket(&groups))
}
