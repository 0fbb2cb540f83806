//! Accident totals per severity over the request window, with the years
//! the window spans.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::warn;

use super::counts::count_by;
use crate::constants::labels;
use crate::error::StoreError;
use crate::store::{AccidentStore, DateWindow, Field, Filters, GroupCount, Table};

/// Accident totals per severity over the request window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeverityCounts {
    #[serde(rename = "severity_fatal_count", skip_serializing_if = "Option::is_none")]
    pub fatal: Option<i64>,
    #[serde(rename = "severity_severe_count", skip_serializing_if = "Option::is_none")]
    pub severe: Option<i64>,
    #[serde(rename = "severity_light_count", skip_serializing_if = "Option::is_none")]
    pub light: Option<i64>,
    pub start_year: i32,
    pub end_year: i32,
    pub total_accidents_count: i64,
}

impl SeverityCounts {
    pub fn from_groups(groups: &[GroupCount], start: NaiveDate, end: NaiveDate) -> Self {
        let mut counts = SeverityCounts {
            start_year: start.year(),
            end_year: end.year(),
            ..Default::default()
        };
        for group in groups {
            let slot = match group.key.as_str() {
                Some(labels::SEVERITY_FATAL) => &mut counts.fatal,
                Some(labels::SEVERITY_SEVERE) => &mut counts.severe,
                Some(labels::SEVERITY_LIGHT) => &mut counts.light,
                _ => {
                    warn!(severity = %group.key, count = group.count, "Unknown accident severity");
                    continue;
                }
            };
            *slot = Some(group.count);
            counts.total_accidents_count += group.count;
        }
        counts
    }
}

pub async fn accident_count_by_severity(
    store: &dyn AccidentStore,
    filters: &Filters,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SeverityCounts, StoreError> {
    let groups = count_by(
        store,
        Table::Accidents,
        filters,
        Field::AccidentSeverityHebrew,
        DateWindow::between(start, end),
    )
    .await?;
    Ok(SeverityCounts::from_groups(&groups, start, end))
}
