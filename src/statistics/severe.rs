//! Most severe accidents, as map points and as a casualty table.

use serde::Serialize;

use super::counts::{count_by, with_cbs_providers};
use crate::constants::{
    INJURY_SEVERITY_KILLED, INJURY_SEVERITY_LIGHT, INJURY_SEVERITY_SEVERE, labels,
};
use crate::error::StoreError;
use crate::store::{
    AccidentStore, DateWindow, Field, Filters, Record, Scalar, SelectQuery, SortOrder, Table,
};

const MOST_SEVERE_COLUMNS: &[Field] = &[
    Field::Longitude,
    Field::Latitude,
    Field::AccidentSeverityHebrew,
    Field::AccidentTimestamp,
    Field::AccidentTypeHebrew,
];

const TABLE_COLUMNS: &[Field] = &[
    Field::Id,
    Field::ProviderCode,
    Field::AccidentTimestamp,
    Field::AccidentTypeHebrew,
    Field::AccidentYear,
];

/// Most severe first, most recent first within a severity.
fn most_severe_query(columns: &[Field], filters: &Filters, window: DateWindow, limit: i64) -> SelectQuery {
    SelectQuery::new(Table::Accidents, columns)
        .filters(with_cbs_providers(filters))
        .window(window)
        .order_by(Field::AccidentSeverity, SortOrder::Asc)
        .order_by(Field::AccidentTimestamp, SortOrder::Desc)
        .limit(limit)
}

pub async fn most_severe_accidents(
    store: &dyn AccidentStore,
    filters: &Filters,
    window: DateWindow,
    limit: i64,
) -> Result<Vec<Record>, StoreError> {
    store
        .select(&most_severe_query(MOST_SEVERE_COLUMNS, filters, window, limit))
        .await
}

pub fn most_severe_accidents_table_title(location_text: &str) -> String {
    format!("{}{location_text}", labels::MOST_SEVERE_ACCIDENTS_TABLE_TITLE)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SevereAccidentRow {
    pub accident_year: Scalar,
    #[serde(rename = "type")]
    pub accident_type: Scalar,
    pub date: String,
    pub hour: String,
    pub killed_count: i64,
    pub severe_injured_count: i64,
    pub light_injured_count: i64,
    /// Severe plus light. Kept for front ends that predate the split counts.
    pub injured_count: i64,
}

/// Number of parties with `injury_severity` in one accident. No matching
/// rows counts as zero.
pub async fn casualties_count_in_accident(
    store: &dyn AccidentStore,
    accident_id: &Scalar,
    provider_code: &Scalar,
    injury_severity: i64,
    accident_year: &Scalar,
) -> Result<i64, StoreError> {
    let mut filters = Filters::new()
        .with(Field::AccidentId, accident_id.clone())
        .with(Field::ProviderCode, provider_code.clone())
        .with(Field::InjurySeverity, injury_severity);
    if !accident_year.is_null() {
        filters.insert(Field::AccidentYear, accident_year.clone());
    }
    let groups = count_by(
        store,
        Table::Involved,
        &filters,
        Field::InjurySeverity,
        DateWindow::unbounded(),
    )
    .await?;
    Ok(groups.iter().map(|g| g.count).sum())
}

async fn table_row(store: &dyn AccidentStore, accident: &Record) -> Result<SevereAccidentRow, StoreError> {
    let id = accident.value(Field::Id);
    let provider = accident.value(Field::ProviderCode);
    let year = accident.value(Field::AccidentYear);

    let (killed, severe, light) = futures::try_join!(
        casualties_count_in_accident(store, id, provider, INJURY_SEVERITY_KILLED, year),
        casualties_count_in_accident(store, id, provider, INJURY_SEVERITY_SEVERE, year),
        casualties_count_in_accident(store, id, provider, INJURY_SEVERITY_LIGHT, year),
    )?;

    let timestamp = accident.value(Field::AccidentTimestamp).as_timestamp();
    Ok(SevereAccidentRow {
        accident_year: year.clone(),
        accident_type: accident.value(Field::AccidentTypeHebrew).clone(),
        date: timestamp
            .map(|ts| ts.format("%d/%m/%y").to_string())
            .unwrap_or_default(),
        hour: timestamp
            .map(|ts| ts.format("%H:%M").to_string())
            .unwrap_or_default(),
        killed_count: killed,
        severe_injured_count: severe,
        light_injured_count: light,
        injured_count: severe + light,
    })
}

pub async fn most_severe_accidents_table(
    store: &dyn AccidentStore,
    filters: &Filters,
    window: DateWindow,
    limit: i64,
) -> Result<Vec<SevereAccidentRow>, StoreError> {
    let accidents = store
        .select(&most_severe_query(TABLE_COLUMNS, filters, window, limit))
        .await?;
    futures::future::try_join_all(accidents.iter().map(|a| table_row(store, a))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn accident(id: i64, severity: i64, when: NaiveDateTime) -> Record {
        Record::new()
            .with(Field::Id, id)
            .with(Field::ProviderCode, 1i64)
            .with(Field::AccidentSeverity, severity)
            .with(Field::AccidentSeverityHebrew, "קשה")
            .with(Field::AccidentTimestamp, when)
            .with(Field::AccidentTypeHebrew, "החלקה")
            .with(Field::AccidentYear, i64::from(chrono::Datelike::year(&when)))
            .with(Field::Longitude, 34.8)
            .with(Field::Latitude, 32.1)
    }

    fn party(accident_id: i64, injury: i64) -> Record {
        Record::new()
            .with(Field::AccidentId, accident_id)
            .with(Field::ProviderCode, 1i64)
            .with(Field::InjurySeverity, injury)
            .with(Field::AccidentYear, 2020i64)
    }

    #[tokio::test]
    async fn test_table_row_counts_casualties() {
        let store = MemoryStore::new()
            .with_accident(accident(7, 1, ts(2020, 3, 9, 17, 5)))
            .with_involved(party(7, 1))
            .with_involved(party(7, 2))
            .with_involved(party(7, 3))
            .with_involved(party(7, 3))
            .with_involved(party(8, 1));

        let rows = most_severe_accidents_table(&store, &Filters::new(), DateWindow::unbounded(), 10)
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![SevereAccidentRow {
                accident_year: Scalar::Int(2020),
                accident_type: Scalar::from("החלקה"),
                date: "09/03/20".to_string(),
                hour: "17:05".to_string(),
                killed_count: 1,
                severe_injured_count: 1,
                light_injured_count: 2,
                injured_count: 3,
            }]
        );
    }

    #[tokio::test]
    async fn test_no_casualty_rows_counts_zero() {
        let store = MemoryStore::new();
        let count = casualties_count_in_accident(
            &store,
            &Scalar::Int(1),
            &Scalar::Int(1),
            INJURY_SEVERITY_KILLED,
            &Scalar::Int(2020),
        )
        .await
        .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_most_severe_order_and_shape() {
        let store = MemoryStore::new()
            .with_accident(accident(1, 3, ts(2020, 5, 1, 8, 0)))
            .with_accident(accident(2, 1, ts(2019, 5, 1, 8, 0)))
            .with_accident(accident(3, 1, ts(2020, 1, 1, 8, 0)));

        let records = most_severe_accidents(&store, &Filters::new(), DateWindow::unbounded(), 2)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["accident_timestamp"], "2020-01-01 08:00:00");
        assert_eq!(json["accident_severity"], "קשה");
        assert_eq!(json["accident_type"], "החלקה");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_table_title() {
        assert_eq!(most_severe_accidents_table_title("חיפה"), "תאונות חמורות בחיפה");
    }
}
