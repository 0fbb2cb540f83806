//! Query descriptions and result rows shared by every store backend.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::schema::{DateWindow, Field, Filters, Scalar, Table};
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// `SELECT group_by, COUNT(group_by) ... GROUP BY group_by`.
#[derive(Debug, Clone)]
pub struct CountQuery {
    pub table: Table,
    pub filters: Filters,
    pub group_by: Field,
    pub window: DateWindow,
}

impl CountQuery {
    pub fn new(table: Table, group_by: Field) -> Self {
        Self {
            table,
            filters: Filters::new(),
            group_by,
            window: DateWindow::unbounded(),
        }
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        validate_fields(
            self.table,
            self.filters
                .fields()
                .chain(std::iter::once(self.group_by))
                .chain(timestamp_field(&self.window)),
        )
    }
}

/// Projection of raw rows, optionally ordered and limited.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub table: Table,
    pub filters: Filters,
    pub columns: Vec<Field>,
    pub window: DateWindow,
    pub order_by: Vec<(Field, SortOrder)>,
    pub limit: Option<i64>,
}

impl SelectQuery {
    pub fn new(table: Table, columns: &[Field]) -> Self {
        Self {
            table,
            filters: Filters::new(),
            columns: columns.to_vec(),
            window: DateWindow::unbounded(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn order_by(mut self, field: Field, order: SortOrder) -> Self {
        self.order_by.push((field, order));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        validate_fields(
            self.table,
            self.filters
                .fields()
                .chain(self.columns.iter().copied())
                .chain(self.order_by.iter().map(|(f, _)| *f))
                .chain(timestamp_field(&self.window)),
        )
    }
}

fn timestamp_field(window: &DateWindow) -> Option<Field> {
    window.is_bounded().then_some(Field::AccidentTimestamp)
}

fn validate_fields(table: Table, mut fields: impl Iterator<Item = Field>) -> Result<(), StoreError> {
    match fields.find(|f| !table.has_column(*f)) {
        Some(field) => Err(StoreError::UnknownColumn { table, field }),
        None => Ok(()),
    }
}

/// One group of a grouped count.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCount {
    pub key: Scalar,
    pub count: i64,
}

impl GroupCount {
    pub fn new(key: impl Into<Scalar>, count: i64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// A projected row. Serializes as an object keyed by [`Field::output_key`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<(Field, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<Scalar>) -> Self {
        self.set(field, value.into());
        self
    }

    pub fn set(&mut self, field: Field, value: Scalar) {
        match self.values.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field, value)),
        }
    }

    pub fn get(&self, field: Field) -> Option<&Scalar> {
        self.values.iter().find(|(f, _)| *f == field).map(|(_, v)| v)
    }

    /// Value of `field`, treating a missing column as null.
    pub fn value(&self, field: Field) -> &Scalar {
        self.get(field).unwrap_or(&Scalar::Null)
    }

    /// Keeps only `columns`, in that order.
    pub fn project(&self, columns: &[Field]) -> Record {
        Record {
            values: columns
                .iter()
                .map(|f| (*f, self.value(*f).clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            map.serialize_entry(field.output_key(), value)?;
        }
        map.end()
    }
}

/// Accident density of one named road segment.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SegmentDensity {
    pub road_segment_name: String,
    pub total_accidents: i64,
    pub segment_length: f64,
    /// Accidents per km, rounded to 4 decimal places.
    pub accidents_per_km: f64,
}

/// Rounds half away from zero to `places` decimal places.
pub fn round_decimals(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// The news-flash fields the request builder needs.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct NewsFlash {
    pub id: i64,
    pub resolution: Option<String>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub road1: Option<i64>,
    pub road2: Option<i64>,
    pub road_segment_name: Option<String>,
    pub road_segment_id: Option<i64>,
    pub yishuv_name: Option<String>,
    pub street1_hebrew: Option<String>,
    pub street2_hebrew: Option<String>,
    pub region_hebrew: Option<String>,
    pub district_hebrew: Option<String>,
    pub non_urban_intersection_hebrew: Option<String>,
}

impl NewsFlash {
    /// Location value recorded on the news flash for an accident-view column.
    pub fn location_value(&self, field: Field) -> Scalar {
        match field {
            Field::Road1 => self.road1.into(),
            Field::Road2 => self.road2.into(),
            Field::RoadSegmentName => self.road_segment_name.clone().into(),
            Field::RoadSegmentId => self.road_segment_id.into(),
            Field::YishuvName => self.yishuv_name.clone().into(),
            Field::Street1Hebrew => self.street1_hebrew.clone().into(),
            Field::Street2Hebrew => self.street2_hebrew.clone().into(),
            Field::RegionHebrew => self.region_hebrew.clone().into(),
            Field::DistrictHebrew => self.district_hebrew.clone().into(),
            Field::NonUrbanIntersectionHebrew => {
                self.non_urban_intersection_hebrew.clone().into()
            }
            _ => Scalar::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_decimals() {
        assert_eq!(round_decimals(2.0 / 3.0, 4), 0.6667);
        assert_eq!(round_decimals(0.2, 4), 0.2);
        assert_eq!(round_decimals(1.23456, 2), 1.23);
    }

    #[test]
    fn test_count_query_rejects_column_from_other_table() {
        let query = CountQuery::new(Table::Accidents, Field::AgeGroupHebrew);
        match query.validate() {
            Err(StoreError::UnknownColumn { table, field }) => {
                assert_eq!(table, Table::Accidents);
                assert_eq!(field, Field::AgeGroupHebrew);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_select_query_validates_filters() {
        let query = SelectQuery::new(Table::Involved, &[Field::AccidentYear])
            .filters(Filters::new().with(Field::YishuvName, "חיפה"));
        assert!(query.validate().is_err());

        let query = SelectQuery::new(Table::Involved, &[Field::AccidentYear])
            .filters(Filters::new().with(Field::AccidentYishuvName, "חיפה"));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_record_serializes_output_keys_in_order() {
        let record = Record::new()
            .with(Field::AccidentSeverityHebrew, "קטלנית")
            .with(Field::Longitude, 34.8);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"accident_severity":"קטלנית","longitude":34.8}"#);
    }

    #[test]
    fn test_record_project_fills_missing_with_null() {
        let record = Record::new().with(Field::Latitude, 32.1);
        let projected = record.project(&[Field::Longitude, Field::Latitude]);
        assert_eq!(projected.value(Field::Longitude), &Scalar::Null);
        assert_eq!(projected.value(Field::Latitude), &Scalar::Float(32.1));
    }

    #[test]
    fn test_news_flash_location_value() {
        let nf = NewsFlash {
            road1: Some(90),
            yishuv_name: None,
            ..Default::default()
        };
        assert_eq!(nf.location_value(Field::Road1), Scalar::Int(90));
        assert_eq!(nf.location_value(Field::YishuvName), Scalar::Null);
    }
}
