//! Tables, columns and value types understood by the query layer.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Format used when a timestamp is rendered into JSON output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage type of a column, used to cast and decode it uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Text,
    Timestamp,
}

impl FieldKind {
    /// Postgres type every column of this kind is cast to when selected.
    pub fn pg_type(self) -> &'static str {
        match self {
            FieldKind::Int => "bigint",
            FieldKind::Float => "float8",
            FieldKind::Text => "text",
            FieldKind::Timestamp => "timestamp",
        }
    }
}

macro_rules! fields {
    ($($variant:ident => ($column:literal, $kind:ident)),+ $(,)?) => {
        /// A column of one of the accident views.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Field {
            $($variant),+
        }

        impl Field {
            /// Column name as stored in the database.
            pub fn column(self) -> &'static str {
                match self {
                    $(Field::$variant => $column),+
                }
            }

            pub fn kind(self) -> FieldKind {
                match self {
                    $(Field::$variant => FieldKind::$kind),+
                }
            }
        }
    };
}

fields! {
    Id => ("id", Int),
    AccidentId => ("accident_id", Int),
    ProviderCode => ("provider_code", Int),
    AccidentTimestamp => ("accident_timestamp", Timestamp),
    AccidentYear => ("accident_year", Int),
    AccidentHour => ("accident_hour", Int),
    AccidentSeverity => ("accident_severity", Int),
    AccidentSeverityHebrew => ("accident_severity_hebrew", Text),
    AccidentTypeHebrew => ("accident_type_hebrew", Text),
    DayNightHebrew => ("day_night_hebrew", Text),
    RoadLightHebrew => ("road_light_hebrew", Text),
    RoadType => ("road_type", Int),
    Longitude => ("longitude", Float),
    Latitude => ("latitude", Float),
    Road1 => ("road1", Int),
    Road2 => ("road2", Int),
    RoadSegmentNumber => ("road_segment_number", Int),
    RoadSegmentName => ("road_segment_name", Text),
    RoadSegmentId => ("road_segment_id", Int),
    RegionHebrew => ("region_hebrew", Text),
    DistrictHebrew => ("district_hebrew", Text),
    YishuvName => ("yishuv_name", Text),
    Street1Hebrew => ("street1_hebrew", Text),
    Street2Hebrew => ("street2_hebrew", Text),
    NonUrbanIntersectionHebrew => ("non_urban_intersection_hebrew", Text),
    InjurySeverity => ("injury_severity", Int),
    InvolveVehicleType => ("involve_vehicle_type", Int),
    AgeGroupHebrew => ("age_group_hebrew", Text),
    AccidentRegionHebrew => ("accident_region_hebrew", Text),
    AccidentDistrictHebrew => ("accident_district_hebrew", Text),
    AccidentYishuvName => ("accident_yishuv_name", Text),
}

impl Field {
    /// Key used for this column in output records: the column name without
    /// its `_hebrew` suffix.
    pub fn output_key(self) -> &'static str {
        let column = self.column();
        column.strip_suffix("_hebrew").unwrap_or(column)
    }

    /// Location column of the involved-parties view that corresponds to an
    /// accident-view location column.
    pub fn involved_counterpart(self) -> Field {
        match self {
            Field::RegionHebrew => Field::AccidentRegionHebrew,
            Field::DistrictHebrew => Field::AccidentDistrictHebrew,
            Field::YishuvName => Field::AccidentYishuvName,
            other => other,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

const ACCIDENT_COLUMNS: &[Field] = &[
    Field::Id,
    Field::ProviderCode,
    Field::AccidentTimestamp,
    Field::AccidentYear,
    Field::AccidentHour,
    Field::AccidentSeverity,
    Field::AccidentSeverityHebrew,
    Field::AccidentTypeHebrew,
    Field::DayNightHebrew,
    Field::RoadLightHebrew,
    Field::RoadType,
    Field::Longitude,
    Field::Latitude,
    Field::Road1,
    Field::Road2,
    Field::RoadSegmentNumber,
    Field::RoadSegmentName,
    Field::RoadSegmentId,
    Field::RegionHebrew,
    Field::DistrictHebrew,
    Field::YishuvName,
    Field::Street1Hebrew,
    Field::Street2Hebrew,
    Field::NonUrbanIntersectionHebrew,
];

const INVOLVED_COLUMNS: &[Field] = &[
    Field::AccidentId,
    Field::ProviderCode,
    Field::AccidentTimestamp,
    Field::AccidentYear,
    Field::InjurySeverity,
    Field::InvolveVehicleType,
    Field::AgeGroupHebrew,
    Field::AccidentRegionHebrew,
    Field::AccidentDistrictHebrew,
    Field::AccidentYishuvName,
    Field::Road1,
    Field::Road2,
    Field::RoadSegmentName,
    Field::RoadSegmentId,
    Field::Street1Hebrew,
    Field::Street2Hebrew,
    Field::NonUrbanIntersectionHebrew,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// One row per accident (`markers_hebrew`).
    Accidents,
    /// One row per involved person (`involved_markers_hebrew`).
    Involved,
    /// Reference table of numbered road segments with km bounds.
    RoadSegments,
    NewsFlash,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Accidents => "markers_hebrew",
            Table::Involved => "involved_markers_hebrew",
            Table::RoadSegments => "road_segments",
            Table::NewsFlash => "news_flash",
        }
    }

    /// Columns reachable through the generic count/select queries.
    pub fn columns(self) -> &'static [Field] {
        match self {
            Table::Accidents => ACCIDENT_COLUMNS,
            Table::Involved => INVOLVED_COLUMNS,
            Table::RoadSegments | Table::NewsFlash => &[],
        }
    }

    pub fn has_column(self, field: Field) -> bool {
        self.columns().contains(&field)
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(v) => Some(*v),
            Scalar::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Scalar::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Total order used for sorting: numbers and text by value, nulls last.
    pub fn sort_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => Ordering::Equal,
            (Scalar::Null, _) => Ordering::Greater,
            (_, Scalar::Null) => Ordering::Less,
            (Scalar::Text(a), Scalar::Text(b)) => a.cmp(b),
            (Scalar::Timestamp(a), Scalar::Timestamp(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(v) => f.write_str(v),
            Scalar::Timestamp(v) => write!(f, "{}", v.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::Int(v) => serializer.serialize_i64(*v),
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::Text(v) => serializer.serialize_str(v),
            Scalar::Timestamp(v) => serializer.collect_str(&v.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(v: NaiveDateTime) -> Self {
        Scalar::Timestamp(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

/// An equality filter: a single value, or a list matched with `IN`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl FilterValue {
    pub fn values(&self) -> &[Scalar] {
        match self {
            FilterValue::One(v) => std::slice::from_ref(v),
            FilterValue::Many(vs) => vs,
        }
    }

    pub fn matches(&self, value: &Scalar) -> bool {
        !value.is_null() && self.values().iter().any(|v| v == value)
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::One(v) => v.serialize(serializer),
            FilterValue::Many(vs) => {
                let mut seq = serializer.serialize_seq(Some(vs.len()))?;
                for v in vs {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

macro_rules! filter_value_from {
    ($($ty:ty),+) => {
        $(impl From<$ty> for FilterValue {
            fn from(v: $ty) -> Self {
                FilterValue::One(v.into())
            }
        })+
    };
}

filter_value_from!(Scalar, i64, f64, &str, String);

impl FilterValue {
    pub fn many<T: Into<Scalar>>(values: impl IntoIterator<Item = T>) -> Self {
        FilterValue::Many(values.into_iter().map(Into::into).collect())
    }
}

/// Field → value equality filters, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(BTreeMap<Field, FilterValue>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<FilterValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: Field, value: impl Into<FilterValue>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&FilterValue> {
        self.0.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FilterValue)> {
        self.0.iter().map(|(f, v)| (*f, v))
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for Filters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, value) in &self.0 {
            map.serialize_entry(field.column(), value)?;
        }
        map.end()
    }
}

/// Date bounds applied to `accident_timestamp`. Both ends are inclusive
/// calendar days; a missing bound skips that predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// First instant inside the window.
    pub fn lower_bound(&self) -> Option<NaiveDateTime> {
        self.start.and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    /// First instant after the window.
    pub fn upper_bound_exclusive(&self) -> Option<NaiveDateTime> {
        self.end
            .and_then(|d| d.checked_add_signed(Duration::days(1)))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.lower_bound().is_none_or(|lo| ts >= lo)
            && self.upper_bound_exclusive().is_none_or(|hi| ts < hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_output_key_strips_hebrew_suffix() {
        assert_eq!(Field::AccidentTypeHebrew.output_key(), "accident_type");
        assert_eq!(Field::AgeGroupHebrew.output_key(), "age_group");
        assert_eq!(Field::AccidentYear.output_key(), "accident_year");
    }

    #[test]
    fn test_involved_counterpart_renames_only_area_columns() {
        assert_eq!(
            Field::RegionHebrew.involved_counterpart(),
            Field::AccidentRegionHebrew
        );
        assert_eq!(
            Field::YishuvName.involved_counterpart(),
            Field::AccidentYishuvName
        );
        assert_eq!(Field::Road1.involved_counterpart(), Field::Road1);
    }

    #[test]
    fn test_table_columns() {
        assert!(Table::Accidents.has_column(Field::AccidentTypeHebrew));
        assert!(!Table::Accidents.has_column(Field::AgeGroupHebrew));
        assert!(Table::Involved.has_column(Field::InvolveVehicleType));
        assert!(!Table::Involved.has_column(Field::YishuvName));
        assert!(Table::RoadSegments.columns().is_empty());
    }

    #[test]
    fn test_window_includes_whole_end_day() {
        let window = DateWindow::between(
            NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 6, 15).unwrap(),
        );
        assert!(window.contains(ts(2018, 1, 1, 0)));
        assert!(window.contains(ts(2020, 6, 15, 23)));
        assert!(!window.contains(ts(2020, 6, 16, 0)));
        assert!(!window.contains(ts(2017, 12, 31, 23)));
    }

    #[test]
    fn test_unbounded_window_contains_everything() {
        assert!(DateWindow::unbounded().contains(ts(1990, 1, 1, 0)));
        assert!(!DateWindow::unbounded().is_bounded());
    }

    #[test]
    fn test_filter_value_never_matches_null() {
        let value = FilterValue::many([1i64, 3]);
        assert!(value.matches(&Scalar::Int(3)));
        assert!(!value.matches(&Scalar::Int(2)));
        assert!(!value.matches(&Scalar::Null));
    }

    #[test]
    fn test_filters_serialize_with_column_names() {
        let filters = Filters::new()
            .with(Field::YishuvName, "חיפה")
            .with(Field::ProviderCode, FilterValue::many([1i64, 3]));
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["yishuv_name"], "חיפה");
        assert_eq!(json["provider_code"], serde_json::json!([1, 3]));
    }

    #[test]
    fn test_timestamp_serializes_as_plain_string() {
        let json = serde_json::to_value(Scalar::Timestamp(ts(2020, 6, 15, 10))).unwrap();
        assert_eq!(json, "2020-06-15 10:00:00");
    }

    #[test]
    fn test_sort_cmp_puts_nulls_last() {
        let mut values = vec![Scalar::Null, Scalar::Int(3), Scalar::Int(1)];
        values.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(values, vec![Scalar::Int(1), Scalar::Int(3), Scalar::Null]);
    }
}
