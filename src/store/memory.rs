//! In-memory backend for [`AccidentStore`].
//!
//! Evaluates the same query descriptions as the Postgres backend over rows
//! held in vectors. Used by the test suite and for local runs without a
//! database.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::query::{
    CountQuery, GroupCount, NewsFlash, Record, SegmentDensity, SelectQuery, SortOrder, round_decimals,
};
use super::schema::{DateWindow, Field, Filters, Scalar, Table};
use super::AccidentStore;
use crate::error::StoreError;

/// A row of the road segments reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    pub road: i64,
    pub segment: i64,
    pub from_km: f64,
    pub to_km: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    accidents: Vec<Record>,
    involved: Vec<Record>,
    segments: Vec<RoadSegment>,
    news_flashes: Vec<NewsFlash>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accident(mut self, record: Record) -> Self {
        self.accidents.push(record);
        self
    }

    pub fn with_involved(mut self, record: Record) -> Self {
        self.involved.push(record);
        self
    }

    pub fn with_segment(mut self, segment: RoadSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_news_flash(mut self, news_flash: NewsFlash) -> Self {
        self.news_flashes.push(news_flash);
        self
    }

    fn rows(&self, table: Table) -> &[Record] {
        match table {
            Table::Accidents => &self.accidents,
            Table::Involved => &self.involved,
            Table::RoadSegments | Table::NewsFlash => &[],
        }
    }

    fn matching<'a>(
        &'a self,
        table: Table,
        filters: &'a Filters,
        window: &'a DateWindow,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.rows(table).iter().filter(move |row| {
            in_window(row, window) && filters.iter().all(|(f, v)| v.matches(row.value(f)))
        })
    }
}

fn in_window(row: &Record, window: &DateWindow) -> bool {
    if !window.is_bounded() {
        return true;
    }
    row.value(Field::AccidentTimestamp)
        .as_timestamp()
        .is_some_and(|ts| window.contains(ts))
}

#[async_trait]
impl AccidentStore for MemoryStore {
    async fn count_by(&self, query: &CountQuery) -> Result<Vec<GroupCount>, StoreError> {
        query.validate()?;

        let mut groups: Vec<GroupCount> = Vec::new();
        for row in self.matching(query.table, &query.filters, &query.window) {
            let key = row.value(query.group_by);
            let increment = i64::from(!key.is_null());
            match groups.iter_mut().find(|g| &g.key == key) {
                Some(group) => group.count += increment,
                None => groups.push(GroupCount::new(key.clone(), increment)),
            }
        }
        groups.sort_by(|a, b| a.key.sort_cmp(&b.key));
        Ok(groups)
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError> {
        query.validate()?;

        let mut rows: Vec<&Record> = self
            .matching(query.table, &query.filters, &query.window)
            .collect();
        rows.sort_by(|a, b| {
            query
                .order_by
                .iter()
                .map(|(field, order)| {
                    let ord = a.value(*field).sort_cmp(b.value(*field));
                    match order {
                        SortOrder::Asc => ord,
                        SortOrder::Desc => ord.reverse(),
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let limit = query
            .limit
            .map_or(rows.len(), |l| usize::try_from(l).unwrap_or(0));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| row.project(&query.columns))
            .collect())
    }

    async fn latest_accident_timestamp(&self) -> Result<Option<NaiveDateTime>, StoreError> {
        Ok(self
            .accidents
            .iter()
            .filter_map(|row| row.value(Field::AccidentTimestamp).as_timestamp())
            .max())
    }

    async fn top_segments_by_density(
        &self,
        road1: i64,
        window: &DateWindow,
        limit: i64,
    ) -> Result<Vec<SegmentDensity>, StoreError> {
        let mut groups: Vec<(String, &RoadSegment, i64)> = Vec::new();

        for row in self.accidents.iter().filter(|row| in_window(row, window)) {
            if row.value(Field::Road1) != &Scalar::Int(road1) {
                continue;
            }
            let Some(name) = row.value(Field::RoadSegmentName).as_str() else {
                continue;
            };
            let Some(number) = row.value(Field::RoadSegmentNumber).as_i64() else {
                continue;
            };
            let Some(segment) = self
                .segments
                .iter()
                .find(|s| s.road == road1 && s.segment == number && s.to_km > s.from_km)
            else {
                continue;
            };

            match groups
                .iter_mut()
                .find(|(n, s, _)| n == name && *s == segment)
            {
                Some(group) => group.2 += 1,
                None => groups.push((name.to_string(), segment, 1)),
            }
        }

        let mut densities: Vec<SegmentDensity> = groups
            .into_iter()
            .map(|(name, segment, count)| {
                let length = segment.to_km - segment.from_km;
                SegmentDensity {
                    road_segment_name: name,
                    total_accidents: count,
                    segment_length: length,
                    accidents_per_km: round_decimals(count as f64 / length, 4),
                }
            })
            .collect();
        densities.sort_by(|a, b| b.accidents_per_km.total_cmp(&a.accidents_per_km));
        densities.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(densities)
    }

    async fn news_flash(&self, id: i64) -> Result<Option<NewsFlash>, StoreError> {
        Ok(self.news_flashes.iter().find(|nf| nf.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FilterValue;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn accident(id: i64, severity: i64, when: NaiveDateTime, city: &str) -> Record {
        Record::new()
            .with(Field::Id, id)
            .with(Field::ProviderCode, 1i64)
            .with(Field::AccidentSeverity, severity)
            .with(Field::AccidentTimestamp, when)
            .with(Field::YishuvName, city)
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_accident(accident(1, 3, ts(2019, 3, 1), "חיפה"))
            .with_accident(accident(2, 1, ts(2019, 5, 1), "חיפה"))
            .with_accident(accident(3, 1, ts(2020, 1, 1), "חיפה"))
            .with_accident(accident(4, 2, ts(2020, 2, 1), "עכו"))
    }

    #[tokio::test]
    async fn test_count_by_filters_and_groups() {
        let query = CountQuery::new(Table::Accidents, Field::AccidentSeverity)
            .filters(Filters::new().with(Field::YishuvName, "חיפה"));
        let counts = store().count_by(&query).await.unwrap();
        assert_eq!(
            counts,
            vec![GroupCount::new(1i64, 2), GroupCount::new(3i64, 1)]
        );
    }

    #[tokio::test]
    async fn test_count_by_list_filter_is_membership() {
        let query = CountQuery::new(Table::Accidents, Field::YishuvName)
            .filters(Filters::new().with(Field::AccidentSeverity, FilterValue::many([1i64, 2])));
        let counts = store().count_by(&query).await.unwrap();
        assert_eq!(
            counts,
            vec![GroupCount::new("חיפה", 2), GroupCount::new("עכו", 1)]
        );
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let query = CountQuery::new(Table::Accidents, Field::AccidentSeverity)
            .filters(Filters::new().with(Field::YishuvName, "אילת"));
        assert!(store().count_by(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_column_is_rejected() {
        let query = CountQuery::new(Table::Accidents, Field::InvolveVehicleType);
        assert!(matches!(
            store().count_by(&query).await,
            Err(StoreError::UnknownColumn { .. })
        ));
    }

    #[tokio::test]
    async fn test_select_orders_and_limits() {
        let query = SelectQuery::new(Table::Accidents, &[Field::Id])
            .order_by(Field::AccidentSeverity, SortOrder::Asc)
            .order_by(Field::AccidentTimestamp, SortOrder::Desc)
            .limit(3);
        let ids: Vec<i64> = store()
            .select(&query)
            .await
            .unwrap()
            .iter()
            .filter_map(|r| r.value(Field::Id).as_i64())
            .collect();
        assert_eq!(ids, vec![3, 2, 4]);
    }

    #[tokio::test]
    async fn test_select_respects_window() {
        let window = DateWindow::between(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        );
        let query = SelectQuery::new(Table::Accidents, &[Field::Id]).window(window);
        assert_eq!(store().select(&query).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_latest_accident_timestamp() {
        assert_eq!(
            store().latest_accident_timestamp().await.unwrap(),
            Some(ts(2020, 2, 1))
        );
        assert_eq!(
            MemoryStore::new().latest_accident_timestamp().await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_top_segments_by_density_ranks_and_limits() {
        let seg = |name: &str, number: i64| {
            Record::new()
                .with(Field::Road1, 90i64)
                .with(Field::RoadSegmentNumber, number)
                .with(Field::RoadSegmentName, name)
                .with(Field::AccidentTimestamp, ts(2020, 1, 1))
        };
        let store = MemoryStore::new()
            .with_segment(RoadSegment { road: 90, segment: 1, from_km: 0.0, to_km: 10.0 })
            .with_segment(RoadSegment { road: 90, segment: 2, from_km: 10.0, to_km: 13.0 })
            .with_accident(seg("a", 1))
            .with_accident(seg("a", 1))
            .with_accident(seg("b", 2))
            .with_accident(seg("b", 2));

        let top = store
            .top_segments_by_density(90, &DateWindow::unbounded(), 5)
            .await
            .unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].road_segment_name, "b");
        assert_eq!(top[0].accidents_per_km, 0.6667);
        assert_eq!(top[1].accidents_per_km, 0.2);

        let top = store
            .top_segments_by_density(90, &DateWindow::unbounded(), 1)
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
    }
}
