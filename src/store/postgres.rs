//! Postgres backend for [`AccidentStore`].

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::debug;

use super::query::{CountQuery, GroupCount, NewsFlash, Record, SegmentDensity, SelectQuery, SortOrder};
use super::schema::{DateWindow, Field, FieldKind, Filters, Scalar, Table};
use super::AccidentStore;
use crate::error::StoreError;

pub struct PgAccidentStore {
    pool: PgPool,
}

impl PgAccidentStore {
    /// Connects a pool capped at `max_connections`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn select_expr(field: Field) -> String {
    format!(
        "{col}::{ty} AS {col}",
        col = field.column(),
        ty = field.kind().pg_type()
    )
}

fn push_scalar(qb: &mut QueryBuilder<'_, Postgres>, value: &Scalar) {
    match value {
        Scalar::Null => {
            qb.push("NULL");
        }
        Scalar::Int(v) => {
            qb.push_bind(*v);
        }
        Scalar::Float(v) => {
            qb.push_bind(*v);
        }
        Scalar::Text(v) => {
            qb.push_bind(v.clone());
        }
        Scalar::Timestamp(v) => {
            qb.push_bind(*v);
        }
    }
}

/// Appends the time window and `IN` filters. Assumes a preceding `WHERE TRUE`.
fn push_predicates(qb: &mut QueryBuilder<'_, Postgres>, filters: &Filters, window: &DateWindow) {
    if let Some(start) = window.lower_bound() {
        qb.push(" AND accident_timestamp >= ");
        qb.push_bind(start);
    }
    if let Some(end) = window.upper_bound_exclusive() {
        qb.push(" AND accident_timestamp < ");
        qb.push_bind(end);
    }
    for (field, value) in filters.iter() {
        qb.push(format!(" AND {} IN (", field.column()));
        for (i, v) in value.values().iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_scalar(qb, v);
        }
        qb.push(")");
    }
}

/// `SELECT key, COUNT(key) ... GROUP BY key ORDER BY key`.
fn count_query(query: &CountQuery) -> QueryBuilder<'static, Postgres> {
    let column = query.group_by.column();
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {}, COUNT({column}) AS count FROM {} WHERE TRUE",
        select_expr(query.group_by),
        query.table.name()
    ));
    push_predicates(&mut qb, &query.filters, &query.window);
    qb.push(format!(" GROUP BY {column} ORDER BY {column}"));
    qb
}

fn select_query(query: &SelectQuery) -> QueryBuilder<'static, Postgres> {
    let projection = query
        .columns
        .iter()
        .map(|f| select_expr(*f))
        .collect::<Vec<_>>()
        .join(", ");
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {projection} FROM {} WHERE TRUE",
        query.table.name()
    ));
    push_predicates(&mut qb, &query.filters, &query.window);

    if !query.order_by.is_empty() {
        let ordering = query
            .order_by
            .iter()
            .map(|(field, order)| match order {
                SortOrder::Asc => format!("{} ASC", field.column()),
                SortOrder::Desc => format!("{} DESC", field.column()),
            })
            .collect::<Vec<_>>()
            .join(", ");
        qb.push(format!(" ORDER BY {ordering}"));
    }
    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(limit);
    }
    qb
}

/// Segments of `road1` joined to their km range. Zero-length segments are
/// excluded before dividing.
fn top_segments_query(
    road1: i64,
    window: &DateWindow,
    limit: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        r#"
        SELECT
            m.road_segment_name::text AS road_segment_name,
            COUNT(m.road_segment_name) AS total_accidents,
            (rs.to_km - rs.from_km)::float8 AS segment_length,
            ROUND(COUNT(m.road_segment_name)::numeric / (rs.to_km - rs.from_km)::numeric, 4)::float8
                AS accidents_per_km
        FROM {} m
        JOIN {} rs ON m.road1 = rs.road AND m.road_segment_number = rs.segment
        WHERE rs.to_km > rs.from_km AND m.road_segment_name IS NOT NULL AND m.road1 = "#,
        Table::Accidents.name(),
        Table::RoadSegments.name()
    ));
    qb.push_bind(road1);
    push_predicates(&mut qb, &Filters::new(), window);
    qb.push(" GROUP BY m.road_segment_name, rs.from_km, rs.to_km ORDER BY accidents_per_km DESC LIMIT ");
    qb.push_bind(limit);
    qb
}

fn decode(row: &PgRow, index: usize, kind: FieldKind) -> Result<Scalar, sqlx::Error> {
    let value = match kind {
        FieldKind::Int => row.try_get::<Option<i64>, _>(index)?.map(Scalar::Int),
        FieldKind::Float => row.try_get::<Option<f64>, _>(index)?.map(Scalar::Float),
        FieldKind::Text => row.try_get::<Option<String>, _>(index)?.map(Scalar::Text),
        FieldKind::Timestamp => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(Scalar::Timestamp),
    };
    Ok(value.unwrap_or(Scalar::Null))
}

#[async_trait]
impl AccidentStore for PgAccidentStore {
    #[tracing::instrument(skip(self, query), fields(table = query.table.name(), group_by = %query.group_by))]
    async fn count_by(&self, query: &CountQuery) -> Result<Vec<GroupCount>, StoreError> {
        query.validate()?;

        let mut qb = count_query(query);
        let rows = qb.build().fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "Grouped count fetched");

        rows.iter()
            .map(|row| {
                Ok(GroupCount {
                    key: decode(row, 0, query.group_by.kind())?,
                    count: row.try_get::<i64, _>(1)?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(Into::into)
    }

    #[tracing::instrument(skip(self, query), fields(table = query.table.name(), columns = query.columns.len()))]
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError> {
        query.validate()?;

        let mut qb = select_query(query);
        let rows = qb.build().fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "Rows fetched");

        rows.iter()
            .map(|row| {
                let mut record = Record::new();
                for (i, field) in query.columns.iter().enumerate() {
                    record.set(*field, decode(row, i, field.kind())?);
                }
                Ok(record)
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(Into::into)
    }

    async fn latest_accident_timestamp(&self) -> Result<Option<NaiveDateTime>, StoreError> {
        let latest: Option<NaiveDateTime> = sqlx::query_scalar(&format!(
            "SELECT MAX(accident_timestamp)::timestamp FROM {}",
            Table::Accidents.name()
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(latest)
    }

    #[tracing::instrument(skip(self, window))]
    async fn top_segments_by_density(
        &self,
        road1: i64,
        window: &DateWindow,
        limit: i64,
    ) -> Result<Vec<SegmentDensity>, StoreError> {
        let mut qb = top_segments_query(road1, window, limit);
        let segments = qb
            .build_query_as::<SegmentDensity>()
            .fetch_all(&self.pool)
            .await?;
        Ok(segments)
    }

    async fn news_flash(&self, id: i64) -> Result<Option<NewsFlash>, StoreError> {
        let news_flash = sqlx::query_as::<_, NewsFlash>(&format!(
            r#"
            SELECT
                id::bigint AS id,
                resolution::text AS resolution,
                location::text AS location,
                lat::float8 AS lat,
                lon::float8 AS lon,
                road1::bigint AS road1,
                road2::bigint AS road2,
                road_segment_name::text AS road_segment_name,
                road_segment_id::bigint AS road_segment_id,
                yishuv_name::text AS yishuv_name,
                street1_hebrew::text AS street1_hebrew,
                street2_hebrew::text AS street2_hebrew,
                region_hebrew::text AS region_hebrew,
                district_hebrew::text AS district_hebrew,
                non_urban_intersection_hebrew::text AS non_urban_intersection_hebrew
            FROM {}
            WHERE id = $1
            "#,
            Table::NewsFlash.name()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(news_flash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn test_select_expr_casts_by_kind() {
        assert_eq!(select_expr(Field::Road1), "road1::bigint AS road1");
        assert_eq!(
            select_expr(Field::AccidentTimestamp),
            "accident_timestamp::timestamp AS accident_timestamp"
        );
    }

    #[test]
    fn test_predicates_render_in_lists_and_window() {
        let filters = Filters::new()
            .with(Field::ProviderCode, crate::store::FilterValue::many([1i64, 3]))
            .with(Field::YishuvName, "חיפה");
        let window = DateWindow::between(
            chrono::NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2020, 6, 15).unwrap(),
        );
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM markers_hebrew WHERE TRUE");
        push_predicates(&mut qb, &filters, &window);
        let query = qb.build();
        assert_eq!(
            query.sql(),
            "SELECT 1 FROM markers_hebrew WHERE TRUE AND accident_timestamp >= $1 \
             AND accident_timestamp < $2 AND provider_code IN ($3, $4) AND yishuv_name IN ($5)"
        );
    }

    #[test]
    fn test_unbounded_window_adds_no_time_predicate() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM markers_hebrew WHERE TRUE");
        push_predicates(&mut qb, &Filters::new(), &DateWindow::unbounded());
        assert_eq!(qb.build().sql(), "SELECT 1 FROM markers_hebrew WHERE TRUE");
    }

    fn one_line(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn window_2019_2020() -> DateWindow {
        DateWindow::between(
            chrono::NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        )
    }

    #[test]
    fn test_count_query_groups_and_orders_by_key() {
        let query = CountQuery::new(Table::Accidents, Field::AccidentSeverity)
            .filters(Filters::new().with(Field::ProviderCode, crate::store::FilterValue::many([1i64, 3])))
            .window(window_2019_2020());
        let mut qb = count_query(&query);
        assert_eq!(
            qb.build().sql(),
            "SELECT accident_severity::bigint AS accident_severity, COUNT(accident_severity) AS count \
             FROM markers_hebrew WHERE TRUE AND accident_timestamp >= $1 AND accident_timestamp < $2 \
             AND provider_code IN ($3, $4) GROUP BY accident_severity ORDER BY accident_severity"
        );
    }

    #[test]
    fn test_select_query_orders_then_limits() {
        let query = SelectQuery::new(Table::Accidents, &[Field::Id, Field::AccidentTimestamp])
            .filters(Filters::new().with(Field::YishuvName, "חיפה"))
            .order_by(Field::AccidentSeverity, SortOrder::Asc)
            .order_by(Field::AccidentTimestamp, SortOrder::Desc)
            .limit(10);
        let mut qb = select_query(&query);
        assert_eq!(
            qb.build().sql(),
            "SELECT id::bigint AS id, accident_timestamp::timestamp AS accident_timestamp \
             FROM markers_hebrew WHERE TRUE AND yishuv_name IN ($1) \
             ORDER BY accident_severity ASC, accident_timestamp DESC LIMIT $2"
        );
    }

    #[test]
    fn test_select_query_without_ordering_or_limit() {
        let query = SelectQuery::new(Table::Involved, &[Field::AccidentId]);
        let mut qb = select_query(&query);
        assert_eq!(
            qb.build().sql(),
            "SELECT accident_id::bigint AS accident_id FROM involved_markers_hebrew WHERE TRUE"
        );
    }

    #[test]
    fn test_top_segments_query_ranks_densest_first() {
        let mut qb = top_segments_query(90, &window_2019_2020(), 5);
        assert_eq!(
            one_line(qb.build().sql()),
            "SELECT m.road_segment_name::text AS road_segment_name, \
             COUNT(m.road_segment_name) AS total_accidents, \
             (rs.to_km - rs.from_km)::float8 AS segment_length, \
             ROUND(COUNT(m.road_segment_name)::numeric / (rs.to_km - rs.from_km)::numeric, 4)::float8 \
             AS accidents_per_km \
             FROM markers_hebrew m \
             JOIN road_segments rs ON m.road1 = rs.road AND m.road_segment_number = rs.segment \
             WHERE rs.to_km > rs.from_km AND m.road_segment_name IS NOT NULL AND m.road1 = $1 \
             AND accident_timestamp >= $2 AND accident_timestamp < $3 \
             GROUP BY m.road_segment_name, rs.from_km, rs.to_km \
             ORDER BY accidents_per_km DESC LIMIT $4"
        );
    }
}
