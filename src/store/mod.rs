//! Query layer over the accident data store.
//!
//! [`AccidentStore`] is the seam every statistic function reads through.
//! [`PgAccidentStore`] runs the queries against Postgres; [`MemoryStore`]
//! evaluates the same queries over rows held in memory.

mod memory;
mod postgres;
mod query;
mod schema;

pub use memory::{MemoryStore, RoadSegment};
pub use postgres::PgAccidentStore;
pub use query::{
    CountQuery, GroupCount, NewsFlash, Record, SegmentDensity, SelectQuery, SortOrder,
    round_decimals,
};
pub use schema::{
    DateWindow, Field, FieldKind, FilterValue, Filters, Scalar, TIMESTAMP_FORMAT, Table,
};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::StoreError;

#[async_trait]
pub trait AccidentStore: Send + Sync {
    /// Grouped count. Returns one row per distinct value of `group_by`,
    /// ordered by that value; an empty result is not an error.
    async fn count_by(&self, query: &CountQuery) -> Result<Vec<GroupCount>, StoreError>;

    /// Raw projected rows.
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError>;

    /// Latest accident timestamp across the whole accident table.
    async fn latest_accident_timestamp(&self) -> Result<Option<NaiveDateTime>, StoreError>;

    /// Named segments of `road1` ranked by accidents per km, densest first.
    async fn top_segments_by_density(
        &self,
        road1: i64,
        window: &DateWindow,
        limit: i64,
    ) -> Result<Vec<SegmentDensity>, StoreError>;

    async fn news_flash(&self, id: i64) -> Result<Option<NewsFlash>, StoreError>;
}
