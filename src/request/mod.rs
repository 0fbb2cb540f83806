//! Resolves a news flash and a lookback period into the shared request
//! context every widget reads.

mod location;
mod resolution;

pub use location::{location_filters, location_text};
pub use resolution::Resolution;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::MAX_YEARS_AGO;
use crate::error::StoreError;
use crate::store::{AccidentStore, DateWindow, Field, Filters};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Gps {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

/// Immutable per-request context.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub news_flash_id: i64,
    pub location_text: String,
    pub location_info: Filters,
    pub resolution: Resolution,
    pub gps: Gps,
    /// `(road1, road_segment_name)` recorded on the news flash, when both are set.
    pub road_segment: Option<(i64, String)>,
    pub start_time: NaiveDate,
    pub end_time: NaiveDate,
}

impl RequestParams {
    pub fn window(&self) -> DateWindow {
        DateWindow::between(self.start_time, self.end_time)
    }

    pub fn road1(&self) -> Option<i64> {
        self.location_info
            .get(Field::Road1)
            .and_then(|v| v.values().first())
            .and_then(|v| v.as_i64())
    }
}

/// January 1st of the first year covered by a `years_ago` lookback ending
/// on `end`.
pub fn start_of_lookback(end: NaiveDate, years_ago: i64) -> Option<NaiveDate> {
    let year = i64::from(end.year()) + 1 - years_ago;
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)
}

/// Builds the request context, or `None` when the request cannot be
/// answered: lookback outside `0..=100`, unknown news flash, unrecognized
/// resolution, no location data or an empty accident table.
#[tracing::instrument(skip(store))]
pub async fn build_request_params(
    store: &dyn AccidentStore,
    news_flash_id: i64,
    years_ago: i64,
) -> Result<Option<RequestParams>, StoreError> {
    if !(0..=MAX_YEARS_AGO).contains(&years_ago) {
        warn!("Lookback out of range");
        return Ok(None);
    }

    let Some(news_flash) = store.news_flash(news_flash_id).await? else {
        warn!("Could not find news flash");
        return Ok(None);
    };
    let Some(resolution) = news_flash
        .resolution
        .as_deref()
        .and_then(Resolution::from_hebrew)
    else {
        warn!(resolution = ?news_flash.resolution, "Could not find valid resolution for news flash");
        return Ok(None);
    };

    let location_info = location_filters(&news_flash, resolution);
    if location_info.is_empty() {
        warn!(%resolution, "News flash has no location data");
        return Ok(None);
    }
    let location_text = location_text(&news_flash);
    debug!(?location_info, %location_text, "Location resolved");

    let Some(latest) = store.latest_accident_timestamp().await? else {
        warn!("Accident table is empty");
        return Ok(None);
    };
    let end_time = latest.date();
    let Some(start_time) = start_of_lookback(end_time, years_ago) else {
        return Ok(None);
    };

    let road_segment = news_flash
        .road1
        .zip(news_flash.road_segment_name.clone().filter(|s| !s.is_empty()));

    Ok(Some(RequestParams {
        news_flash_id,
        location_text,
        location_info,
        resolution,
        gps: Gps {
            lon: news_flash.lon,
            lat: news_flash.lat,
        },
        road_segment,
        start_time,
        end_time,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewsFlash, Record};
    use chrono::NaiveDateTime;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(16, 30, 0)
            .unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_accident(Record::new().with(Field::AccidentTimestamp, ts(2019, 1, 1)))
            .with_accident(Record::new().with(Field::AccidentTimestamp, ts(2020, 6, 15)))
            .with_news_flash(NewsFlash {
                id: 1,
                resolution: Some("כביש בינעירוני".to_string()),
                road1: Some(90),
                road_segment_name: Some("עין גדי - מצדה".to_string()),
                yishuv_name: Some("לא רלוונטי".to_string()),
                lat: Some(31.4),
                lon: Some(35.3),
                ..Default::default()
            })
            .with_news_flash(NewsFlash {
                id: 2,
                resolution: Some("ארץ".to_string()),
                ..Default::default()
            })
            .with_news_flash(NewsFlash {
                id: 3,
                resolution: Some("עיר".to_string()),
                ..Default::default()
            })
    }

    #[tokio::test]
    async fn test_window_from_latest_accident() {
        let params = build_request_params(&store(), 1, 3).await.unwrap().unwrap();
        assert_eq!(params.start_time, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(params.end_time, NaiveDate::from_ymd_opt(2020, 6, 15).unwrap());
        assert_eq!(params.resolution, Resolution::InterCityRoad);
        assert_eq!(params.location_info.len(), 2);
        assert_eq!(params.road1(), Some(90));
        assert_eq!(params.road_segment, Some((90, "עין גדי - מצדה".to_string())));
        assert_eq!(params.location_text, "כביש 90 במקטע עין גדי - מצדה");
        assert_eq!(params.gps, Gps { lon: Some(35.3), lat: Some(31.4) });
    }

    #[tokio::test]
    async fn test_start_year_for_every_lookback() {
        let store = store();
        for years_ago in [0, 1, 5, 100] {
            let params = build_request_params(&store, 1, years_ago)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(params.start_time.year() as i64, 2020 + 1 - years_ago);
            assert_eq!((params.start_time.month(), params.start_time.day()), (1, 1));
        }
    }

    #[tokio::test]
    async fn test_unanswerable_requests_are_none() {
        let store = store();
        assert!(build_request_params(&store, 1, -1).await.unwrap().is_none());
        assert!(build_request_params(&store, 1, 101).await.unwrap().is_none());
        assert!(build_request_params(&store, 99, 1).await.unwrap().is_none());
        assert!(build_request_params(&store, 2, 1).await.unwrap().is_none());
        assert!(build_request_params(&store, 3, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_accident_table_is_none() {
        let store = MemoryStore::new().with_news_flash(NewsFlash {
            id: 1,
            resolution: Some("עיר".to_string()),
            yishuv_name: Some("חיפה".to_string()),
            ..Default::default()
        });
        assert!(build_request_params(&store, 1, 1).await.unwrap().is_none());
    }
}
