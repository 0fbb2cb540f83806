//! Road segments of an inter-city road ranked by accidents per km.

use crate::error::StoreError;
use crate::request::Resolution;
use crate::store::{AccidentStore, DateWindow, SegmentDensity};

/// Densest named segments of the event's road. Only inter-city roads have
/// segments; every other resolution yields nothing.
pub async fn top_road_segments_accidents_per_km(
    store: &dyn AccidentStore,
    resolution: Resolution,
    road1: Option<i64>,
    window: DateWindow,
    limit: i64,
) -> Result<Vec<SegmentDensity>, StoreError> {
    if resolution != Resolution::InterCityRoad {
        return Ok(Vec::new());
    }
    let Some(road1) = road1 else {
        return Ok(Vec::new());
    };
    store.top_segments_by_density(road1, &window, limit).await
}
