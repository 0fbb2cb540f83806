//! Fatal head-on collisions on the event's segment against all roads.

use serde::Serialize;

use super::counts::count_by;
use crate::constants::{ACCIDENT_SEVERITY_DEADLY, ROAD_TYPE_NOT_IN_CITY_NOT_IN_INTERSECTION, labels};
use crate::error::StoreError;
use crate::store::{AccidentStore, DateWindow, Field, Filters, GroupCount, Table};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescCount {
    pub desc: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadOnComparison {
    pub specific_road_segment_fatal_accidents: Vec<DescCount>,
    pub all_roads_fatal_accidents: Vec<DescCount>,
}

/// Splits accident type counts into `[head-on, others]`.
pub fn sum_by_specific_type(groups: &[GroupCount], accident_type: &str) -> Vec<DescCount> {
    let (mut specific, mut others) = (0, 0);
    for group in groups {
        if group.key.as_str() == Some(accident_type) {
            specific += group.count;
        } else {
            others += group.count;
        }
    }
    vec![
        DescCount {
            desc: labels::HEAD_ON,
            count: specific,
        },
        DescCount {
            desc: labels::HEAD_ON_OTHERS,
            count: others,
        },
    ]
}

/// Compares the segment `(road1, road_segment_name)` against every non-urban
/// road. Without a segment the segment side is all zeros.
pub async fn head_on_collisions_comparison(
    store: &dyn AccidentStore,
    road_segment: Option<(i64, &str)>,
    window: DateWindow,
) -> Result<HeadOnComparison, StoreError> {
    let base = Filters::new()
        .with(Field::RoadType, ROAD_TYPE_NOT_IN_CITY_NOT_IN_INTERSECTION)
        .with(Field::AccidentSeverity, ACCIDENT_SEVERITY_DEADLY);

    let all_roads = count_by(store, Table::Accidents, &base, Field::AccidentTypeHebrew, window);
    let segment = async {
        match road_segment {
            Some((road1, name)) => {
                let filters = base
                    .clone()
                    .with(Field::Road1, road1)
                    .with(Field::RoadSegmentName, name);
                count_by(store, Table::Accidents, &filters, Field::AccidentTypeHebrew, window).await
            }
            None => Ok(Vec::new()),
        }
    };
    let (all_roads, segment) = futures::try_join!(all_roads, segment)?;

    Ok(HeadOnComparison {
        specific_road_segment_fatal_accidents: sum_by_specific_type(
            &segment,
            labels::HEAD_ON_COLLISION_TYPE,
        ),
        all_roads_fatal_accidents: sum_by_specific_type(&all_roads, labels::HEAD_ON_COLLISION_TYPE),
    })
}
