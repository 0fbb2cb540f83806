//! Statistic functions. Each reads through an [`AccidentStore`] and returns
//! one shaped dataset.
//!
//! [`AccidentStore`]: crate::store::AccidentStore

pub mod ages;
pub mod counts;
pub mod head_on;
pub mod provisional;
pub mod segments;
pub mod severe;
pub mod severity;
pub mod utility;
pub mod vehicles;

pub use ages::{AgeGroupCount, group_by_age_bucket, injured_count_per_age_group};
pub use counts::{
    CategoryCount, accident_count_by_accident_type, accidents_heat_map, category_counts, count_by,
    injured_filters, merge_collision_types, with_cbs_providers,
};
pub use head_on::{HeadOnComparison, head_on_collisions_comparison};
pub use segments::top_road_segments_accidents_per_km;
pub use severe::{
    SevereAccidentRow, most_severe_accidents, most_severe_accidents_table,
    most_severe_accidents_table_title,
};
pub use severity::{SeverityCounts, accident_count_by_severity};
pub use vehicles::{
    CarTypeShares, NationalBaselineCache, count_accidents_by_driver_type, involved_by_vehicle_type,
    stats_accidents_by_car_type_with_national_data,
};
