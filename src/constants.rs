//! Fixed codes and display labels of the accident data set.

/// Provider codes of the two CBS accident report channels every statistic
/// is restricted to.
pub const CBS_ACCIDENT_TYPE_1_CODE: i64 = 1;
pub const CBS_ACCIDENT_TYPE_3_CODE: i64 = 3;
pub const CBS_PROVIDER_CODES: [i64; 2] = [CBS_ACCIDENT_TYPE_1_CODE, CBS_ACCIDENT_TYPE_3_CODE];

/// `road_type` of a non-urban road, away from any intersection.
pub const ROAD_TYPE_NOT_IN_CITY_NOT_IN_INTERSECTION: i64 = 3;

pub const ACCIDENT_SEVERITY_DEADLY: i64 = 1;

/// `injury_severity` values counted as injured (killed through unknown).
pub const INJURY_SEVERITIES: [i64; 5] = [1, 2, 3, 4, 5];
pub const INJURY_SEVERITY_KILLED: i64 = 1;
pub const INJURY_SEVERITY_SEVERE: i64 = 2;
pub const INJURY_SEVERITY_LIGHT: i64 = 3;

/// Lookback periods precomputed by the cache warmer.
pub const INFOGRAPHICS_CACHE_YEARS_AGO: [i64; 4] = [1, 3, 5, 8];

pub const MAX_YEARS_AGO: i64 = 100;

pub const DEFAULT_MOST_SEVERE_LIMIT: i64 = 10;
pub const DEFAULT_TOP_SEGMENTS_LIMIT: i64 = 5;

/// `involve_vehicle_type` codes.
pub mod vehicle {
    pub const CAR: i64 = 1;
    pub const TRUCK_UPTO_4: i64 = 2;
    pub const PICKUP_UPTO_4: i64 = 3;
    pub const TRUCK_4_TO_10: i64 = 4;
    pub const TRUCK_12_TO_16: i64 = 5;
    pub const TRUCK_16_TO_34: i64 = 6;
    pub const TRUCK_ABOVE_34: i64 = 7;
    pub const MOTORCYCLE_UPTO_50: i64 = 8;
    pub const MOTORCYCLE_50_TO_250: i64 = 9;
    pub const MOTORCYCLE_250_TO_500: i64 = 10;
    pub const BUS: i64 = 11;
    pub const TAXI: i64 = 12;
    pub const WORK: i64 = 13;
    pub const TRACTOR: i64 = 14;
    pub const BIKE: i64 = 15;
    pub const TRAIN: i64 = 16;
    pub const OTHER_AND_UNKNOWN: i64 = 17;
    pub const MINIBUS: i64 = 18;
    pub const MOTORCYCLE_ABOVE_500: i64 = 19;
    pub const ELECTRIC_SCOOTER: i64 = 21;
    pub const MOBILITY_SCOOTER: i64 = 22;
    pub const ELECTRIC_BIKE: i64 = 23;
    pub const TRUCK_3_5_TO_10: i64 = 24;
    pub const TRUCK_10_TO_12: i64 = 25;

    pub const PROFESSIONAL_DRIVER_VEHICLE_TYPES: &[i64] = &[
        TRUCK_UPTO_4,
        PICKUP_UPTO_4,
        TRUCK_4_TO_10,
        TRUCK_12_TO_16,
        TRUCK_16_TO_34,
        TRUCK_ABOVE_34,
        BUS,
        TAXI,
        WORK,
        TRACTOR,
        MINIBUS,
        TRUCK_3_5_TO_10,
        TRUCK_10_TO_12,
    ];

    pub const PRIVATE_DRIVER_VEHICLE_TYPES: &[i64] = &[
        CAR,
        MOTORCYCLE_UPTO_50,
        MOTORCYCLE_50_TO_250,
        MOTORCYCLE_250_TO_500,
        MOTORCYCLE_ABOVE_500,
    ];

    pub const LIGHT_ELECTRIC_VEHICLE_TYPES: &[i64] =
        &[ELECTRIC_SCOOTER, MOBILITY_SCOOTER, ELECTRIC_BIKE];

    pub const OTHER_VEHICLES_TYPES: &[i64] = &[BIKE, TRAIN, OTHER_AND_UNKNOWN];

    pub const CAR_VEHICLE_TYPES: &[i64] = &[CAR, TAXI];

    pub const LARGE_VEHICLE_TYPES: &[i64] = &[
        TRUCK_UPTO_4,
        PICKUP_UPTO_4,
        TRUCK_4_TO_10,
        TRUCK_12_TO_16,
        TRUCK_16_TO_34,
        TRUCK_ABOVE_34,
        BUS,
        MINIBUS,
        TRUCK_3_5_TO_10,
        TRUCK_10_TO_12,
    ];

    pub const MOTORCYCLE_VEHICLE_TYPES: &[i64] = &[
        MOTORCYCLE_UPTO_50,
        MOTORCYCLE_50_TO_250,
        MOTORCYCLE_250_TO_500,
        MOTORCYCLE_ABOVE_500,
    ];

    pub const BICYCLE_AND_SMALL_MOTOR_VEHICLE_TYPES: &[i64] =
        &[BIKE, ELECTRIC_SCOOTER, ELECTRIC_BIKE];
}

/// Hebrew labels as stored in the data set or shown by the front end.
pub mod labels {
    pub const SEVERITY_FATAL: &str = "קטלנית";
    pub const SEVERITY_SEVERE: &str = "קשה";
    pub const SEVERITY_LIGHT: &str = "קלה";

    /// Substring shared by every collision accident type.
    pub const COLLISION: &str = "התנגשות";

    pub const HEAD_ON_COLLISION_TYPE: &str = "התנגשות חזית בחזית";
    pub const HEAD_ON: &str = "חזיתיות";
    pub const HEAD_ON_OTHERS: &str = "אחרות";

    pub const PROFESSIONAL_DRIVER: &str = "נהג מקצועי";
    pub const PRIVATE_VEHICLE_DRIVER: &str = "נהג פרטי";
    pub const OTHER_DRIVER: &str = "אחר";

    pub const CAR_TYPE_CAR: &str = "רכב פרטי";
    pub const CAR_TYPE_LARGE: &str = "מסחרי/משאית";
    pub const CAR_TYPE_MOTORCYCLE: &str = "אופנוע";
    pub const CAR_TYPE_BICYCLE: &str = "אופניים/קורקינט";
    pub const CAR_TYPE_OTHER: &str = "אחר";

    pub const MOST_SEVERE_ACCIDENTS_TABLE_TITLE: &str = "תאונות חמורות ב";
    pub const ACCIDENT_COUNT_BY_YEAR_TITLE: &str = "כמות תאונות";
    pub const INJURED_COUNT_BY_YEAR_TITLE: &str = "כמות פצועים";
    pub const ACCIDENT_COUNT_BY_DAY_NIGHT_TITLE: &str = "כמות תאונות ביום ובלילה";
    pub const ACCIDENT_COUNT_BY_HOUR_TITLE: &str = "כמות תאונות לפי שעה";
    pub const ACCIDENT_COUNT_BY_ROAD_LIGHT_TITLE: &str = "כמות תאונות לפי תאורה";

    pub const VISION_ZERO_2_PLUS_1: &str = "vision_zero_2_plus_1";
}
