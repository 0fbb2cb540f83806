//! Fixed datasets for widgets whose statistics are not yet implemented.
//!
//! The front end already renders these widgets, so each one returns sample
//! data in its final shape. Widgets built from here are flagged provisional
//! and never cached.

use serde::Serialize;

const LIGHT_INJURY: &str = "פצוע קל";
const SEVERE_INJURY: &str = "פצוע קשה";
const KILLED: &str = "הרוג";

pub const INJURED_ACCIDENTS_WITH_PEDESTRIANS_TITLE: &str =
    "נפגעים בתאונות עם הולכי רגל ברחוב ז׳בוטינסקי, פתח תקווה (2009-2015)";
pub const ACCIDENT_SEVERITY_BY_CROSS_LOCATION_COMMENT: &str = "בן יהודה תל אביב בין השנים 2008-2020";
pub const MOTORCYCLE_ACCIDENTS_VS_ALL_TITLE: &str = "אחוז תאונות אופנוע מכלל התאונות הקשות והקטלניות";
pub const PEDESTRIANS_PER_VEHICLE_TITLE: &str =
    "פגיעות בהולכי רגל ברחוב בן יהודה בתל אביב לפי סוג רכב פוגע, בהשוואה לתאונות עירוניות בכל הארץ";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjurySeverityCounts {
    pub light_injury_severity_text: &'static str,
    pub light_injury_severity_count: i64,
    pub severe_injury_severity_text: &'static str,
    pub severe_injury_severity_count: i64,
    pub killed_injury_severity_text: &'static str,
    pub killed_injury_severity_count: i64,
}

impl InjurySeverityCounts {
    fn new(light: i64, severe: i64, killed: i64) -> Self {
        Self {
            light_injury_severity_text: LIGHT_INJURY,
            light_injury_severity_count: light,
            severe_injury_severity_text: SEVERE_INJURY,
            severe_injury_severity_count: severe,
            killed_injury_severity_text: KILLED,
            killed_injury_severity_count: killed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearInjuries {
    pub year: i32,
    #[serde(flatten)]
    pub counts: InjurySeverityCounts,
}

pub fn injured_accidents_with_pedestrians() -> Vec<YearInjuries> {
    [
        (2009, 12, 3, 0),
        (2010, 24, 0, 1),
        (2011, 9, 2, 1),
        (2012, 21, 2, 4),
        (2013, 21, 2, 4),
        (2014, 10, 0, 1),
        (2015, 13, 2, 0),
    ]
    .into_iter()
    .map(|(year, light, severe, killed)| YearInjuries {
        year,
        counts: InjurySeverityCounts::new(light, severe, killed),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossLocationInjuries {
    pub cross_location_text: &'static str,
    #[serde(flatten)]
    pub counts: InjurySeverityCounts,
}

pub fn accident_severity_by_cross_location() -> Vec<CrossLocationInjuries> {
    vec![
        CrossLocationInjuries {
            cross_location_text: "במעבר חצייה",
            counts: InjurySeverityCounts::new(37, 6, 0),
        },
        CrossLocationInjuries {
            cross_location_text: "לא במעבר חצייה",
            counts: InjurySeverityCounts::new(11, 10, 0),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleShare {
    pub location: &'static str,
    pub vehicle: &'static str,
    pub percentage: f64,
}

pub fn motorcycle_accidents_vs_all_accidents() -> Vec<VehicleShare> {
    [
        ("כביש 20", "אופנוע", 0.5),
        ("כביש 20", "אחר", 0.5),
        ("כל הארץ", "אחר", 0.802680566),
        ("כל הארץ", "אופנוע", 0.197319434),
    ]
    .into_iter()
    .map(|(location, vehicle, percentage)| VehicleShare {
        location,
        vehicle,
        percentage,
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleAccidents {
    pub location: &'static str,
    pub vehicle: &'static str,
    pub num_of_accidents: i64,
}

pub fn accidents_count_pedestrians_per_vehicle_street_vs_all() -> Vec<VehicleAccidents> {
    [
        ("כל הארץ", "מכונית", 61307),
        ("כל הארץ", "רכב כבד", 15801),
        ("כל הארץ", "אופנוע", 3884),
        ("כל הארץ", "אופניים וקורקינט ממונע", 1867),
        ("כל הארץ", "אחר", 229),
        ("בן יהודה", "מכונית", 64),
        ("בן יהודה", "אופנוע", 40),
        ("בן יהודה", "רכב כבד", 22),
        ("בן יהודה", "אופניים וקורקינט ממונע", 9),
    ]
    .into_iter()
    .map(|(location, vehicle, num_of_accidents)| VehicleAccidents {
        location,
        vehicle,
        num_of_accidents,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_injuries_are_flat() {
        let json = serde_json::to_value(&injured_accidents_with_pedestrians()[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "year": 2009,
                "light_injury_severity_text": "פצוע קל",
                "light_injury_severity_count": 12,
                "severe_injury_severity_text": "פצוע קשה",
                "severe_injury_severity_count": 3,
                "killed_injury_severity_text": "הרוג",
                "killed_injury_severity_count": 0,
            })
        );
    }

    #[test]
    fn test_dataset_sizes() {
        assert_eq!(injured_accidents_with_pedestrians().len(), 7);
        assert_eq!(accident_severity_by_cross_location().len(), 2);
        assert_eq!(motorcycle_accidents_vs_all_accidents().len(), 4);
        assert_eq!(accidents_count_pedestrians_per_vehicle_street_vs_all().len(), 9);
    }
}
