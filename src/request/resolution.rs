use std::fmt;

use crate::store::Field;

/// Granularity at which a news flash's location is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Region,
    District,
    City,
    Street,
    UrbanJunction,
    InterCityRoad,
    InterCityJunction,
    Other,
}

const OTHER_FIELDS: &[Field] = &[
    Field::RegionHebrew,
    Field::RoadSegmentName,
    Field::YishuvName,
    Field::Street1Hebrew,
    Field::Street2Hebrew,
    Field::DistrictHebrew,
    Field::Road1,
    Field::Road2,
    Field::NonUrbanIntersectionHebrew,
];

impl Resolution {
    pub const ALL: [Resolution; 8] = [
        Resolution::Region,
        Resolution::District,
        Resolution::City,
        Resolution::Street,
        Resolution::UrbanJunction,
        Resolution::InterCityRoad,
        Resolution::InterCityJunction,
        Resolution::Other,
    ];

    /// Name stored in `news_flash.resolution`.
    pub fn hebrew_name(self) -> &'static str {
        match self {
            Resolution::Region => "מחוז",
            Resolution::District => "נפה",
            Resolution::City => "עיר",
            Resolution::Street => "רחוב",
            Resolution::UrbanJunction => "צומת עירוני",
            Resolution::InterCityRoad => "כביש בינעירוני",
            Resolution::InterCityJunction => "צומת בינעירוני",
            Resolution::Other => "אחר",
        }
    }

    pub fn from_hebrew(name: &str) -> Option<Resolution> {
        Resolution::ALL
            .into_iter()
            .find(|r| r.hebrew_name() == name)
    }

    /// News flash fields that locate an event at this resolution.
    pub fn location_fields(self) -> &'static [Field] {
        match self {
            Resolution::Region => &[Field::RegionHebrew],
            Resolution::District => &[Field::DistrictHebrew],
            Resolution::City => &[Field::YishuvName],
            Resolution::Street => &[Field::YishuvName, Field::Street1Hebrew],
            Resolution::UrbanJunction => {
                &[Field::YishuvName, Field::Street1Hebrew, Field::Street2Hebrew]
            }
            Resolution::InterCityRoad => &[Field::Road1, Field::RoadSegmentName],
            Resolution::InterCityJunction => {
                &[Field::Road1, Field::Road2, Field::NonUrbanIntersectionHebrew]
            }
            Resolution::Other => OTHER_FIELDS,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hebrew_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hebrew_names_round_trip() {
        for resolution in Resolution::ALL {
            assert_eq!(
                Resolution::from_hebrew(resolution.hebrew_name()),
                Some(resolution)
            );
        }
        assert_eq!(Resolution::from_hebrew("ארץ"), None);
    }

    #[test]
    fn test_inter_city_road_fields() {
        assert_eq!(
            Resolution::InterCityRoad.location_fields(),
            &[Field::Road1, Field::RoadSegmentName]
        );
    }
}
