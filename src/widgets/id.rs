use std::fmt;

macro_rules! widget_ids {
    ($($variant:ident = ($rank:literal, $name:literal)),+ $(,)?) => {
        /// Stable identifier of a widget. Each id carries a unique display rank.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum WidgetId {
            $($variant),+
        }

        impl WidgetId {
            pub const ALL: &'static [WidgetId] = &[$(WidgetId::$variant),+];

            pub const fn rank(self) -> u32 {
                match self {
                    $(WidgetId::$variant => $rank),+
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(WidgetId::$variant => $name),+
                }
            }
        }
    };
}

widget_ids! {
    AccidentCountBySeverity = (1, "accident_count_by_severity"),
    MostSevereAccidentsTable = (2, "most_severe_accidents_table"),
    MostSevereAccidents = (3, "most_severe_accidents"),
    StreetView = (4, "street_view"),
    HeadOnCollisionsComparison = (5, "head_on_collisions_comparison"),
    AccidentCountByAccidentType = (6, "accident_count_by_accident_type"),
    AccidentsHeatMap = (7, "accidents_heat_map"),
    AccidentCountByAccidentYear = (8, "accident_count_by_accident_year"),
    InjuredCountByAccidentYear = (9, "injured_count_by_accident_year"),
    AccidentCountByDayNight = (10, "accident_count_by_day_night"),
    AccidentsCountByHour = (11, "accidents_count_by_hour"),
    AccidentCountByRoadLight = (12, "accident_count_by_road_light"),
    TopRoadSegmentsAccidentsPerKm = (13, "top_road_segments_accidents_per_km"),
    InjuredCountPerAgeGroup = (14, "injured_count_per_age_group"),
    VisionZero = (15, "vision_zero"),
    AccidentCountByDriverType = (16, "accident_count_by_driver_type"),
    AccidentCountByCarType = (17, "accident_count_by_car_type"),
    InjuredAccidentsWithPedestrians = (18, "injured_accidents_with_pedestrians"),
    AccidentSeverityByCrossLocation = (19, "accident_severity_by_cross_location"),
    MotorcycleAccidentsVsAllAccidents = (20, "motorcycle_accidents_vs_all_accidents"),
    AccidentsCountPedestriansPerVehicleStreetVsAll =
        (21, "accidents_count_pedestrians_per_vehicle_street_vs_all"),
}

const fn ranks_are_unique(ids: &[WidgetId]) -> bool {
    let mut i = 0;
    while i < ids.len() {
        let mut j = i + 1;
        while j < ids.len() {
            if ids[i].rank() == ids[j].rank() {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(ranks_are_unique(WidgetId::ALL), "widget ranks must be unique");

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
