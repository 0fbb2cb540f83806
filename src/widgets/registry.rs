//! The ordered widget registry. Registry order is the response order.

use super::builders as b;
use super::{Widget, WidgetContext, WidgetFuture, WidgetId};

pub type GenerateFn = for<'a> fn(&'a WidgetContext) -> WidgetFuture<'a>;
pub type InclusionPredicate = fn(&Widget) -> bool;

#[derive(Clone, Copy)]
pub struct WidgetDef {
    pub id: WidgetId,
    pub generate: GenerateFn,
    /// Evaluated on the generated widget; `None` always includes it.
    pub include: Option<InclusionPredicate>,
    pub cacheable: bool,
}

impl WidgetDef {
    pub const fn new(id: WidgetId, generate: GenerateFn) -> Self {
        Self {
            id,
            generate,
            include: None,
            cacheable: true,
        }
    }

    pub const fn included_when(mut self, predicate: InclusionPredicate) -> Self {
        self.include = Some(predicate);
        self
    }

    pub const fn not_cached(mut self) -> Self {
        self.cacheable = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn includes(&self, widget: &Widget) -> bool {
        self.include.is_none_or(|predicate| predicate(widget))
    }
}

impl std::fmt::Debug for WidgetDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetDef")
            .field("name", &self.id.name())
            .field("rank", &self.id.rank())
            .field("cacheable", &self.cacheable)
            .finish()
    }
}

/// Which registry entries a generation pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetSelection {
    All,
    Cached,
    Uncached,
}

impl WidgetSelection {
    pub fn selects(self, def: &WidgetDef) -> bool {
        match self {
            WidgetSelection::All => true,
            WidgetSelection::Cached => def.cacheable,
            WidgetSelection::Uncached => !def.cacheable,
        }
    }
}

fn has_items(widget: &Widget) -> bool {
    !widget.is_empty()
}

pub static WIDGETS: &[WidgetDef] = &[
    WidgetDef::new(WidgetId::AccidentCountBySeverity, b::accident_count_by_severity),
    WidgetDef::new(WidgetId::MostSevereAccidentsTable, b::most_severe_accidents_table)
        .included_when(has_items),
    WidgetDef::new(WidgetId::MostSevereAccidents, b::most_severe_accidents),
    WidgetDef::new(WidgetId::StreetView, b::street_view),
    WidgetDef::new(WidgetId::HeadOnCollisionsComparison, b::head_on_collisions_comparison),
    WidgetDef::new(WidgetId::AccidentCountByAccidentType, b::accident_count_by_accident_type),
    WidgetDef::new(WidgetId::AccidentsHeatMap, b::accidents_heat_map),
    WidgetDef::new(WidgetId::AccidentCountByAccidentYear, b::accident_count_by_accident_year),
    WidgetDef::new(WidgetId::InjuredCountByAccidentYear, b::injured_count_by_accident_year),
    WidgetDef::new(WidgetId::AccidentCountByDayNight, b::accident_count_by_day_night),
    WidgetDef::new(WidgetId::AccidentsCountByHour, b::accidents_count_by_hour),
    WidgetDef::new(WidgetId::AccidentCountByRoadLight, b::accident_count_by_road_light),
    WidgetDef::new(
        WidgetId::TopRoadSegmentsAccidentsPerKm,
        b::top_road_segments_accidents_per_km,
    )
    .included_when(has_items),
    WidgetDef::new(WidgetId::InjuredCountPerAgeGroup, b::injured_count_per_age_group),
    WidgetDef::new(WidgetId::VisionZero, b::vision_zero),
    WidgetDef::new(WidgetId::AccidentCountByDriverType, b::accident_count_by_driver_type),
    WidgetDef::new(WidgetId::AccidentCountByCarType, b::accident_count_by_car_type),
    WidgetDef::new(
        WidgetId::InjuredAccidentsWithPedestrians,
        b::injured_accidents_with_pedestrians,
    )
    .not_cached(),
    WidgetDef::new(
        WidgetId::AccidentSeverityByCrossLocation,
        b::accident_severity_by_cross_location,
    )
    .not_cached(),
    WidgetDef::new(
        WidgetId::MotorcycleAccidentsVsAllAccidents,
        b::motorcycle_accidents_vs_all_accidents,
    )
    .not_cached(),
    WidgetDef::new(
        WidgetId::AccidentsCountPedestriansPerVehicleStreetVsAll,
        b::accidents_count_pedestrians_per_vehicle_street_vs_all,
    )
    .not_cached(),
];
