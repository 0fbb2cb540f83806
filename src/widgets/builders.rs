//! One generator per widget.

use futures::FutureExt;
use serde_json::json;

use super::{Widget, WidgetContext, WidgetFuture, WidgetId, WidgetText};
use crate::constants::{DEFAULT_MOST_SEVERE_LIMIT, DEFAULT_TOP_SEGMENTS_LIMIT, labels};
use crate::error::InfographicsError;
use crate::statistics::{self, provisional};
use crate::store::{Field, Filters, Table};

async fn count_widget(
    ctx: &WidgetContext,
    id: WidgetId,
    table: Table,
    filters: &Filters,
    group_by: Field,
    title: &str,
) -> Result<Widget, InfographicsError> {
    let groups =
        statistics::count_by(ctx.store(), table, filters, group_by, ctx.params.window()).await?;
    Ok(Widget::new(id, statistics::category_counts(group_by, groups))?
        .with_text(WidgetText::title(title)))
}

pub fn accident_count_by_severity(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let counts = statistics::accident_count_by_severity(
            ctx.store(),
            &ctx.params.location_info,
            ctx.params.start_time,
            ctx.params.end_time,
        )
        .await?;
        Widget::new(WidgetId::AccidentCountBySeverity, counts)
    }
    .boxed()
}

pub fn most_severe_accidents_table(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let rows = statistics::most_severe_accidents_table(
            ctx.store(),
            &ctx.params.location_info,
            ctx.params.window(),
            DEFAULT_MOST_SEVERE_LIMIT,
        )
        .await?;
        let title = statistics::most_severe_accidents_table_title(&ctx.params.location_text);
        Widget::new(WidgetId::MostSevereAccidentsTable, rows)
            .map(|w| w.with_text(WidgetText::title(title)))
    }
    .boxed()
}

pub fn most_severe_accidents(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let records = statistics::most_severe_accidents(
            ctx.store(),
            &ctx.params.location_info,
            ctx.params.window(),
            DEFAULT_MOST_SEVERE_LIMIT,
        )
        .await?;
        Widget::new(WidgetId::MostSevereAccidents, records)
    }
    .boxed()
}

pub fn street_view(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        Widget::new(
            WidgetId::StreetView,
            json!({"longitude": ctx.params.gps.lon, "latitude": ctx.params.gps.lat}),
        )
    }
    .boxed()
}

pub fn head_on_collisions_comparison(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let road_segment = ctx
            .params
            .road_segment
            .as_ref()
            .map(|(road1, name)| (*road1, name.as_str()));
        let comparison =
            statistics::head_on_collisions_comparison(ctx.store(), road_segment, ctx.params.window())
                .await?;
        Widget::new(WidgetId::HeadOnCollisionsComparison, comparison)
    }
    .boxed()
}

pub fn accident_count_by_accident_type(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let counts = statistics::accident_count_by_accident_type(
            ctx.store(),
            &ctx.params.location_info,
            ctx.params.window(),
            labels::COLLISION,
        )
        .await?;
        Widget::new(WidgetId::AccidentCountByAccidentType, counts)
    }
    .boxed()
}

pub fn accidents_heat_map(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let points = statistics::accidents_heat_map(
            ctx.store(),
            &ctx.params.location_info,
            ctx.params.window(),
        )
        .await?;
        Widget::new(WidgetId::AccidentsHeatMap, points)
    }
    .boxed()
}

pub fn accident_count_by_accident_year(ctx: &WidgetContext) -> WidgetFuture<'_> {
    count_widget(
        ctx,
        WidgetId::AccidentCountByAccidentYear,
        Table::Accidents,
        &ctx.params.location_info,
        Field::AccidentYear,
        labels::ACCIDENT_COUNT_BY_YEAR_TITLE,
    )
    .boxed()
}

pub fn injured_count_by_accident_year(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let filters = statistics::injured_filters(&ctx.params.location_info);
        count_widget(
            ctx,
            WidgetId::InjuredCountByAccidentYear,
            Table::Involved,
            &filters,
            Field::AccidentYear,
            labels::INJURED_COUNT_BY_YEAR_TITLE,
        )
        .await
    }
    .boxed()
}

pub fn accident_count_by_day_night(ctx: &WidgetContext) -> WidgetFuture<'_> {
    count_widget(
        ctx,
        WidgetId::AccidentCountByDayNight,
        Table::Accidents,
        &ctx.params.location_info,
        Field::DayNightHebrew,
        labels::ACCIDENT_COUNT_BY_DAY_NIGHT_TITLE,
    )
    .boxed()
}

pub fn accidents_count_by_hour(ctx: &WidgetContext) -> WidgetFuture<'_> {
    count_widget(
        ctx,
        WidgetId::AccidentsCountByHour,
        Table::Accidents,
        &ctx.params.location_info,
        Field::AccidentHour,
        labels::ACCIDENT_COUNT_BY_HOUR_TITLE,
    )
    .boxed()
}

pub fn accident_count_by_road_light(ctx: &WidgetContext) -> WidgetFuture<'_> {
    count_widget(
        ctx,
        WidgetId::AccidentCountByRoadLight,
        Table::Accidents,
        &ctx.params.location_info,
        Field::RoadLightHebrew,
        labels::ACCIDENT_COUNT_BY_ROAD_LIGHT_TITLE,
    )
    .boxed()
}

pub fn top_road_segments_accidents_per_km(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let segments = statistics::top_road_segments_accidents_per_km(
            ctx.store(),
            ctx.params.resolution,
            ctx.params.road1(),
            ctx.params.window(),
            DEFAULT_TOP_SEGMENTS_LIMIT,
        )
        .await?;
        Widget::new(WidgetId::TopRoadSegmentsAccidentsPerKm, segments)
    }
    .boxed()
}

pub fn injured_count_per_age_group(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let buckets = statistics::injured_count_per_age_group(
            ctx.store(),
            &ctx.params.location_info,
            ctx.params.window(),
        )
        .await?;
        Widget::new(WidgetId::InjuredCountPerAgeGroup, buckets)
    }
    .boxed()
}

pub fn vision_zero(_ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move { Widget::new(WidgetId::VisionZero, [labels::VISION_ZERO_2_PLUS_1]) }.boxed()
}

pub fn accident_count_by_driver_type(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let involved = ctx.involved_by_vehicle_type().await?;
        Widget::new(
            WidgetId::AccidentCountByDriverType,
            statistics::count_accidents_by_driver_type(involved),
        )
    }
    .boxed()
}

pub fn accident_count_by_car_type(ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        let involved = ctx.involved_by_vehicle_type().await?;
        let national = ctx
            .national_baseline
            .get_or_compute(ctx.store(), ctx.params.window())
            .await?;
        Widget::new(
            WidgetId::AccidentCountByCarType,
            statistics::stats_accidents_by_car_type_with_national_data(involved, &national),
        )
    }
    .boxed()
}

fn provisional_widget(
    id: WidgetId,
    items: impl serde::Serialize,
    text: WidgetText,
) -> Result<Widget, InfographicsError> {
    Ok(Widget::new(id, items)?
        .with_text(text)
        .with_meta("provisional", true))
}

pub fn injured_accidents_with_pedestrians(_ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        provisional_widget(
            WidgetId::InjuredAccidentsWithPedestrians,
            provisional::injured_accidents_with_pedestrians(),
            WidgetText::title(provisional::INJURED_ACCIDENTS_WITH_PEDESTRIANS_TITLE),
        )
    }
    .boxed()
}

pub fn accident_severity_by_cross_location(_ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        provisional_widget(
            WidgetId::AccidentSeverityByCrossLocation,
            provisional::accident_severity_by_cross_location(),
            WidgetText::comment(provisional::ACCIDENT_SEVERITY_BY_CROSS_LOCATION_COMMENT),
        )
    }
    .boxed()
}

pub fn motorcycle_accidents_vs_all_accidents(_ctx: &WidgetContext) -> WidgetFuture<'_> {
    async move {
        provisional_widget(
            WidgetId::MotorcycleAccidentsVsAllAccidents,
            provisional::motorcycle_accidents_vs_all_accidents(),
            WidgetText::title(provisional::MOTORCYCLE_ACCIDENTS_VS_ALL_TITLE),
        )
    }
    .boxed()
}

pub fn accidents_count_pedestrians_per_vehicle_street_vs_all(
    _ctx: &WidgetContext,
) -> WidgetFuture<'_> {
    async move {
        provisional_widget(
            WidgetId::AccidentsCountPedestriansPerVehicleStreetVsAll,
            provisional::accidents_count_pedestrians_per_vehicle_street_vs_all(),
            WidgetText::title(provisional::PEDESTRIANS_PER_VEHICLE_TITLE),
        )
    }
    .boxed()
}
