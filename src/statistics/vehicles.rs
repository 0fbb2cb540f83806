//! Involved-party breakdowns by vehicle type.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use super::counts::{count_by, injured_filters};
use super::utility::percentage;
use crate::constants::{labels, vehicle};
use crate::error::StoreError;
use crate::store::{AccidentStore, DateWindow, Field, Filters, GroupCount, Table};

/// Injured parties per `involve_vehicle_type` at the request location.
pub async fn involved_by_vehicle_type(
    store: &dyn AccidentStore,
    location: &Filters,
    window: DateWindow,
) -> Result<Vec<GroupCount>, StoreError> {
    count_by(
        store,
        Table::Involved,
        &injured_filters(location),
        Field::InvolveVehicleType,
        window,
    )
    .await
}

// ---------------------------------------------------------------------------
// Driver types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverType {
    Professional,
    Private,
    Other,
}

impl DriverType {
    pub const ALL: [DriverType; 3] = [DriverType::Professional, DriverType::Private, DriverType::Other];

    /// Vehicle types outside every driver set have no driver type.
    pub fn classify(vehicle_type: i64) -> Option<DriverType> {
        if vehicle::PROFESSIONAL_DRIVER_VEHICLE_TYPES.contains(&vehicle_type) {
            Some(DriverType::Professional)
        } else if vehicle::PRIVATE_DRIVER_VEHICLE_TYPES.contains(&vehicle_type) {
            Some(DriverType::Private)
        } else if vehicle::LIGHT_ELECTRIC_VEHICLE_TYPES.contains(&vehicle_type)
            || vehicle::OTHER_VEHICLES_TYPES.contains(&vehicle_type)
        {
            Some(DriverType::Other)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DriverType::Professional => labels::PROFESSIONAL_DRIVER,
            DriverType::Private => labels::PRIVATE_VEHICLE_DRIVER,
            DriverType::Other => labels::OTHER_DRIVER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverTypeCount {
    pub driver_type: &'static str,
    pub count: i64,
}

/// Sums involved counts per driver type. Unmatched vehicle types are dropped.
pub fn count_accidents_by_driver_type(groups: &[GroupCount]) -> Vec<DriverTypeCount> {
    let mut totals = [None::<i64>; DriverType::ALL.len()];
    for group in groups {
        let Some(driver) = group.key.as_i64().and_then(DriverType::classify) else {
            continue;
        };
        let slot = &mut totals[driver as usize];
        *slot = Some(slot.unwrap_or(0) + group.count);
    }
    DriverType::ALL
        .into_iter()
        .zip(totals)
        .filter_map(|(driver, total)| {
            total.map(|count| DriverTypeCount {
                driver_type: driver.label(),
                count,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Car types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarType {
    Car,
    Large,
    Motorcycle,
    BicycleAndSmallMotor,
    Other,
}

impl CarType {
    pub const ALL: [CarType; 5] = [
        CarType::Car,
        CarType::Large,
        CarType::Motorcycle,
        CarType::BicycleAndSmallMotor,
        CarType::Other,
    ];

    /// Unlike driver types, every vehicle type has a car type.
    pub fn classify(vehicle_type: Option<i64>) -> CarType {
        let Some(code) = vehicle_type else {
            return CarType::Other;
        };
        if vehicle::CAR_VEHICLE_TYPES.contains(&code) {
            CarType::Car
        } else if vehicle::LARGE_VEHICLE_TYPES.contains(&code) {
            CarType::Large
        } else if vehicle::MOTORCYCLE_VEHICLE_TYPES.contains(&code) {
            CarType::Motorcycle
        } else if vehicle::BICYCLE_AND_SMALL_MOTOR_VEHICLE_TYPES.contains(&code) {
            CarType::BicycleAndSmallMotor
        } else {
            CarType::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CarType::Car => labels::CAR_TYPE_CAR,
            CarType::Large => labels::CAR_TYPE_LARGE,
            CarType::Motorcycle => labels::CAR_TYPE_MOTORCYCLE,
            CarType::BicycleAndSmallMotor => labels::CAR_TYPE_BICYCLE,
            CarType::Other => labels::CAR_TYPE_OTHER,
        }
    }
}

/// Percentage of involved parties per car type. Only car types that some
/// input group maps to are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarTypeShares(Vec<(CarType, f64)>);

impl CarTypeShares {
    pub fn from_groups(groups: &[GroupCount]) -> Self {
        let mut totals = [None::<i64>; CarType::ALL.len()];
        let mut total = 0;
        for group in groups {
            total += group.count;
            let slot = &mut totals[CarType::classify(group.key.as_i64()) as usize];
            *slot = Some(slot.unwrap_or(0) + group.count);
        }
        CarTypeShares(
            CarType::ALL
                .into_iter()
                .zip(totals)
                .filter_map(|(car_type, count)| {
                    count.map(|c| (car_type, percentage(c as f64, total as f64)))
                })
                .collect(),
        )
    }

    pub fn get(&self, car_type: CarType) -> Option<f64> {
        self.0.iter().find(|(c, _)| *c == car_type).map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CarType, f64)> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarTypeComparison {
    pub car_type: &'static str,
    pub percentage_segment: f64,
    pub percentage_country: f64,
}

/// Pairs local shares with national ones, over the national car types.
pub fn stats_accidents_by_car_type_with_national_data(
    local: &[GroupCount],
    national: &CarTypeShares,
) -> Vec<CarTypeComparison> {
    let local = CarTypeShares::from_groups(local);
    national
        .iter()
        .map(|(car_type, country)| CarTypeComparison {
            car_type: car_type.label(),
            percentage_segment: local.get(car_type).unwrap_or(0.0),
            percentage_country: country,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// National baseline
// ---------------------------------------------------------------------------

const NATIONAL_BASELINE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(n) => n,
    None => panic!("capacity must be non-zero"),
};

type BaselineCell = Arc<OnceCell<Arc<CarTypeShares>>>;

/// Location-independent car type shares per time window.
///
/// Concurrent lookups of one window share a single computation; the window
/// lock is only held while the per-window cell is fetched or inserted.
pub struct NationalBaselineCache {
    entries: Mutex<LruCache<DateWindow, BaselineCell>>,
}

impl Default for NationalBaselineCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NationalBaselineCache {
    pub fn new() -> Self {
        Self::with_capacity(NATIONAL_BASELINE_CAPACITY)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn get_or_compute(
        &self,
        store: &dyn AccidentStore,
        window: DateWindow,
    ) -> Result<Arc<CarTypeShares>, StoreError> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.get_or_insert(window, Default::default).clone()
        };
        cell.get_or_try_init(|| async {
            debug!(start = ?window.start, end = ?window.end, "Computing national car type baseline");
            let groups = count_by(
                store,
                Table::Involved,
                &Filters::new(),
                Field::InvolveVehicleType,
                window,
            )
            .await?;
            Ok::<_, StoreError>(Arc::new(CarTypeShares::from_groups(&groups)))
        })
        .await
        .cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
