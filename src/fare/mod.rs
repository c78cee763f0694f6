mod rng;

pub use rng::{SurgeSource, ThreadRngSurge};

use crate::shared::Coordinate;

/// Ride-hailing vehicle classes a producer or fallback estimator may quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    Bike,
    Auto,
    Mini,
    Sedan,
    Suv,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 5] = [
        VehicleClass::Bike,
        VehicleClass::Auto,
        VehicleClass::Mini,
        VehicleClass::Sedan,
        VehicleClass::Suv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Bike => "bike",
            VehicleClass::Auto => "auto",
            VehicleClass::Mini => "mini",
            VehicleClass::Sedan => "sedan",
            VehicleClass::Suv => "suv",
        }
    }

    fn tariff(&self) -> Tariff {
        match self {
            VehicleClass::Bike => Tariff { base_fare: 15.0, per_km_fare: 5.0, min_fare: 20 },
            VehicleClass::Auto => Tariff { base_fare: 25.0, per_km_fare: 9.0, min_fare: 35 },
            VehicleClass::Mini => Tariff { base_fare: 40.0, per_km_fare: 11.0, min_fare: 60 },
            VehicleClass::Sedan => Tariff { base_fare: 55.0, per_km_fare: 14.0, min_fare: 80 },
            VehicleClass::Suv => Tariff { base_fare: 80.0, per_km_fare: 18.0, min_fare: 120 },
        }
    }
}

struct Tariff {
    base_fare: f64,
    per_km_fare: f64,
    min_fare: i64,
}

/// Computes a ride-hailing fare in minor currency units (e.g. paise/cents)
/// for one vehicle class over one distance, applying a surge multiplier
/// drawn from `surge`.
///
/// `price = max(minFare, round(baseFare + perKmFare * distanceKm) * surge)`.
pub fn estimate_fare(class: VehicleClass, distance_km: f64, surge: &dyn SurgeSource) -> i64 {
    let tariff = class.tariff();
    let unsurged = (tariff.base_fare + tariff.per_km_fare * distance_km).round();
    let surged = (unsurged * surge.next_surge()).round() as i64;
    surged.max(tariff.min_fare)
}

/// Bus fare slab keyed by the great-circle distance of the leg, in the
/// same currency's minor units as ride-hailing fares (kept whole-unit,
/// unlike the surged ride-hailing formula, since bus fares are published
/// flat rates).
pub fn bus_fare_slab(distance_km: f64) -> i64 {
    if distance_km <= 4.0 {
        5
    } else if distance_km <= 10.0 {
        10
    } else if distance_km <= 15.0 {
        15
    } else if distance_km <= 20.0 {
        20
    } else {
        25
    }
}

/// Rule-based synthetic fares used whenever a live producer cannot be
/// queried. Deterministic apart from the surge draw, which callers can pin
/// via a fixed `SurgeSource` in tests.
pub struct FallbackEstimator<'a> {
    surge: &'a dyn SurgeSource,
}

impl<'a> FallbackEstimator<'a> {
    pub fn new(surge: &'a dyn SurgeSource) -> Self {
        Self { surge }
    }

    /// One synthetic quote per class in `menu`, estimated over the
    /// great-circle distance between `pickup` and `drop`.
    pub fn estimate(&self, pickup: &Coordinate, drop: &Coordinate, menu: &[VehicleClass]) -> Vec<(VehicleClass, i64)> {
        let distance_km = pickup.distance_km(drop);
        menu.iter()
            .map(|&class| (class, estimate_fare(class, distance_km, self.surge)))
            .collect()
    }
}
