use std::sync::Arc;

use crate::shared::{Coordinate, Time};

/// A physical point where passengers can board or alight from a bus.
/// Immutable after load.
#[derive(Debug, Clone)]
pub struct Stop {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub coord: Coordinate,
}

/// A labeled line served by many trips (e.g. "R1"). Immutable after load.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: Arc<str>,
    pub short_name: Arc<str>,
    pub long_name: Arc<str>,
    pub route_type: i32,
}

/// One scheduled run of a vehicle along a route, belonging to exactly one
/// route and one service calendar. Immutable after load.
#[derive(Debug, Clone)]
pub struct Trip {
    pub id: Arc<str>,
    pub route_id: Arc<str>,
    pub service_id: Arc<str>,
    pub headsign: Option<Arc<str>>,
}

/// A single stop call within a trip. `sequence` is unique and strictly
/// increasing within a trip; `departure` is monotonic non-decreasing.
#[derive(Debug, Clone)]
pub struct StopTime {
    pub trip_id: Arc<str>,
    pub stop_id: Arc<str>,
    pub sequence: u32,
    pub arrival: Time,
    pub departure: Time,
}

/// The weekday pattern and date range during which a `service_id` operates.
#[derive(Debug, Clone)]
pub struct ServiceCalendar {
    pub service_id: Arc<str>,
    /// Indexed Sunday(0)..Saturday(6), matching `chrono::Weekday::num_days_from_sunday`.
    pub active_days: [bool; 7],
    pub start_date: u32,
    pub end_date: u32,
}

impl ServiceCalendar {
    /// `date` and `weekday_from_sunday` describe "today" in `YYYYMMDD` /
    /// `0..=6` form, avoiding a `chrono` dependency leaking into this module.
    pub fn active_on(&self, date: u32, weekday_from_sunday: usize) -> bool {
        self.start_date <= date
            && date <= self.end_date
            && self.active_days.get(weekday_from_sunday).copied().unwrap_or(false)
    }
}
