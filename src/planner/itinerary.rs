use std::sync::Arc;

use serde::Serialize;

use crate::shared::Coordinate;

#[derive(Debug, Clone, Serialize)]
pub struct WalkSegment {
    pub from_name: Arc<str>,
    pub to_name: Arc<str>,
    pub from: Coordinate,
    pub to: Coordinate,
    pub distance_km: f64,
    pub duration_min: u32,
}

/// One stop along a ridden bus leg, carrying enough to render a named
/// waypoint on a map rather than a bare coordinate.
#[derive(Debug, Clone, Serialize)]
pub struct PolylinePoint {
    pub stop_id: Arc<str>,
    pub name: Arc<str>,
    pub coord: Coordinate,
}

#[derive(Debug, Clone, Serialize)]
pub struct BusSegment {
    pub route_id: Arc<str>,
    pub route_short_name: Arc<str>,
    pub trip_id: Arc<str>,
    pub board_stop: Arc<str>,
    pub board_stop_name: Arc<str>,
    pub alight_stop: Arc<str>,
    pub alight_stop_name: Arc<str>,
    pub intermediate_stops: Vec<Arc<str>>,
    pub distance_km: f64,
    pub duration_min: u32,
    pub start_depart_sec: u32,
    pub end_arrive_sec: u32,
    pub polyline: Vec<PolylinePoint>,
    pub fare_minor_units: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferWaitSegment {
    pub stop: Arc<str>,
    pub stop_name: Arc<str>,
    pub wait_min: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Segment {
    Walk(WalkSegment),
    Bus(BusSegment),
    TransferWait(TransferWaitSegment),
}

#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub segments: Vec<Segment>,
    pub total_duration_min: u32,
    pub total_distance_km: f64,
    pub total_fare_minor_units: i64,
}

impl Itinerary {
    pub fn bus_segments(&self) -> impl Iterator<Item = &BusSegment> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Bus(b) => Some(b),
            _ => None,
        })
    }

    /// Key identifying "the same trip plan" for de-duplication, per the
    /// planner's direct/transfer key schemes.
    pub fn dedup_key(&self) -> String {
        let buses: Vec<&BusSegment> = self.bus_segments().collect();
        match buses.as_slice() {
            [only] => format!(
                "direct:{}:{}:{}",
                only.route_short_name, only.board_stop_name, only.alight_stop_name
            ),
            [first, second] => format!(
                "transfer:{}:{}:{}",
                first.route_id, first.alight_stop, second.route_id
            ),
            _ => format!("itinerary:{}-segments", self.segments.len()),
        }
    }
}
