//! Wire DTOs for the two public endpoints. Field names here are
//! bit-exact contracts consumed by an existing client, deliberately
//! decoupled from the internal domain types' naming.

use serde::{Deserialize, Serialize};
use waypoint::{
    planner::{Itinerary, PolylinePoint, Segment},
    quotes::{FareQuote, Provenance},
    shared::Coordinate,
};

#[derive(Debug, Deserialize)]
pub struct TripRequest {
    pub pickup: RawCoordinate,
    pub drop: RawCoordinate,
}

#[derive(Debug, Deserialize)]
pub struct RawCoordinate {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl RawCoordinate {
    pub fn into_coordinate(self) -> Option<Coordinate> {
        let lat = self.lat.filter(|v| v.is_finite())?;
        let lng = self.lng.filter(|v| v.is_finite())?;
        Coordinate::new(lat, lng).ok()
    }
}

#[derive(Debug, Serialize)]
pub struct FareQuoteWire {
    pub platform: String,
    #[serde(rename = "vehicleType")]
    pub vehicle_type: String,
    pub price: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
    pub source: &'static str,
    pub confidence: String,
}

impl From<FareQuote> for FareQuoteWire {
    fn from(quote: FareQuote) -> Self {
        let source = match quote.provenance {
            Provenance::Live => "live",
            Provenance::Estimate => "estimate",
            Provenance::Cached => "cached",
        };
        let confidence = match quote.confidence {
            waypoint::quotes::Confidence::High => "high",
            waypoint::quotes::Confidence::Medium => "medium",
            waypoint::quotes::Confidence::Low => "low",
        };
        Self {
            platform: quote.platform,
            vehicle_type: quote.vehicle_class.as_str().to_string(),
            price: quote.price_minor_units,
            currency: quote.currency,
            eta: quote.eta_label,
            source,
            confidence: confidence.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FaresResponse {
    pub success: bool,
    pub count: usize,
    pub estimates: Vec<FareQuoteWire>,
}

#[derive(Debug, Serialize)]
pub struct PathPoint {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub sequence: u32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum SegmentWire {
    #[serde(rename = "walk")]
    Walk { from: String, to: String, distance_km: f64, duration_min: u32 },
    #[serde(rename = "bus")]
    Bus {
        route: String,
        trip_id: String,
        board_stop: String,
        alight_stop: String,
        intermediate_stops: Vec<String>,
        distance_km: f64,
        duration_min: u32,
        start_depart_sec: u32,
        end_arrive_sec: u32,
        polyline: Vec<PathPoint>,
    },
    #[serde(rename = "transfer_wait")]
    TransferWait { stop: String, wait_min: u32, distance_km: f64 },
}

#[derive(Debug, Serialize)]
pub struct BusRouteWire {
    pub route_name: String,
    pub start_stop: String,
    pub end_stop: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub stops_count: usize,
    pub fare: i64,
    pub path: Vec<PathPoint>,
    pub segments: Vec<SegmentWire>,
    pub total_distance: String,
}

impl From<Itinerary> for BusRouteWire {
    fn from(itinerary: Itinerary) -> Self {
        let buses: Vec<_> = itinerary.bus_segments().cloned().collect();
        let first_bus = buses.first();
        let last_bus = buses.last();

        let mut path = Vec::new();
        let mut sequence = 0u32;
        let mut stops_count = 0usize;
        for bus in &buses {
            for point in &bus.polyline {
                path.push(path_point(point, sequence));
                sequence += 1;
            }
            stops_count += 2 + bus.intermediate_stops.len();
        }

        let segments = itinerary
            .segments
            .iter()
            .map(|s| match s {
                Segment::Walk(w) => SegmentWire::Walk {
                    from: w.from_name.to_string(),
                    to: w.to_name.to_string(),
                    distance_km: w.distance_km,
                    duration_min: w.duration_min,
                },
                Segment::Bus(b) => SegmentWire::Bus {
                    route: b.route_short_name.to_string(),
                    trip_id: b.trip_id.to_string(),
                    board_stop: b.board_stop_name.to_string(),
                    alight_stop: b.alight_stop_name.to_string(),
                    intermediate_stops: b.intermediate_stops.iter().map(ToString::to_string).collect(),
                    distance_km: b.distance_km,
                    duration_min: b.duration_min,
                    start_depart_sec: b.start_depart_sec,
                    end_arrive_sec: b.end_arrive_sec,
                    polyline: b
                        .polyline
                        .iter()
                        .enumerate()
                        .map(|(i, point)| path_point(point, i as u32))
                        .collect(),
                },
                Segment::TransferWait(t) => SegmentWire::TransferWait {
                    stop: t.stop_name.to_string(),
                    wait_min: t.wait_min,
                    distance_km: 0.0,
                },
            })
            .collect();

        Self {
            route_name: first_bus.map(|b| b.route_short_name.to_string()).unwrap_or_default(),
            start_stop: first_bus.map(|b| b.board_stop_name.to_string()).unwrap_or_default(),
            end_stop: last_bus.map(|b| b.alight_stop_name.to_string()).unwrap_or_default(),
            departure_time: first_bus.map(format_hms).unwrap_or_default(),
            arrival_time: last_bus.map(format_hms_arrival).unwrap_or_default(),
            duration: format!("{} mins", itinerary.total_duration_min),
            stops_count,
            fare: itinerary.total_fare_minor_units,
            path,
            segments,
            total_distance: format!("{:.1} km", itinerary.total_distance_km),
        }
    }
}

fn path_point(point: &PolylinePoint, sequence: u32) -> PathPoint {
    PathPoint {
        lat: point.coord.lat,
        lng: point.coord.lng,
        name: point.name.to_string(),
        sequence,
    }
}

fn format_hms(bus: &waypoint::planner::BusSegment) -> String {
    seconds_to_hms(bus.start_depart_sec)
}

fn format_hms_arrival(bus: &waypoint::planner::BusSegment) -> String {
    seconds_to_hms(bus.end_arrive_sec)
}

fn seconds_to_hms(total: u32) -> String {
    let h = (total / 3600) % 24;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub success: bool,
    pub count: usize,
    pub routes: Vec<BusRouteWire>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub feed_loaded: bool,
}
