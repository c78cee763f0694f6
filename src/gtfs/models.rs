use crate::shared::Time;

/// One row of `stops.txt`, after header-driven column mapping and coercion.
#[derive(Debug, Clone)]
pub struct RawStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

/// One row of `routes.txt`.
#[derive(Debug, Clone)]
pub struct RawRoute {
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_type: i32,
}

/// One row of `trips.txt`.
#[derive(Debug, Clone)]
pub struct RawTrip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    pub trip_headsign: Option<String>,
}

/// One row of `stop_times.txt`. `sequence` is unique within a trip and
/// strictly increasing; `arrival`/`departure` are seconds-from-midnight and
/// may exceed 86_400.
#[derive(Debug, Clone)]
pub struct RawStopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub sequence: u32,
    pub arrival: Time,
    pub departure: Time,
}

/// One row of `calendar.txt`. `active_days` is indexed Sunday(0)..Saturday(6).
#[derive(Debug, Clone)]
pub struct RawCalendar {
    pub service_id: String,
    pub active_days: [bool; 7],
    pub start_date: u32,
    pub end_date: u32,
}
