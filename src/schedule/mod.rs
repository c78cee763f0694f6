pub mod entities;

pub use entities::{Route, ServiceCalendar, Stop, StopTime, Trip};

use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Arc,
};
use tracing::{error, info};

use crate::{
    gtfs::{self, Gtfs},
    shared::Coordinate,
};

/// In-memory, read-only index over a loaded GTFS feed.
///
/// Built once at startup (see [`ScheduleIndex::load`]) and shared read-only
/// across every planning request thereafter — there are no locks on the hot
/// path because nothing ever mutates this structure again.
#[derive(Debug, Default)]
pub struct ScheduleIndex {
    stops: HashMap<Arc<str>, Stop>,
    routes: HashMap<Arc<str>, Route>,
    trips: HashMap<Arc<str>, Trip>,
    calendars: HashMap<Arc<str>, ServiceCalendar>,

    stop_times_by_stop: HashMap<Arc<str>, Vec<StopTime>>,
    stop_times_by_trip: HashMap<Arc<str>, Vec<StopTime>>,
    routes_by_stop: HashMap<Arc<str>, HashSet<Arc<str>>>,
    stops_by_route: HashMap<Arc<str>, Vec<Arc<str>>>,

    /// `false` when a mandatory feed file was missing at load time; every
    /// planning query short-circuits to an empty result in that state.
    enabled: bool,
}

impl ScheduleIndex {
    /// A planner that answers every query with `[]`, used when no feed
    /// directory is configured at all.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Loads a feed directory and builds all derived indices in one
    /// deterministic pass. Never fails: a missing/unreadable feed produces a
    /// disabled index (all planning queries then return `[]`), matching the
    /// "never hard-fail on infrastructure trouble" posture of the rest of
    /// this system.
    pub fn load<P: AsRef<Path>>(dir: P) -> Self {
        let gtfs = Gtfs::new(dir);
        match Self::try_build(&gtfs) {
            Ok(index) => index,
            Err(err) => {
                error!("GTFS feed unavailable, planner disabled: {err}");
                Self::default()
            }
        }
    }

    fn try_build(gtfs: &Gtfs) -> Result<Self, gtfs::Error> {
        let raw_stops = gtfs.load_stops()?;
        let raw_routes = gtfs.load_routes()?;
        let raw_trips = gtfs.load_trips()?;
        let raw_stop_times = gtfs.load_stop_times()?;
        let raw_calendar = gtfs.load_calendar()?;

        let mut index = ScheduleIndex {
            enabled: true,
            ..Default::default()
        };

        for s in raw_stops {
            let id: Arc<str> = s.stop_id.into();
            index.stops.insert(
                id.clone(),
                Stop {
                    id,
                    name: s.stop_name.into(),
                    coord: Coordinate {
                        lat: s.stop_lat,
                        lng: s.stop_lon,
                    },
                },
            );
        }

        for r in raw_routes {
            let id: Arc<str> = r.route_id.into();
            index.routes.insert(
                id.clone(),
                Route {
                    id,
                    short_name: r.route_short_name.into(),
                    long_name: r.route_long_name.into(),
                    route_type: r.route_type,
                },
            );
        }

        // First-seen trip per route becomes the route's representative for
        // `stops_by_route`; preserved by iterating `raw_trips` in file order.
        let mut representative_trip: HashMap<Arc<str>, Arc<str>> = HashMap::new();
        for t in raw_trips {
            let id: Arc<str> = t.trip_id.into();
            let route_id: Arc<str> = t.route_id.into();
            representative_trip
                .entry(route_id.clone())
                .or_insert_with(|| id.clone());
            index.trips.insert(
                id.clone(),
                Trip {
                    id,
                    route_id,
                    service_id: t.service_id.into(),
                    headsign: t.trip_headsign.map(Into::into),
                },
            );
        }

        for c in raw_calendar {
            let id: Arc<str> = c.service_id.into();
            index.calendars.insert(
                id.clone(),
                ServiceCalendar {
                    service_id: id,
                    active_days: c.active_days,
                    start_date: c.start_date,
                    end_date: c.end_date,
                },
            );
        }

        for st in raw_stop_times {
            let trip_id: Arc<str> = st.trip_id.into();
            let stop_id: Arc<str> = st.stop_id.into();
            let Some(trip) = index.trips.get(&trip_id) else {
                continue;
            };
            let route_id = trip.route_id.clone();
            let stop_time = StopTime {
                trip_id: trip_id.clone(),
                stop_id: stop_id.clone(),
                sequence: st.sequence,
                arrival: st.arrival,
                departure: st.departure,
            };
            index
                .stop_times_by_stop
                .entry(stop_id.clone())
                .or_default()
                .push(stop_time.clone());
            index
                .stop_times_by_trip
                .entry(trip_id)
                .or_default()
                .push(stop_time);
            index
                .routes_by_stop
                .entry(stop_id)
                .or_default()
                .insert(route_id);
        }

        for stop_times in index.stop_times_by_trip.values_mut() {
            stop_times.sort_by_key(|st| st.sequence);
        }

        for (route_id, trip_id) in &representative_trip {
            if let Some(stop_times) = index.stop_times_by_trip.get(trip_id) {
                index.stops_by_route.insert(
                    route_id.clone(),
                    stop_times.iter().map(|st| st.stop_id.clone()).collect(),
                );
            }
        }

        info!(
            stops = index.stops.len(),
            routes = index.routes.len(),
            trips = index.trips.len(),
            stop_times = index.stop_times_by_trip.values().map(Vec::len).sum::<usize>(),
            "GTFS feed loaded"
        );

        Ok(index)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn trip_by_id(&self, id: &str) -> Option<&Trip> {
        self.trips.get(id)
    }

    pub fn stop_times_by_stop(&self, stop_id: &str) -> &[StopTime] {
        self.stop_times_by_stop.get(stop_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stop_times_by_trip(&self, trip_id: &str) -> &[StopTime] {
        self.stop_times_by_trip.get(trip_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn routes_by_stop(&self, stop_id: &str) -> impl Iterator<Item = &Arc<str>> {
        self.routes_by_stop.get(stop_id).into_iter().flatten()
    }

    pub fn stops_by_route(&self, route_id: &str) -> &[Arc<str>] {
        self.stops_by_route.get(route_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A `service_id` with no calendar entry is treated as always active —
    /// a permissive fallback for feeds that omit `calendar.txt` rows for
    /// some services.
    pub fn service_active(&self, service_id: &str, date: u32, weekday_from_sunday: usize) -> bool {
        match self.calendars.get(service_id) {
            Some(cal) => cal.active_on(date, weekday_from_sunday),
            None => true,
        }
    }

    /// All stops within `radius_km` of `coord`, ascending by distance,
    /// capped to `limit` entries.
    pub fn nearby_stops(&self, coord: &Coordinate, radius_km: f64, limit: usize) -> Vec<(&Stop, f64)> {
        let mut candidates: Vec<(&Stop, f64)> = self
            .stops
            .values()
            .map(|stop| (stop, stop.coord.distance_km(coord)))
            .filter(|(_, dist)| *dist <= radius_km)
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
        candidates.truncate(limit);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_feed(dir: &Path) {
        let write = |name: &str, content: &str| {
            std::fs::write(dir.join(name), content).unwrap();
        };
        write(
            "stops.txt",
            "stop_id,stop_name,stop_lat,stop_lon\n\
             S1,First,28.7000,77.1000\n\
             S2,Second,28.7020,77.1020\n\
             S3,Third,28.7050,77.1050\n",
        );
        write(
            "routes.txt",
            "route_id,route_short_name,route_long_name,route_type\nR1,R1,Route One,3\n",
        );
        write(
            "trips.txt",
            "route_id,service_id,trip_id,trip_headsign\nR1,WD,T1,Downtown\n",
        );
        write(
            "stop_times.txt",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
             T1,10:00:00,10:00:00,S1,1\n\
             T1,10:05:00,10:05:00,S2,2\n\
             T1,10:10:00,10:10:00,S3,3\n",
        );
        write(
            "calendar.txt",
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             WD,1,1,1,1,1,0,0,20250101,20261231\n",
        );
        let _ = std::io::stdout().flush();
    }

    #[test]
    fn builds_indices_from_a_minimal_feed() {
        let dir = tempdir();
        write_feed(dir.path());
        let index = ScheduleIndex::load(dir.path());
        assert!(index.is_enabled());
        assert_eq!(index.stops_by_route("R1"), &["S1".into(), "S2".into(), "S3".into()] as &[Arc<str>]);
        assert_eq!(index.stop_times_by_trip("T1").len(), 3);
        assert!(index.routes_by_stop("S2").any(|r| &**r == "R1"));
    }

    #[test]
    fn disabled_when_feed_directory_is_missing() {
        let index = ScheduleIndex::load("/nonexistent/path/for/sure");
        assert!(!index.is_enabled());
        assert!(index.nearby_stops(&Coordinate::new(0.0, 0.0).unwrap(), 2.0, 20).is_empty());
    }

    #[test]
    fn calendar_permissive_fallback_when_service_absent() {
        let dir = tempdir();
        write_feed(dir.path());
        let index = ScheduleIndex::load(dir.path());
        assert!(index.service_active("UNKNOWN_SERVICE", 20250601, 0));
    }
}
