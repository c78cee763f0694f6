pub mod itinerary;

pub use itinerary::{BusSegment, Itinerary, PolylinePoint, Segment, TransferWaitSegment, WalkSegment};

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::Datelike;

use crate::{
    fare::bus_fare_slab,
    schedule::{ScheduleIndex, Stop, StopTime},
    shared::{Coordinate, Time},
};

const NEARBY_RADIUS_KM: f64 = 2.0;
const NEARBY_LIMIT: usize = 20;
const TRANSFER_CANDIDATE_LIMIT: usize = 5;
const MAX_TRANSFER_WAIT_MIN: u32 = 45;
const MAX_RESULTS: usize = 5;
const MAX_DURATION_MIN: u32 = 240;
const WALK_SPEED_M_PER_MIN: f64 = 80.0;

/// Computes direct and one-transfer bus itineraries between two points
/// against an immutable, already-loaded [`ScheduleIndex`].
pub struct ItineraryPlanner<'a> {
    index: &'a ScheduleIndex,
}

impl<'a> ItineraryPlanner<'a> {
    pub fn new(index: &'a ScheduleIndex) -> Self {
        Self { index }
    }

    /// `[]` if the feed is disabled, either endpoint has no nearby stop, or
    /// no itinerary satisfies the duration cutoff.
    pub fn find_itineraries(&self, pickup: Coordinate, drop: Coordinate) -> Vec<Itinerary> {
        let (now, weekday) = Time::now_local();
        let date = today_as_yyyymmdd();
        let weekday_idx = weekday.num_days_from_sunday() as usize;
        self.find_itineraries_at(pickup, drop, now, date, weekday_idx)
    }

    /// Same as [`Self::find_itineraries`] but with the "now" reference point
    /// supplied explicitly, so callers (tests, replay tooling) can pin it
    /// instead of depending on the host wall clock.
    pub fn find_itineraries_at(&self, pickup: Coordinate, drop: Coordinate, now: Time, date: u32, weekday_idx: usize) -> Vec<Itinerary> {
        if !self.index.is_enabled() {
            return Vec::new();
        }

        let pickup_candidates = self.index.nearby_stops(&pickup, NEARBY_RADIUS_KM, NEARBY_LIMIT);
        let drop_candidates = self.index.nearby_stops(&drop, NEARBY_RADIUS_KM, NEARBY_LIMIT);
        if pickup_candidates.is_empty() || drop_candidates.is_empty() {
            return Vec::new();
        }

        let ctx = SearchContext {
            date,
            weekday_idx,
            now,
        };

        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for itinerary in self.direct_search(pickup, drop, &pickup_candidates, &drop_candidates, &ctx) {
            if seen.insert(itinerary.dedup_key()) {
                results.push(itinerary);
            }
        }

        if results.len() < MAX_RESULTS {
            for itinerary in self.transfer_search(pickup, drop, &pickup_candidates, &drop_candidates, &ctx) {
                if seen.insert(itinerary.dedup_key()) {
                    results.push(itinerary);
                }
            }
        }

        results.retain(|it| it.total_duration_min < MAX_DURATION_MIN);
        results.sort_by_key(|it| it.total_duration_min);
        results.truncate(MAX_RESULTS);
        results
    }

    /// `routeId -> nearest (stop, distance)` among `candidates`, for every
    /// route serving at least one of them.
    fn routes_nearest(&self, candidates: &[(&Stop, f64)]) -> HashMap<Arc<str>, (&Stop, f64)> {
        let mut out: HashMap<Arc<str>, (&Stop, f64)> = HashMap::new();
        for &(stop, dist) in candidates {
            for route_id in self.index.routes_by_stop(&stop.id) {
                out.entry(route_id.clone())
                    .and_modify(|(best_stop, best_dist)| {
                        if dist < *best_dist {
                            *best_stop = stop;
                            *best_dist = dist;
                        }
                    })
                    .or_insert((stop, dist));
            }
        }
        out
    }

    fn direct_search(
        &self,
        pickup: Coordinate,
        drop: Coordinate,
        pickup_candidates: &[(&Stop, f64)],
        drop_candidates: &[(&Stop, f64)],
        ctx: &SearchContext,
    ) -> Vec<Itinerary> {
        let pickup_routes = self.routes_nearest(pickup_candidates);
        let drop_routes = self.routes_nearest(drop_candidates);

        let mut out = Vec::new();
        for (route_id, &(p_stop, p_dist)) in &pickup_routes {
            let Some(&(d_stop, d_dist)) = drop_routes.get(route_id) else {
                continue;
            };
            let stops_by_route = self.index.stops_by_route(route_id);
            let Some(p_idx) = stops_by_route.iter().position(|s| s == &p_stop.id) else {
                continue;
            };
            let Some(d_idx) = stops_by_route.iter().position(|s| s == &d_stop.id) else {
                continue;
            };
            if p_idx >= d_idx {
                continue;
            }
            let Some(selection) = self.select_trip(route_id, &p_stop.id, &d_stop.id, ctx.now.as_seconds(), ctx) else {
                continue;
            };

            let board_walk = walk_segment(pickup, p_stop, p_dist, true);
            let alight_walk = walk_segment(drop, d_stop, d_dist, false);
            let bus = self.build_bus_segment(route_id, &selection);
            out.push(assemble(vec![
                Segment::Walk(board_walk),
                Segment::Bus(bus),
                Segment::Walk(alight_walk),
            ]));
        }
        out
    }

    fn transfer_search(
        &self,
        pickup: Coordinate,
        drop: Coordinate,
        pickup_candidates: &[(&Stop, f64)],
        drop_candidates: &[(&Stop, f64)],
        ctx: &SearchContext,
    ) -> Vec<Itinerary> {
        let pickup_top: Vec<&(&Stop, f64)> = pickup_candidates.iter().take(TRANSFER_CANDIDATE_LIMIT).collect();
        let drop_top: Vec<&(&Stop, f64)> = drop_candidates.iter().take(TRANSFER_CANDIDATE_LIMIT).collect();

        let drop_routes: HashSet<Arc<str>> = drop_top
            .iter()
            .flat_map(|(stop, _)| self.index.routes_by_stop(&stop.id))
            .cloned()
            .collect();

        // stopId -> drop routes that call it, restricted to drop-side routes.
        let mut transfer_index: HashMap<Arc<str>, Vec<Arc<str>>> = HashMap::new();
        for drop_route in &drop_routes {
            for stop_id in self.index.stops_by_route(drop_route) {
                transfer_index.entry(stop_id.clone()).or_default().push(drop_route.clone());
            }
        }

        let mut out = Vec::new();
        for &(p_stop, p_dist) in &pickup_top {
            for pickup_route in self.index.routes_by_stop(&p_stop.id) {
                let stops_on_p = self.index.stops_by_route(pickup_route);
                let Some(p_idx) = stops_on_p.iter().position(|s| s == &p_stop.id) else {
                    continue;
                };

                for transfer_stop_id in stops_on_p.iter().skip(p_idx + 1) {
                    let Some(drop_routes_here) = transfer_index.get(transfer_stop_id) else {
                        continue;
                    };
                    for drop_route in drop_routes_here {
                        if drop_route == pickup_route {
                            // Same route on both legs isn't a transfer, just the direct ride split in two.
                            continue;
                        }
                        for &(d_stop, d_dist) in &drop_top {
                            let stops_on_d = self.index.stops_by_route(drop_route);
                            let Some(t_on_d) = stops_on_d.iter().position(|s| s == transfer_stop_id) else {
                                continue;
                            };
                            let Some(d_idx) = stops_on_d.iter().position(|s| s == &d_stop.id) else {
                                continue;
                            };
                            if t_on_d >= d_idx {
                                continue;
                            }

                            let Some(first_leg) = self.select_trip(
                                pickup_route,
                                &p_stop.id,
                                transfer_stop_id,
                                ctx.now.as_seconds(),
                                ctx,
                            ) else {
                                continue;
                            };
                            let a1 = first_leg.alight.arrival.as_seconds();
                            let Some(second_leg) =
                                self.select_trip(drop_route, transfer_stop_id, &d_stop.id, a1, ctx)
                            else {
                                continue;
                            };
                            let wait_sec = second_leg.board.departure.as_seconds().saturating_sub(a1);
                            let wait_min = wait_sec / 60;
                            if wait_min >= MAX_TRANSFER_WAIT_MIN {
                                continue;
                            }

                            let transfer_stop = match self.index.stop_by_id(transfer_stop_id) {
                                Some(s) => s,
                                None => continue,
                            };

                            let board_walk = walk_segment(pickup, p_stop, p_dist, true);
                            let alight_walk = walk_segment(drop, d_stop, d_dist, false);
                            let bus1 = self.build_bus_segment(pickup_route, &first_leg);
                            let bus2 = self.build_bus_segment(drop_route, &second_leg);
                            let transfer_wait = Segment::TransferWait(TransferWaitSegment {
                                stop: transfer_stop.id.clone(),
                                stop_name: transfer_stop.name.clone(),
                                wait_min,
                            });

                            out.push(assemble(vec![
                                Segment::Walk(board_walk),
                                Segment::Bus(bus1),
                                transfer_wait,
                                Segment::Bus(bus2),
                                Segment::Walk(alight_walk),
                            ]));
                        }
                    }
                }
            }
        }
        out
    }

    /// Earliest-feasible-boarding search on a single route between two
    /// stops: the first departure from `board_stop_id` at or after
    /// `earliest_sec` whose trip also calls `alight_stop_id` later in its
    /// sequence, on a service active today.
    fn select_trip(
        &self,
        route_id: &str,
        board_stop_id: &str,
        alight_stop_id: &str,
        earliest_sec: u32,
        ctx: &SearchContext,
    ) -> Option<TripSelection> {
        let mut candidates: Vec<&StopTime> = self
            .index
            .stop_times_by_stop(board_stop_id)
            .iter()
            .filter(|st| {
                self.index
                    .trip_by_id(&st.trip_id)
                    .is_some_and(|trip| trip.route_id.as_ref() == route_id)
            })
            .filter(|st| st.departure.as_seconds() >= earliest_sec)
            .filter(|st| {
                self.index
                    .trip_by_id(&st.trip_id)
                    .is_some_and(|trip| self.index.service_active(&trip.service_id, ctx.date, ctx.weekday_idx))
            })
            .collect();
        candidates.sort_by_key(|st| st.departure.as_seconds());

        for board in candidates {
            let full = self.index.stop_times_by_trip(&board.trip_id);
            let Some(alight) = full.iter().find(|st| st.stop_id.as_ref() == alight_stop_id && st.sequence > board.sequence)
            else {
                continue;
            };
            let intermediate: Vec<StopTime> = full
                .iter()
                .filter(|st| st.sequence > board.sequence && st.sequence < alight.sequence)
                .cloned()
                .collect();
            return Some(TripSelection {
                trip_id: board.trip_id.clone(),
                board: board.clone(),
                alight: alight.clone(),
                intermediate,
                full_path: full.to_vec(),
            });
        }
        None
    }

    fn build_bus_segment(&self, route_id: &str, selection: &TripSelection) -> BusSegment {
        let route = self.index.route_by_id(route_id);
        let path_stops: Vec<&Stop> = selection
            .full_path
            .iter()
            .filter(|st| st.sequence >= selection.board.sequence && st.sequence <= selection.alight.sequence)
            .filter_map(|st| self.index.stop_by_id(&st.stop_id))
            .collect();

        let distance_km: f64 = path_stops.windows(2).map(|w| w[0].coord.distance_km(&w[1].coord)).sum();
        let duration_min = ((selection.alight.arrival.as_seconds().saturating_sub(selection.board.departure.as_seconds())) as f64
            / 60.0)
            .ceil() as u32;

        let board_stop = self.index.stop_by_id(&selection.board.stop_id);
        let alight_stop = self.index.stop_by_id(&selection.alight.stop_id);

        BusSegment {
            route_id: route.map(|r| r.id.clone()).unwrap_or_else(|| route_id.into()),
            route_short_name: route.map(|r| r.short_name.clone()).unwrap_or_else(|| route_id.into()),
            trip_id: selection.trip_id.clone(),
            board_stop: selection.board.stop_id.clone(),
            board_stop_name: board_stop.map(|s| s.name.clone()).unwrap_or_else(|| selection.board.stop_id.clone()),
            alight_stop: selection.alight.stop_id.clone(),
            alight_stop_name: alight_stop.map(|s| s.name.clone()).unwrap_or_else(|| selection.alight.stop_id.clone()),
            intermediate_stops: selection.intermediate.iter().map(|st| st.stop_id.clone()).collect(),
            distance_km,
            duration_min,
            start_depart_sec: selection.board.departure.as_seconds(),
            end_arrive_sec: selection.alight.arrival.as_seconds(),
            polyline: path_stops
                .iter()
                .map(|s| PolylinePoint {
                    stop_id: s.id.clone(),
                    name: s.name.clone(),
                    coord: s.coord,
                })
                .collect(),
            fare_minor_units: bus_fare_slab(distance_km),
        }
    }
}

struct SearchContext {
    date: u32,
    weekday_idx: usize,
    now: Time,
}

#[derive(Clone)]
struct TripSelection {
    trip_id: Arc<str>,
    board: StopTime,
    alight: StopTime,
    intermediate: Vec<StopTime>,
    full_path: Vec<StopTime>,
}

/// A walk leg between a user-supplied point and a stop. `to_stop = true`
/// means walking *to* the stop (the boarding leg); otherwise walking *from*
/// it (the alighting leg).
fn walk_segment(user_point: Coordinate, stop: &Stop, distance_km: f64, to_stop: bool) -> WalkSegment {
    let meters = distance_km * 1000.0;
    let duration_min = (meters / WALK_SPEED_M_PER_MIN).ceil() as u32;
    let (from, to, from_name, to_name) = if to_stop {
        (user_point, stop.coord, "pickup".into(), stop.name.clone())
    } else {
        (stop.coord, user_point, stop.name.clone(), "drop".into())
    };
    WalkSegment {
        from_name,
        to_name,
        from,
        to,
        distance_km,
        duration_min,
    }
}

fn assemble(segments: Vec<Segment>) -> Itinerary {
    let total_duration_min = segments
        .iter()
        .map(|s| match s {
            Segment::Walk(w) => w.duration_min,
            Segment::Bus(b) => b.duration_min,
            Segment::TransferWait(t) => t.wait_min,
        })
        .sum();
    let total_distance_km = segments
        .iter()
        .map(|s| match s {
            Segment::Walk(w) => w.distance_km,
            Segment::Bus(b) => b.distance_km,
            Segment::TransferWait(_) => 0.0,
        })
        .sum();
    let total_fare_minor_units = segments
        .iter()
        .filter_map(|s| match s {
            Segment::Bus(b) => Some(b.fare_minor_units),
            _ => None,
        })
        .sum();
    Itinerary {
        segments,
        total_duration_min,
        total_distance_km,
        total_fare_minor_units,
    }
}

fn today_as_yyyymmdd() -> u32 {
    let now = chrono::Local::now();
    (now.year() as u32) * 10_000 + now.month() * 100 + now.day()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::tempdir;

    fn write_feed(dir: &std::path::Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }
        let _ = std::io::stdout().flush();
    }

    const ALWAYS_ACTIVE_CALENDAR: &str =
        "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
         WD,1,1,1,1,1,1,1,20200101,20301231\n";

    #[test]
    fn direct_itinerary_found_for_single_route_covering_both_stops() {
        let dir = tempdir().unwrap();
        write_feed(
            dir.path(),
            &[
                (
                    "stops.txt",
                    "stop_id,stop_name,stop_lat,stop_lon\n\
                     S1,First,28.7000,77.1000\n\
                     S2,Second,28.7020,77.1020\n\
                     S3,Third,28.7050,77.1050\n",
                ),
                (
                    "routes.txt",
                    "route_id,route_short_name,route_long_name,route_type\nR1,R1,Route One,3\n",
                ),
                (
                    "trips.txt",
                    "route_id,service_id,trip_id,trip_headsign\nR1,WD,T1,Downtown\n",
                ),
                (
                    "stop_times.txt",
                    "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                     T1,00:00:00,00:00:00,S1,1\n\
                     T1,00:05:00,00:05:00,S2,2\n\
                     T1,00:10:00,00:10:00,S3,3\n",
                ),
                ("calendar.txt", ALWAYS_ACTIVE_CALENDAR),
            ],
        );
        let index = ScheduleIndex::load(dir.path());
        let planner = ItineraryPlanner::new(&index);
        let pickup = Coordinate::new(28.7001, 77.1001).unwrap();
        let drop = Coordinate::new(28.7051, 77.1051).unwrap();

        let results = planner.find_itineraries_at(pickup, drop, Time::from_hms("09:55:00").unwrap(), 20250616, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].bus_segments().count(), 1);
        assert_eq!(results[0].total_fare_minor_units, 5);
    }

    #[test]
    fn empty_when_no_nearby_stops() {
        let dir = tempdir().unwrap();
        write_feed(
            dir.path(),
            &[
                (
                    "stops.txt",
                    "stop_id,stop_name,stop_lat,stop_lon\nS1,First,28.7000,77.1000\n",
                ),
                ("routes.txt", "route_id,route_short_name,route_long_name,route_type\n"),
                ("trips.txt", "route_id,service_id,trip_id,trip_headsign\n"),
                ("stop_times.txt", "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n"),
                ("calendar.txt", ALWAYS_ACTIVE_CALENDAR),
            ],
        );
        let index = ScheduleIndex::load(dir.path());
        let planner = ItineraryPlanner::new(&index);
        let results = planner.find_itineraries(
            Coordinate::new(0.0, 0.0).unwrap(),
            Coordinate::new(1.0, 1.0).unwrap(),
        );
        assert!(results.is_empty());
    }

    #[test]
    fn results_never_exceed_five_and_are_sorted_by_duration() {
        let dir = tempdir().unwrap();
        write_feed(
            dir.path(),
            &[
                (
                    "stops.txt",
                    "stop_id,stop_name,stop_lat,stop_lon\nS1,First,28.7000,77.1000\nS2,Second,28.7020,77.1020\n",
                ),
                (
                    "routes.txt",
                    "route_id,route_short_name,route_long_name,route_type\nR1,R1,Route One,3\n",
                ),
                (
                    "trips.txt",
                    "route_id,service_id,trip_id,trip_headsign\nR1,WD,T1,Downtown\n",
                ),
                (
                    "stop_times.txt",
                    "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                     T1,00:00:00,00:00:00,S1,1\nT1,00:05:00,00:05:00,S2,2\n",
                ),
                ("calendar.txt", ALWAYS_ACTIVE_CALENDAR),
            ],
        );
        let index = ScheduleIndex::load(dir.path());
        let planner = ItineraryPlanner::new(&index);
        let results = planner.find_itineraries_at(
            Coordinate::new(28.7001, 77.1001).unwrap(),
            Coordinate::new(28.7021, 77.1021).unwrap(),
            Time::from_hms("00:00:00").unwrap(),
            20250616,
            1,
        );
        assert!(results.len() <= MAX_RESULTS);
        assert!(results.windows(2).all(|w| w[0].total_duration_min <= w[1].total_duration_min));
    }
}
