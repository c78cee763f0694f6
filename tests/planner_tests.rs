use tempfile::tempdir;
use waypoint::{
    planner::ItineraryPlanner,
    schedule::ScheduleIndex,
    shared::{Coordinate, Time},
};

fn write_feed(dir: &std::path::Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
}

const WEEKDAY_ONLY_CALENDAR: &str =
    "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
     WD,1,1,1,1,1,0,0,20200101,20301231\n";

const WEEKEND_ONLY_CALENDAR: &str =
    "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
     WD,0,0,0,0,0,1,1,20200101,20301231\n";

const S1_STOPS: &str = "stop_id,stop_name,stop_lat,stop_lon\n\
     S1,First,28.7000,77.1000\n\
     S2,Second,28.7020,77.1020\n\
     S3,Third,28.7050,77.1050\n";

const S1_ROUTES: &str = "route_id,route_short_name,route_long_name,route_type\nR1,R1,Route One,3\n";

const S1_TRIPS: &str = "route_id,service_id,trip_id,trip_headsign\nR1,WD,T1,Downtown\n";

const S1_STOP_TIMES: &str = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
     T1,10:00:00,10:00:00,S1,1\n\
     T1,10:05:00,10:05:00,S2,2\n\
     T1,10:10:00,10:10:00,S3,3\n";

/// S1 — direct bus exists: a weekday boarding at 09:55 should produce
/// exactly one direct itinerary on R1 with a 5-unit fare.
#[test]
fn s1_direct_bus_exists() {
    let dir = tempdir().unwrap();
    write_feed(
        dir.path(),
        &[
            ("stops.txt", S1_STOPS),
            ("routes.txt", S1_ROUTES),
            ("trips.txt", S1_TRIPS),
            ("stop_times.txt", S1_STOP_TIMES),
            ("calendar.txt", WEEKDAY_ONLY_CALENDAR),
        ],
    );
    let index = ScheduleIndex::load(dir.path());
    let planner = ItineraryPlanner::new(&index);

    let results = planner.find_itineraries_at(
        Coordinate::new(28.7001, 77.1001).unwrap(),
        Coordinate::new(28.7051, 77.1051).unwrap(),
        Time::from_hms("09:55:00").unwrap(),
        20250602, // a Monday
        1,
    );

    assert_eq!(results.len(), 1);
    let itinerary = &results[0];
    assert_eq!(itinerary.segments.len(), 3, "direct itinerary has Walk, Bus, Walk");
    let bus = itinerary.bus_segments().next().unwrap();
    assert_eq!(bus.intermediate_stops.len(), 0);
    assert_eq!(itinerary.total_fare_minor_units, 5);
    assert!(itinerary.total_duration_min <= 25);
}

/// S2 — no nearby stops: pickup/drop far from every stop yields `[]`.
#[test]
fn s2_no_nearby_stops() {
    let dir = tempdir().unwrap();
    write_feed(
        dir.path(),
        &[
            ("stops.txt", S1_STOPS),
            ("routes.txt", S1_ROUTES),
            ("trips.txt", S1_TRIPS),
            ("stop_times.txt", S1_STOP_TIMES),
            ("calendar.txt", WEEKDAY_ONLY_CALENDAR),
        ],
    );
    let index = ScheduleIndex::load(dir.path());
    let planner = ItineraryPlanner::new(&index);

    let results = planner.find_itineraries_at(
        Coordinate::new(0.0, 0.0).unwrap(),
        Coordinate::new(1.0, 1.0).unwrap(),
        Time::from_hms("09:55:00").unwrap(),
        20250602,
        1,
    );
    assert!(results.is_empty());
}

/// S3 — service inactive: the same feed restricted to weekends, queried on
/// a weekday, yields `[]`.
#[test]
fn s3_service_inactive_on_weekday() {
    let dir = tempdir().unwrap();
    write_feed(
        dir.path(),
        &[
            ("stops.txt", S1_STOPS),
            ("routes.txt", S1_ROUTES),
            ("trips.txt", S1_TRIPS),
            ("stop_times.txt", S1_STOP_TIMES),
            ("calendar.txt", WEEKEND_ONLY_CALENDAR),
        ],
    );
    let index = ScheduleIndex::load(dir.path());
    let planner = ItineraryPlanner::new(&index);

    let results = planner.find_itineraries_at(
        Coordinate::new(28.7001, 77.1001).unwrap(),
        Coordinate::new(28.7051, 77.1051).unwrap(),
        Time::from_hms("09:55:00").unwrap(),
        20250602, // a Monday
        1,
    );
    assert!(results.is_empty());
}

/// S4 — one-transfer: R2 continues from S3 to S4. With every stop packed
/// within the 2km candidate radius of both endpoints, a direct R1 ride
/// that simply ends its walk-out leg at S3 is itself a valid (if longer)
/// itinerary here, so this asserts the transfer itinerary is present
/// among the results rather than that it is the only one.
#[test]
fn s4_one_transfer() {
    let dir = tempdir().unwrap();
    write_feed(
        dir.path(),
        &[
            (
                "stops.txt",
                "stop_id,stop_name,stop_lat,stop_lon\n\
                 S1,First,28.7000,77.1000\n\
                 S2,Second,28.7020,77.1020\n\
                 S3,Third,28.7050,77.1050\n\
                 S4,Fourth,28.7080,77.1080\n",
            ),
            (
                "routes.txt",
                "route_id,route_short_name,route_long_name,route_type\n\
                 R1,R1,Route One,3\n\
                 R2,R2,Route Two,3\n",
            ),
            (
                "trips.txt",
                "route_id,service_id,trip_id,trip_headsign\n\
                 R1,WD,T1,Downtown\n\
                 R2,WD,T2,Uptown\n",
            ),
            (
                "stop_times.txt",
                "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                 T1,10:00:00,10:00:00,S1,1\n\
                 T1,10:05:00,10:05:00,S2,2\n\
                 T1,10:10:00,10:10:00,S3,3\n\
                 T2,10:15:00,10:15:00,S3,1\n\
                 T2,10:25:00,10:25:00,S4,2\n",
            ),
            ("calendar.txt", WEEKDAY_ONLY_CALENDAR),
        ],
    );
    let index = ScheduleIndex::load(dir.path());
    let planner = ItineraryPlanner::new(&index);

    let results = planner.find_itineraries_at(
        Coordinate::new(28.7001, 77.1001).unwrap(),
        Coordinate::new(28.7081, 77.1081).unwrap(),
        Time::from_hms("09:55:00").unwrap(),
        20250602,
        1,
    );

    assert!(!results.is_empty(), "expected at least one itinerary");

    let transfer = results
        .iter()
        .find(|it| it.bus_segments().count() == 2)
        .expect("expected a transfer itinerary using both R1 and R2");

    assert_eq!(transfer.segments.len(), 5, "transfer itinerary has Walk, Bus, TransferWait, Bus, Walk");
    let buses: Vec<_> = transfer.bus_segments().collect();
    assert_eq!(buses[0].route_id.as_ref(), "R1");
    assert_eq!(buses[1].route_id.as_ref(), "R2");

    let wait = transfer
        .segments
        .iter()
        .find_map(|s| match s {
            waypoint::planner::Segment::TransferWait(t) => Some(t.wait_min),
            _ => None,
        })
        .unwrap();
    assert_eq!(wait, 5);
    assert!(wait < 45);
}

/// Invariant 4: at most 5 itineraries, sorted non-decreasingly by duration.
#[test]
fn results_are_capped_and_sorted() {
    let dir = tempdir().unwrap();
    write_feed(
        dir.path(),
        &[
            ("stops.txt", S1_STOPS),
            ("routes.txt", S1_ROUTES),
            ("trips.txt", S1_TRIPS),
            ("stop_times.txt", S1_STOP_TIMES),
            ("calendar.txt", WEEKDAY_ONLY_CALENDAR),
        ],
    );
    let index = ScheduleIndex::load(dir.path());
    let planner = ItineraryPlanner::new(&index);
    let results = planner.find_itineraries_at(
        Coordinate::new(28.7001, 77.1001).unwrap(),
        Coordinate::new(28.7051, 77.1051).unwrap(),
        Time::from_hms("09:55:00").unwrap(),
        20250602,
        1,
    );
    assert!(results.len() <= 5);
    assert!(results.windows(2).all(|w| w[0].total_duration_min <= w[1].total_duration_min));
}
