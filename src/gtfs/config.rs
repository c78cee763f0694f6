/// File names expected inside the feed directory. Kept overridable so a
/// caller pointed at a non-standard export layout doesn't need to rename
/// files on disk.
#[derive(Debug, Clone)]
pub struct Config {
    pub stops_path: String,
    pub stop_times_path: String,
    pub trips_path: String,
    pub routes_path: String,
    pub calendar_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stops_path: "stops.txt".into(),
            stop_times_path: "stop_times.txt".into(),
            trips_path: "trips.txt".into(),
            routes_path: "routes.txt".into(),
            calendar_path: "calendar.txt".into(),
        }
    }
}
