mod config;
pub mod models;

pub use config::*;
use models::{RawCalendar, RawRoute, RawStop, RawStopTime, RawTrip};
use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::warn;

use crate::shared::Time;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("required feed file missing: {0}")]
    MissingFile(String),
}

/// Reads the five GTFS tables this planner needs directly from a feed
/// directory, skipping malformed rows instead of failing the whole load.
///
/// Numeric/required fields are parsed strictly per row; a row that is
/// missing a required field or fails to parse is logged with `warn!` and
/// dropped rather than aborting the load, since real-world exports are
/// rarely perfectly well-formed.
pub struct Gtfs {
    config: Config,
    dir: PathBuf,
}

impl Gtfs {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config: Config::default(),
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    fn open(&self, file_name: &str) -> Result<csv::Reader<BufReader<File>>, Error> {
        let path = self.dir.join(file_name);
        if !path.exists() {
            return Err(Error::MissingFile(file_name.to_string()));
        }
        let file = File::open(&path)?;
        // BufReader keeps large feeds from doing a syscall per row.
        let reader = BufReader::with_capacity(128 * 1024, file);
        Ok(csv::ReaderBuilder::new().has_headers(true).from_reader(reader))
    }

    pub fn load_stops(&self) -> Result<Vec<RawStop>, Error> {
        let mut reader = self.open(&self.config.stops_path)?;
        let cols = ColumnIndex::new(reader.headers()?);
        let mut out = Vec::new();
        for (row_num, record) in reader.records().enumerate() {
            let record = record?;
            if is_blank_row(&record) {
                continue;
            }
            let stop_id = cols.required(&record, "stop_id");
            let stop_name = cols.required(&record, "stop_name");
            let stop_lat = cols.required(&record, "stop_lat").and_then(parse_f64);
            let stop_lon = cols.required(&record, "stop_lon").and_then(parse_f64);
            match (stop_id, stop_name, stop_lat, stop_lon) {
                (Some(stop_id), Some(stop_name), Some(stop_lat), Some(stop_lon)) => {
                    out.push(RawStop {
                        stop_id,
                        stop_name,
                        stop_lat,
                        stop_lon,
                    });
                }
                _ => warn!("stops.txt row {row_num}: missing or unparsable required field, skipped"),
            }
        }
        Ok(out)
    }

    pub fn load_routes(&self) -> Result<Vec<RawRoute>, Error> {
        let mut reader = self.open(&self.config.routes_path)?;
        let cols = ColumnIndex::new(reader.headers()?);
        let mut out = Vec::new();
        for (row_num, record) in reader.records().enumerate() {
            let record = record?;
            if is_blank_row(&record) {
                continue;
            }
            let route_id = cols.required(&record, "route_id");
            let route_type = cols.required(&record, "route_type").and_then(parse_i32);
            match (route_id, route_type) {
                (Some(route_id), Some(route_type)) => out.push(RawRoute {
                    route_id,
                    route_short_name: cols.optional(&record, "route_short_name").unwrap_or_default(),
                    route_long_name: cols.optional(&record, "route_long_name").unwrap_or_default(),
                    route_type,
                }),
                _ => warn!("routes.txt row {row_num}: missing or unparsable required field, skipped"),
            }
        }
        Ok(out)
    }

    pub fn load_trips(&self) -> Result<Vec<RawTrip>, Error> {
        let mut reader = self.open(&self.config.trips_path)?;
        let cols = ColumnIndex::new(reader.headers()?);
        let mut out = Vec::new();
        for (row_num, record) in reader.records().enumerate() {
            let record = record?;
            if is_blank_row(&record) {
                continue;
            }
            let route_id = cols.required(&record, "route_id");
            let service_id = cols.required(&record, "service_id");
            let trip_id = cols.required(&record, "trip_id");
            match (route_id, service_id, trip_id) {
                (Some(route_id), Some(service_id), Some(trip_id)) => out.push(RawTrip {
                    trip_id,
                    route_id,
                    service_id,
                    trip_headsign: cols.optional(&record, "trip_headsign"),
                }),
                _ => warn!("trips.txt row {row_num}: missing or unparsable required field, skipped"),
            }
        }
        Ok(out)
    }

    pub fn load_stop_times(&self) -> Result<Vec<RawStopTime>, Error> {
        let mut reader = self.open(&self.config.stop_times_path)?;
        let cols = ColumnIndex::new(reader.headers()?);
        let mut out = Vec::new();
        for (row_num, record) in reader.records().enumerate() {
            let record = record?;
            if is_blank_row(&record) {
                continue;
            }
            let trip_id = cols.required(&record, "trip_id");
            let stop_id = cols.required(&record, "stop_id");
            let sequence = cols.required(&record, "stop_sequence").and_then(parse_u32);
            let arrival = cols
                .required(&record, "arrival_time")
                .and_then(|s| Time::from_hms(&s));
            let departure = cols
                .required(&record, "departure_time")
                .and_then(|s| Time::from_hms(&s));
            match (trip_id, stop_id, sequence, arrival, departure) {
                (Some(trip_id), Some(stop_id), Some(sequence), Some(arrival), Some(departure)) => {
                    out.push(RawStopTime {
                        trip_id,
                        stop_id,
                        sequence,
                        arrival,
                        departure,
                    });
                }
                _ => warn!("stop_times.txt row {row_num}: missing or unparsable required field, skipped"),
            }
        }
        Ok(out)
    }

    pub fn load_calendar(&self) -> Result<Vec<RawCalendar>, Error> {
        let mut reader = self.open(&self.config.calendar_path)?;
        let cols = ColumnIndex::new(reader.headers()?);
        const DAY_COLUMNS: [&str; 7] = [
            "sunday",
            "monday",
            "tuesday",
            "wednesday",
            "thursday",
            "friday",
            "saturday",
        ];
        let mut out = Vec::new();
        for (row_num, record) in reader.records().enumerate() {
            let record = record?;
            if is_blank_row(&record) {
                continue;
            }
            let service_id = cols.required(&record, "service_id");
            let start_date = cols.required(&record, "start_date").and_then(parse_u32);
            let end_date = cols.required(&record, "end_date").and_then(parse_u32);
            let mut active_days = [false; 7];
            let mut days_ok = true;
            for (i, col) in DAY_COLUMNS.iter().enumerate() {
                match cols.required(&record, col).and_then(parse_u32) {
                    Some(flag) => active_days[i] = flag != 0,
                    None => days_ok = false,
                }
            }
            match (service_id, start_date, end_date) {
                (Some(service_id), Some(start_date), Some(end_date)) if days_ok => {
                    out.push(RawCalendar {
                        service_id,
                        active_days,
                        start_date,
                        end_date,
                    });
                }
                _ => warn!("calendar.txt row {row_num}: missing or unparsable required field, skipped"),
            }
        }
        Ok(out)
    }
}

/// Maps required/optional column names to their position in the header row,
/// so parsing looks fields up by name instead of a brittle positional index.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &csv::StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { positions }
    }

    fn required(&self, record: &csv::StringRecord, column: &str) -> Option<String> {
        let value = self.positions.get(column).and_then(|&i| record.get(i))?.trim();
        if value.is_empty() { None } else { Some(value.to_string()) }
    }

    fn optional(&self, record: &csv::StringRecord, column: &str) -> Option<String> {
        self.required(record, column)
    }
}

fn is_blank_row(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn parse_f64(s: String) -> Option<f64> {
    s.parse().ok()
}

fn parse_i32(s: String) -> Option<i32> {
    s.parse().ok()
}

fn parse_u32(s: String) -> Option<u32> {
    s.parse().ok()
}
