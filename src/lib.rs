pub mod fare;
pub mod gtfs;
pub mod planner;
pub mod quotes;
pub mod schedule;
pub mod shared;
