pub mod geo;
pub mod time;

pub use geo::Coordinate;
pub use time::{Duration, Time};
