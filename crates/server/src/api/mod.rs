mod fares;
mod health;
mod routes;

pub use fares::compare_fares;
pub use health::healthz;
pub use routes::bus_routes;
