use std::sync::Arc;

use waypoint::{quotes::QuoteAggregator, schedule::ScheduleIndex};

pub struct AppState {
    pub schedule: ScheduleIndex,
    pub aggregator: QuoteAggregator,
}

impl AppState {
    pub fn feed_loaded(&self) -> bool {
        self.schedule.is_enabled()
    }
}

pub type SharedState = Arc<AppState>;
