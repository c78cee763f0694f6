use axum::{Json, extract::State};
use waypoint::planner::ItineraryPlanner;

use crate::{
    dto::{BusRouteWire, RoutesResponse, TripRequest},
    error::ApiError,
    state::SharedState,
};

pub async fn bus_routes(State(state): State<SharedState>, Json(body): Json<TripRequest>) -> Result<Json<RoutesResponse>, ApiError> {
    let pickup = body
        .pickup
        .into_coordinate()
        .ok_or_else(|| ApiError::InputInvalid("pickup coordinate missing or non-numeric".to_string()))?;
    let drop = body
        .drop
        .into_coordinate()
        .ok_or_else(|| ApiError::InputInvalid("drop coordinate missing or non-numeric".to_string()))?;

    // `FeedUnavailable` is not an error: a disabled schedule index just
    // yields an empty itinerary list here.
    let planner = ItineraryPlanner::new(&state.schedule);
    let routes: Vec<BusRouteWire> = planner.find_itineraries(pickup, drop).into_iter().map(BusRouteWire::from).collect();

    Ok(Json(RoutesResponse {
        success: true,
        count: routes.len(),
        routes,
    }))
}
