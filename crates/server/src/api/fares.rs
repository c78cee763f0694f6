use axum::{Json, extract::State};

use crate::{
    dto::{FareQuoteWire, FaresResponse, TripRequest},
    error::ApiError,
    state::SharedState,
};

pub async fn compare_fares(State(state): State<SharedState>, Json(body): Json<TripRequest>) -> Result<Json<FaresResponse>, ApiError> {
    let pickup = body
        .pickup
        .into_coordinate()
        .ok_or_else(|| ApiError::InputInvalid("pickup coordinate missing or non-numeric".to_string()))?;
    let drop = body
        .drop
        .into_coordinate()
        .ok_or_else(|| ApiError::InputInvalid("drop coordinate missing or non-numeric".to_string()))?;

    let quotes = state.aggregator.get_quotes(pickup, drop).await;
    let estimates: Vec<FareQuoteWire> = quotes.into_iter().map(FareQuoteWire::from).collect();

    Ok(Json(FaresResponse {
        success: true,
        count: estimates.len(),
        estimates,
    }))
}
