use axum::{
    extract::{Path, State},
    Json,
};
use log::error;
use std::sync::Arc;

use crate::{
    climate::{Error, Precipitation, TemperatureObservation, TemperatureStatistics},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation by date for the year leading up to the newest observation, one value per date", body = Precipitation),
        (status = NOT_FOUND, description = "The dataset holds no measurements"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to derive the precipitation window")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Precipitation>, Error> {
    state.climate.precipitation().await.map(Json).map_err(|e| {
        error!("error getting precipitation: {}", e);
        e
    })
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Identifiers of every weather station", body = Vec<String>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to list stations")
    ))]
pub async fn stations(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, Error> {
    state.climate.stations().await.map(Json).map_err(|e| {
        error!("error getting stations: {}", e);
        e
    })
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Temperature observations of the most active station for the year leading up to the newest observation", body = Vec<TemperatureObservation>),
        (status = NOT_FOUND, description = "The dataset holds no measurements"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to derive the observation window")
    ))]
pub async fn temperature_observations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureObservation>>, Error> {
    state
        .climate
        .temperature_observations()
        .await
        .map(Json)
        .map_err(|e| {
            error!("error getting temperature observations: {}", e);
            e
        })
}

#[utoipa::path(
    get,
    path = "/api/v1.0/temperature/{start}",
    params(
        ("start" = String, Path, description = "First day to include, yyyy-mm-dd. Not validated: a malformed date matches nothing and every temperature comes back null"),
    ),
    responses(
        (status = OK, description = "Min, average and max temperature from start onwards", body = TemperatureStatistics),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to aggregate temperatures")
    ))]
pub async fn temperature_stats_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStatistics>, Error> {
    temperature_stats(&state, start, None).await
}

#[utoipa::path(
    get,
    path = "/api/v1.0/temperature/{start}/{end}",
    params(
        ("start" = String, Path, description = "First day to include, yyyy-mm-dd"),
        ("end" = String, Path, description = "Last day to include, yyyy-mm-dd"),
    ),
    responses(
        (status = OK, description = "Min, average and max temperature between start and end, inclusive; null temperatures when no day matches", body = TemperatureStatistics),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to aggregate temperatures")
    ))]
pub async fn temperature_stats_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStatistics>, Error> {
    temperature_stats(&state, start, Some(end)).await
}

async fn temperature_stats(
    state: &AppState,
    start: String,
    end: Option<String>,
) -> Result<Json<TemperatureStatistics>, Error> {
    state
        .climate
        .temperature_statistics(start, end)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error getting temperature statistics: {}", e);
            e
        })
}
