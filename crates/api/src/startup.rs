use crate::{
    climate::{self, ClimateService},
    db::{load_observation_store, ObservationData},
    index_handler, precipitation, routes, stations, temperature_observations,
    temperature_stats_between, temperature_stats_from,
};
use anyhow::{anyhow, Context};
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use climate_core::is_file;
use hyper::{header::ACCEPT, Method};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub climate: Arc<ClimateService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::observations::observation_routes::precipitation,
        routes::observations::observation_routes::stations,
        routes::observations::observation_routes::temperature_observations,
        routes::observations::observation_routes::temperature_stats_from,
        routes::observations::observation_routes::temperature_stats_between,
    ),
    components(
        schemas(
            climate::Precipitation,
            climate::TemperatureObservation,
            climate::TemperatureStatistics,
        )
    ),
    tags(
        (name = "climate analysis api", description = "a read-only RESTful api over weather station precipitation and temperature observations")
    )
)]
struct ApiDoc;

/// Load the observation database once and wire it into the query service.
pub async fn build_app_state(
    database_path: String,
    precipitation_cutoff: Option<String>,
) -> Result<AppState, anyhow::Error> {
    if !is_file(&database_path) {
        return Err(anyhow!("observation database not found at {}", database_path));
    }
    if let Some(cutoff) = &precipitation_cutoff {
        climate::parse_iso_date(cutoff)
            .with_context(|| format!("invalid precipitation cutoff '{}'", cutoff))?;
    }

    let store = load_observation_store(&database_path)
        .await
        .with_context(|| format!("error loading observations from {}", database_path))?;

    Ok(app_state_from_store(Arc::new(store), precipitation_cutoff))
}

pub fn app_state_from_store(
    store: Arc<dyn ObservationData>,
    precipitation_cutoff: Option<String>,
) -> AppState {
    AppState {
        climate: Arc::new(ClimateService::new(store, precipitation_cutoff)),
    }
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(temperature_observations))
        .route("/api/v1.0/temperature/{start}", get(temperature_stats_from))
        .route(
            "/api/v1.0/temperature/{start}/{end}",
            get(temperature_stats_between),
        )
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
