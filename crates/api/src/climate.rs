use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use time::{macros::format_description, Date, Duration};
use utoipa::ToSchema;

use crate::db::{self, DateRange, ObservationData};

/// Length of the rolling window served by the precipitation and tobs routes.
pub const ROLLING_WINDOW_DAYS: i64 = 365;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to parse date: {0}")]
    DateParse(#[from] time::error::Parse),
    #[error("Failed to format date: {0}")]
    DateFormat(#[from] time::error::Format),
    #[error("Failed to access observations: {0}")]
    DataAccess(db::Error),
}

impl From<db::Error> for Error {
    fn from(e: db::Error) -> Self {
        match e {
            db::Error::NotFound(what) => Error::NotFound(what.to_string()),
            other => Error::DataAccess(other),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::DateParse(_) | Error::DateFormat(_) | Error::DataAccess(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

/// Precipitation keyed by date.
///
/// Several stations report on the same day but only one value per date is
/// kept: the last row in store order wins.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, ToSchema)]
#[serde(transparent)]
pub struct Precipitation(pub BTreeMap<String, Option<f64>>);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TemperatureObservation {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
}

/// Aggregate temperatures for a date range.
///
/// The three temperature fields are either all set or all `null`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TemperatureStatistics {
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date")]
    pub end_date: Option<String>,
    #[serde(rename = "Min Temperature")]
    pub min_temperature: Option<f64>,
    #[serde(rename = "Avg Temperature")]
    pub avg_temperature: Option<f64>,
    #[serde(rename = "Max Temperature")]
    pub max_temperature: Option<f64>,
}

pub struct ClimateService {
    store: Arc<dyn ObservationData>,
    precipitation_cutoff: Option<String>,
}

impl ClimateService {
    /// `precipitation_cutoff` pins the precipitation route to a fixed start
    /// date; when `None` it uses the same rolling window as the tobs route.
    pub fn new(store: Arc<dyn ObservationData>, precipitation_cutoff: Option<String>) -> Self {
        if let Some(cutoff) = &precipitation_cutoff {
            info!("precipitation route pinned to cutoff {}", cutoff);
        }
        Self {
            store,
            precipitation_cutoff,
        }
    }

    /// Start of the last [`ROLLING_WINDOW_DAYS`] relative to the newest date
    /// in the dataset, not to the wall clock.
    pub async fn rolling_window_start(&self) -> Result<String, Error> {
        let latest = self.store.latest_date().await?;
        days_before(&latest, ROLLING_WINDOW_DAYS)
    }

    pub async fn precipitation(&self) -> Result<Precipitation, Error> {
        let cutoff = match &self.precipitation_cutoff {
            Some(cutoff) => cutoff.clone(),
            None => self.rolling_window_start().await?,
        };
        debug!("precipitation cutoff: {}", cutoff);

        let readings = self.store.precipitation_since(&cutoff).await?;
        let by_date = readings
            .into_iter()
            .map(|reading| (reading.date, reading.prcp))
            .collect();

        Ok(Precipitation(by_date))
    }

    pub async fn stations(&self) -> Result<Vec<String>, Error> {
        Ok(self.store.stations().await?)
    }

    pub async fn temperature_observations(&self) -> Result<Vec<TemperatureObservation>, Error> {
        let station = self.store.most_active_station().await?;
        let cutoff = self.rolling_window_start().await?;
        debug!("temperature observations for {} since {}", station, cutoff);

        let readings = self
            .store
            .temperatures_for_station_since(&station, &cutoff)
            .await?;

        Ok(readings
            .into_iter()
            .map(|reading| TemperatureObservation {
                date: reading.date,
                temperature: reading.tobs,
            })
            .collect())
    }

    /// Min/avg/max temperature from `start` through `end` (inclusive).
    ///
    /// Dates are not validated: a malformed date matches no rows and yields
    /// `null` temperatures rather than an error.
    pub async fn temperature_statistics(
        &self,
        start: String,
        end: Option<String>,
    ) -> Result<TemperatureStatistics, Error> {
        if start.is_empty() {
            return Err(Error::InvalidInput(String::from("start date is required")));
        }

        let range = DateRange::new(start, end);
        let stats = self.store.temperature_stats(&range).await?;

        Ok(TemperatureStatistics {
            start_date: range.start,
            end_date: range.end,
            min_temperature: stats.map(|s| s.min),
            avg_temperature: stats.map(|s| s.avg),
            max_temperature: stats.map(|s| s.max),
        })
    }
}

pub fn parse_iso_date(date: &str) -> Result<Date, Error> {
    Ok(Date::parse(date, &format_description!("[year]-[month]-[day]"))?)
}

/// `date` (`YYYY-MM-DD`) moved back by `days` calendar days, re-encoded in
/// the same format.
pub fn days_before(date: &str, days: i64) -> Result<String, Error> {
    let shifted = parse_iso_date(date)?.saturating_sub(Duration::days(days));
    Ok(shifted.format(&format_description!("[year]-[month]-[day]"))?)
}
