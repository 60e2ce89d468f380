use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::{str::FromStr, time::Duration};

use super::{Error, Measurement, ObservationStore, Station};

const MEASUREMENT_QUERY: &str =
    "SELECT station, date, prcp, tobs FROM measurement ORDER BY rowid";
const STATION_QUERY: &str =
    "SELECT station, name, latitude, longitude, elevation FROM station ORDER BY rowid";

/// Load the `measurement` and `station` tables of the sqlite file at `path`
/// into an in-memory [`ObservationStore`].
///
/// The file is opened read-only and the pool is closed once both tables have
/// been read.
pub async fn load_observation_store(path: &str) -> Result<ObservationStore, Error> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
        .read_only(true)
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    let store = load_from_pool(&pool).await;
    pool.close().await;

    let store = store?;
    info!(
        "Loaded {} measurements and {} stations from {}",
        store.measurements().len(),
        store.station_records().len(),
        path
    );
    Ok(store)
}

/// Read both tables from an already open pool, in rowid order.
pub async fn load_from_pool(pool: &SqlitePool) -> Result<ObservationStore, Error> {
    let stations = sqlx::query(STATION_QUERY)
        .fetch_all(pool)
        .await?
        .iter()
        .enumerate()
        .map(|(index, row)| row_to_station(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    let measurements = sqlx::query(MEASUREMENT_QUERY)
        .fetch_all(pool)
        .await?
        .iter()
        .enumerate()
        .map(|(index, row)| row_to_measurement(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ObservationStore::new(measurements, stations))
}

fn row_to_measurement(index: usize, row: &SqliteRow) -> Result<Measurement, Error> {
    let schema_error = |reason: String| Error::Schema {
        table: "measurement",
        row: index,
        reason,
    };

    let station: String = row
        .try_get("station")
        .map_err(|e| schema_error(e.to_string()))?;
    let date: String = row
        .try_get("date")
        .map_err(|e| schema_error(e.to_string()))?;
    let prcp: Option<f64> = row
        .try_get("prcp")
        .map_err(|e| schema_error(e.to_string()))?;
    let tobs: Option<f64> = row
        .try_get("tobs")
        .map_err(|e| schema_error(e.to_string()))?;
    let tobs = tobs.ok_or_else(|| schema_error(String::from("tobs is required but was NULL")))?;

    Ok(Measurement {
        station,
        date,
        prcp,
        tobs,
    })
}

fn row_to_station(index: usize, row: &SqliteRow) -> Result<Station, Error> {
    let schema_error = |e: sqlx::Error| Error::Schema {
        table: "station",
        row: index,
        reason: e.to_string(),
    };

    Ok(Station {
        station: row.try_get("station").map_err(schema_error)?,
        name: row.try_get("name").map_err(schema_error)?,
        latitude: row.try_get("latitude").map_err(schema_error)?,
        longitude: row.try_get("longitude").map_err(schema_error)?,
        elevation: row.try_get("elevation").map_err(schema_error)?,
    })
}
