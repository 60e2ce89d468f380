use async_trait::async_trait;
use itertools::Itertools;
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No data found: {0}")]
    NotFound(&'static str),
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Row {row} of table '{table}' does not match schema: {reason}")]
    Schema {
        table: &'static str,
        row: usize,
        reason: String,
    },
}

/// One recorded observation for a station on a given day.
///
/// `date` is kept in its `YYYY-MM-DD` form; every range filter in this module
/// compares the strings directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub station: String,
    pub date: String,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

impl Measurement {
    pub fn new(
        station: impl Into<String>,
        date: impl Into<String>,
        prcp: Option<f64>,
        tobs: f64,
    ) -> Self {
        Self {
            station: station.into(),
            date: date.into(),
            prcp,
            tobs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub station: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl Station {
    pub fn new(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            name: None,
            latitude: None,
            longitude: None,
            elevation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureReading {
    pub date: String,
    pub tobs: f64,
}

/// Min/avg/max of `tobs` over a non-empty set of rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureAggregate {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

/// Inclusive date range, open-ended when `end` is `None`.
///
/// Bounds are compared as strings, so a bound that is not `YYYY-MM-DD`
/// simply matches nothing useful instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: Option<String>,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: Option<String>) -> Self {
        Self {
            start: start.into(),
            end,
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        date >= self.start.as_str()
            && self
                .end
                .as_deref()
                .map_or(true, |end| date <= end)
    }
}

#[async_trait]
pub trait ObservationData: Sync + Send {
    /// All `(date, prcp)` pairs with `date >= cutoff`, in row order.
    async fn precipitation_since(&self, cutoff: &str) -> Result<Vec<PrecipitationReading>, Error>;
    async fn stations(&self) -> Result<Vec<String>, Error>;
    async fn most_active_station(&self) -> Result<String, Error>;
    async fn latest_date(&self) -> Result<String, Error>;
    async fn temperatures_for_station_since(
        &self,
        station: &str,
        cutoff: &str,
    ) -> Result<Vec<TemperatureReading>, Error>;
    /// `None` when no row falls inside `range`.
    async fn temperature_stats(
        &self,
        range: &DateRange,
    ) -> Result<Option<TemperatureAggregate>, Error>;
}

/// Immutable snapshot of the measurement and station tables.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it after
/// construction so concurrent readers need no locking.
#[derive(Debug, Default, Clone)]
pub struct ObservationStore {
    measurements: Vec<Measurement>,
    stations: Vec<Station>,
}

impl ObservationStore {
    pub fn new(measurements: Vec<Measurement>, stations: Vec<Station>) -> Self {
        Self {
            measurements,
            stations,
        }
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn station_records(&self) -> &[Station] {
        &self.stations
    }

    pub fn precipitation_since(&self, cutoff: &str) -> Vec<PrecipitationReading> {
        self.measurements
            .iter()
            .filter(|m| m.date.as_str() >= cutoff)
            .map(|m| PrecipitationReading {
                date: m.date.clone(),
                prcp: m.prcp,
            })
            .collect()
    }

    pub fn station_ids(&self) -> Vec<String> {
        self.stations
            .iter()
            .map(|s| s.station.clone())
            .unique()
            .collect()
    }

    /// Station with the most temperature observations.
    ///
    /// Ties go to the station that reached the winning count first while
    /// scanning rows in their stored order.
    pub fn most_active_station(&self) -> Result<String, Error> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut leader: Option<(&str, usize)> = None;

        for measurement in &self.measurements {
            let count = counts.entry(measurement.station.as_str()).or_insert(0);
            *count += 1;
            if leader.map_or(true, |(_, best)| *count > best) {
                leader = Some((measurement.station.as_str(), *count));
            }
        }

        leader
            .map(|(station, _)| station.to_owned())
            .ok_or(Error::NotFound("no measurements to rank stations by"))
    }

    pub fn latest_date(&self) -> Result<String, Error> {
        self.measurements
            .iter()
            .map(|m| m.date.as_str())
            .max()
            .map(str::to_owned)
            .ok_or(Error::NotFound("no measurements to take a latest date from"))
    }

    pub fn temperatures_for_station_since(
        &self,
        station: &str,
        cutoff: &str,
    ) -> Vec<TemperatureReading> {
        self.measurements
            .iter()
            .filter(|m| m.station == station && m.date.as_str() >= cutoff)
            .map(|m| TemperatureReading {
                date: m.date.clone(),
                tobs: m.tobs,
            })
            .collect()
    }

    pub fn temperature_stats(&self, range: &DateRange) -> Option<TemperatureAggregate> {
        let mut matched = self
            .measurements
            .iter()
            .filter(|m| range.contains(&m.date))
            .map(|m| m.tobs);

        let first = matched.next()?;
        let (min, max, sum, count) = matched.fold(
            (first, first, first, 1_usize),
            |(min, max, sum, count), tobs| (min.min(tobs), max.max(tobs), sum + tobs, count + 1),
        );

        Some(TemperatureAggregate {
            min,
            avg: sum / count as f64,
            max,
        })
    }
}

#[async_trait]
impl ObservationData for ObservationStore {
    async fn precipitation_since(&self, cutoff: &str) -> Result<Vec<PrecipitationReading>, Error> {
        Ok(ObservationStore::precipitation_since(self, cutoff))
    }

    async fn stations(&self) -> Result<Vec<String>, Error> {
        Ok(self.station_ids())
    }

    async fn most_active_station(&self) -> Result<String, Error> {
        ObservationStore::most_active_station(self)
    }

    async fn latest_date(&self) -> Result<String, Error> {
        ObservationStore::latest_date(self)
    }

    async fn temperatures_for_station_since(
        &self,
        station: &str,
        cutoff: &str,
    ) -> Result<Vec<TemperatureReading>, Error> {
        Ok(ObservationStore::temperatures_for_station_since(
            self, station, cutoff,
        ))
    }

    async fn temperature_stats(
        &self,
        range: &DateRange,
    ) -> Result<Option<TemperatureAggregate>, Error> {
        Ok(ObservationStore::temperature_stats(self, range))
    }
}
