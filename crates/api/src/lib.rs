pub mod climate;
pub mod db;
pub mod routes;
pub mod startup;
pub mod templates;
mod utils;

pub use climate::{
    ClimateService, Error, Precipitation, TemperatureObservation, TemperatureStatistics,
};
pub use db::{
    DateRange, Measurement, ObservationData, ObservationStore, PrecipitationReading, Station,
    TemperatureAggregate, TemperatureReading,
};
pub use routes::*;
pub use startup::*;
pub use utils::*;
