use async_trait::async_trait;
use axum::Router;
use climate_api::{
    app, app_state_from_store,
    db::{
        DateRange, Error, Measurement, ObservationData, ObservationStore, PrecipitationReading,
        Station, TemperatureAggregate, TemperatureReading,
    },
};
use mockall::mock;
use std::sync::Arc;

pub struct TestApp {
    pub app: Router,
}

pub fn spawn_app(store: Arc<dyn ObservationData>) -> TestApp {
    TestApp {
        app: app(app_state_from_store(store, None)),
    }
}

pub fn spawn_app_with_store(store: ObservationStore) -> TestApp {
    spawn_app(Arc::new(store))
}

/// Three readings of one station, a year apart at the edges.
pub fn mock_year_store() -> ObservationStore {
    ObservationStore::new(
        vec![
            Measurement::new("S1", "2016-08-23", Some(0.1), 70.0),
            Measurement::new("S1", "2017-08-22", Some(0.2), 75.0),
            Measurement::new("S1", "2017-08-23", Some(0.0), 80.0),
        ],
        vec![Station::new("S1")],
    )
}

pub fn mock_hawaii_store() -> ObservationStore {
    ObservationStore::new(
        vec![
            Measurement::new("USC00519397", "2016-08-20", Some(0.0), 81.0),
            Measurement::new("USC00519281", "2016-08-23", Some(1.79), 77.0),
            Measurement::new("USC00519397", "2016-08-23", Some(0.0), 81.0),
            Measurement::new("USC00513117", "2016-08-23", Some(0.15), 76.0),
            Measurement::new("USC00519281", "2016-08-24", None, 77.0),
            Measurement::new("USC00513117", "2016-08-24", Some(2.15), 76.0),
            Measurement::new("USC00519281", "2017-08-18", Some(0.06), 79.0),
            Measurement::new("USC00519397", "2017-08-23", Some(0.0), 81.0),
        ],
        vec![
            Station::new("USC00519397"),
            Station::new("USC00513117"),
            Station::new("USC00519281"),
        ],
    )
}

mock! {
    pub ObservationAccess {}

    #[async_trait]
    impl ObservationData for ObservationAccess {
        async fn precipitation_since(&self, cutoff: &str) -> Result<Vec<PrecipitationReading>, Error>;
        async fn stations(&self) -> Result<Vec<String>, Error>;
        async fn most_active_station(&self) -> Result<String, Error>;
        async fn latest_date(&self) -> Result<String, Error>;
        async fn temperatures_for_station_since(
            &self,
            station: &str,
            cutoff: &str,
        ) -> Result<Vec<TemperatureReading>, Error>;
        async fn temperature_stats(
            &self,
            range: &DateRange,
        ) -> Result<Option<TemperatureAggregate>, Error>;
    }
}
