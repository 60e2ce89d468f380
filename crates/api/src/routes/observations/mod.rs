pub mod observation_routes;

pub use observation_routes::*;
