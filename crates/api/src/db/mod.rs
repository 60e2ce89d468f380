pub mod observation_store;
pub mod sqlite;

pub use observation_store::*;
pub use sqlite::{load_from_pool, load_observation_store};
