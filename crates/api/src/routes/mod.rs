pub mod home;
pub mod observations;

pub use home::*;
pub use observations::*;
