//! Weather stations: the record type the demo binary and the tests run the controllers
//! against.

mod edit;
mod model;

pub use edit::WeatherStationFields;
pub use model::{fields, numbered_stations, sample_stations, WeatherStation};
