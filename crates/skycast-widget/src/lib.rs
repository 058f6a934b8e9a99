//! SkyCast widget: turns a query into rendered weather.
//!
//! The flow for every user action is the same: parse the query, move the
//! model to loading, run one lookup, then show either the data or an error.

pub mod error_mapping;
pub mod model;
pub mod query;
pub mod render;
pub mod service;
pub mod session;

pub use error_mapping::IntoAppError;
pub use model::{WeatherModel, WidgetState};
pub use query::Query;
pub use service::WeatherService;
