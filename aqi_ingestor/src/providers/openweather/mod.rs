//! OpenWeatherMap Air Pollution API provider.

pub mod params;
pub mod provider;
pub mod response;

pub use params::OpenWeatherConfig;
pub use provider::OpenWeatherProvider;
