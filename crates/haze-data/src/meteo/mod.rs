//! Air-quality data from the Open-Meteo API.

pub mod client;

pub use client::{AQI_SERIES, AirQualityClient, Location, MUMBAI};
