//! Price providers for the supported data sources

pub mod alpha_vantage;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageProvider;
pub use yahoo::YahooProvider;
