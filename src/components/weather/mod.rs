mod client;
pub mod models;

pub use client::{parse_daily, parse_three_hourly, DataHubClient, DATAHUB_BASE_URL};
pub use models::{DailyForecast, Forecast, HourlyForecast, WeatherIcon};

use crate::error::InkResult;
use async_trait::async_trait;

/// Anything that can supply a forecast, the Met Office DataHub in production
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_forecast(&self) -> InkResult<Forecast>;
}
