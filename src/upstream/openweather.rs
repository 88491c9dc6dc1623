use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use super::{
    ensure_success, join_url, Coordinates, CurrentConditions, DailyForecast, WeatherProvider,
};
use crate::errors::GatewayError;

const PROVIDER: &str = "openweather";

#[derive(Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, GatewayError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .get(join_url(&self.base_url, path))
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        Ok(ensure_success(PROVIDER, response).await?.json::<T>().await?)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeMatch {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherSummary {
    description: String,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    weather: Vec<WeatherSummary>,
    main: CurrentMain,
}

#[derive(Debug, Deserialize)]
struct CurrentMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    timezone_offset: i64,
    #[serde(default)]
    daily: Vec<DailyEntry>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    dt: i64,
    temp: DailyTemperature,
    weather: Vec<WeatherSummary>,
}

#[derive(Debug, Deserialize)]
struct DailyTemperature {
    day: f64,
}

fn first_description(weather: Vec<WeatherSummary>) -> Result<String, GatewayError> {
    weather
        .into_iter()
        .next()
        .map(|summary| summary.description)
        .ok_or_else(|| GatewayError::upstream("openweather response has no weather summary"))
}

fn into_daily_forecast(
    entry: DailyEntry,
    timezone_offset: i64,
) -> Result<DailyForecast, GatewayError> {
    // Dates are rendered in the city's own offset, not the server's.
    let date = DateTime::from_timestamp(entry.dt + timezone_offset, 0)
        .map(|moment| moment.date_naive())
        .ok_or_else(|| GatewayError::upstream("openweather returned an invalid timestamp"))?;

    Ok(DailyForecast {
        date,
        description: first_description(entry.weather)?,
        temperature: entry.temp.day,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, GatewayError> {
        let matches: Vec<GeocodeMatch> = self
            .get_json(
                "geo/1.0/direct",
                &[("q", city.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        Ok(matches.into_iter().next().map(|found| Coordinates {
            lat: found.lat,
            lon: found.lon,
        }))
    }

    async fn current(
        &self,
        at: Coordinates,
        units: &str,
    ) -> Result<CurrentConditions, GatewayError> {
        let current: CurrentResponse = self
            .get_json(
                "data/2.5/weather",
                &[
                    ("lat", at.lat.to_string()),
                    ("lon", at.lon.to_string()),
                    ("units", units.to_string()),
                ],
            )
            .await?;

        Ok(CurrentConditions {
            description: first_description(current.weather)?,
            temperature: current.main.temp,
        })
    }

    async fn daily_forecast(
        &self,
        at: Coordinates,
        units: &str,
    ) -> Result<Vec<DailyForecast>, GatewayError> {
        let forecast: OneCallResponse = self
            .get_json(
                "data/3.0/onecall",
                &[
                    ("lat", at.lat.to_string()),
                    ("lon", at.lon.to_string()),
                    ("units", units.to_string()),
                    ("exclude", "current,minutely,hourly,alerts".to_string()),
                ],
            )
            .await?;

        let offset = forecast.timezone_offset;
        forecast
            .daily
            .into_iter()
            .map(|entry| into_daily_forecast(entry, offset))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    use super::*;
    use crate::test_support::spawn_stub;

    fn client(base_url: String) -> OpenWeatherClient {
        OpenWeatherClient::new(reqwest::Client::new(), base_url, "ow-key")
    }

    fn stub() -> Router {
        Router::new()
            .route(
                "/geo/1.0/direct",
                get(|Query(query): Query<HashMap<String, String>>| async move {
                    assert_eq!(query.get("appid").map(String::as_str), Some("ow-key"));
                    match query.get("q").map(String::as_str) {
                        Some("Paris") => Json(json!([{"name": "Paris", "lat": 48.85, "lon": 2.35}])),
                        _ => Json(json!([])),
                    }
                }),
            )
            .route(
                "/data/2.5/weather",
                get(|Query(query): Query<HashMap<String, String>>| async move {
                    assert_eq!(query.get("units").map(String::as_str), Some("metric"));
                    Json(json!({
                        "weather": [{"main": "Clear", "description": "clear sky"}],
                        "main": {"temp": 18.5}
                    }))
                }),
            )
            .route(
                "/data/3.0/onecall",
                get(|| async {
                    Json(json!({
                        "timezone_offset": 7200,
                        "daily": [
                            {"dt": 1_767_268_800_i64 - 7200 + 3600, "temp": {"day": 7.0}, "weather": [{"description": "light rain"}]},
                            {"dt": 1_767_355_200_i64, "temp": {"day": 9.5}, "weather": [{"description": "few clouds"}]}
                        ]
                    }))
                }),
            )
    }

    #[tokio::test]
    async fn geocode_returns_first_match_or_none() {
        let client = client(spawn_stub(stub()).await);

        let found = client.geocode("Paris").await.expect("geocode");
        assert_eq!(found, Some(Coordinates { lat: 48.85, lon: 2.35 }));

        let missing = client.geocode("Atlantis").await.expect("geocode");
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn current_maps_description_and_temperature() {
        let client = client(spawn_stub(stub()).await);

        let current = client
            .current(Coordinates { lat: 48.85, lon: 2.35 }, "metric")
            .await
            .expect("current conditions");
        assert_eq!(current.description, "clear sky");
        assert_eq!(current.temperature, 18.5);
    }

    #[tokio::test]
    async fn daily_forecast_uses_city_local_dates() {
        let client = client(spawn_stub(stub()).await);

        let days = client
            .daily_forecast(Coordinates { lat: 0.0, lon: 0.0 }, "metric")
            .await
            .expect("forecast");
        assert_eq!(days.len(), 2);
        // 2026-01-01T11:00:00Z shifted by +02:00.
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 1, 1).expect("date"));
        assert_eq!(days[0].description, "light rain");
        assert_eq!(days[1].temperature, 9.5);
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let router = Router::new().route(
            "/geo/1.0/direct",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(Value::Null)) }),
        );
        let client = client(spawn_stub(router).await);

        let err = client.geocode("Paris").await.expect_err("401 must fail");
        assert!(matches!(err, GatewayError::Upstream(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_upstream_error() {
        let router = Router::new().route(
            "/data/2.5/weather",
            get(|| async { Json(json!({"weather": [], "main": {"temp": 1.0}})) }),
        );
        let client = client(spawn_stub(router).await);

        let err = client
            .current(Coordinates { lat: 0.0, lon: 0.0 }, "metric")
            .await
            .expect_err("missing summary must fail");
        assert!(matches!(err, GatewayError::Upstream(_)));
    }
}
