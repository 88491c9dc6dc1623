//! Lookup handlers exposed through the route table
//!
//! Each handler formats provider data into the plain text returned to the
//! caller. "Nothing found" outcomes are ordinary text results; only transport
//! and provider failures surface as errors.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::registry::{HandlerRegistry, ParamKind, ParamSpec, ToolArgs, ToolHandler};
use crate::domain::utils::{
    capitalize, city_not_found, format_conditions, positive_count, unit_symbol, DEFAULT_UNITS,
    FORECAST_DAYS_ERROR, MAX_FORECAST_DAYS, MIN_FORECAST_DAYS, NO_FORECAST_DATA, NO_HEADLINES,
    NO_SEARCH_RESULTS,
};
use crate::errors::GatewayError;
use crate::upstream::{NewsProvider, SearchProvider, WeatherProvider};

const CURRENT_WEATHER_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("city", ParamKind::Text),
    ParamSpec::optional("units", ParamKind::Text, Some(DEFAULT_UNITS)),
];

const FORECAST_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("city", ParamKind::Text),
    ParamSpec::required("days", ParamKind::Integer),
    ParamSpec::optional("units", ParamKind::Text, Some(DEFAULT_UNITS)),
];

const HEADLINES_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("category", ParamKind::Text),
    ParamSpec::optional("country", ParamKind::Text, None),
    ParamSpec::optional("limit", ParamKind::Integer, Some("5")),
];

const SEARCH_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("query", ParamKind::Text),
    ParamSpec::optional("numResults", ParamKind::Integer, Some("5")),
];

/// Builds the fixed route table served by the gateway.
pub fn standard_registry(
    weather: Arc<dyn WeatherProvider>,
    news: Arc<dyn NewsProvider>,
    search: Arc<dyn SearchProvider>,
) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register(
            "weather",
            "current",
            Arc::new(CurrentWeatherTool {
                provider: weather.clone(),
            }),
        )
        .register(
            "weather",
            "forecast",
            Arc::new(ForecastTool { provider: weather }),
        )
        .register("news", "headlines", Arc::new(HeadlinesTool { provider: news }))
        .register("news", "search", Arc::new(WebSearchTool { provider: search }));
    registry
}

pub struct CurrentWeatherTool {
    pub provider: Arc<dyn WeatherProvider>,
}

#[async_trait]
impl ToolHandler for CurrentWeatherTool {
    fn params(&self) -> &'static [ParamSpec] {
        CURRENT_WEATHER_PARAMS
    }

    async fn call(&self, args: ToolArgs) -> Result<String, GatewayError> {
        let city = args.require_text("city")?;
        let units = args.require_text("units")?;

        let Some(coordinates) = self.provider.geocode(city).await? else {
            return Ok(city_not_found(city));
        };

        let current = self.provider.current(coordinates, units).await?;
        Ok(format_conditions(&current.description, current.temperature, units))
    }
}

pub struct ForecastTool {
    pub provider: Arc<dyn WeatherProvider>,
}

#[async_trait]
impl ToolHandler for ForecastTool {
    fn params(&self) -> &'static [ParamSpec] {
        FORECAST_PARAMS
    }

    async fn call(&self, args: ToolArgs) -> Result<String, GatewayError> {
        let city = args.require_text("city")?;
        let days = args.require_integer("days")?;
        let units = args.require_text("units")?;

        if !(MIN_FORECAST_DAYS..=MAX_FORECAST_DAYS).contains(&days) {
            return Ok(FORECAST_DAYS_ERROR.to_string());
        }

        let Some(coordinates) = self.provider.geocode(city).await? else {
            return Ok(city_not_found(city));
        };

        let symbol = unit_symbol(units);
        let lines = self
            .provider
            .daily_forecast(coordinates, units)
            .await?
            .into_iter()
            .take(usize::try_from(days).unwrap_or_default())
            .map(|day| {
                format!(
                    "{}: {}, {}°{symbol}",
                    day.date.format("%Y-%m-%d"),
                    capitalize(&day.description),
                    day.temperature
                )
            })
            .collect::<Vec<_>>();

        if lines.is_empty() {
            return Ok(NO_FORECAST_DATA.to_string());
        }
        Ok(lines.join("\n"))
    }
}

pub struct HeadlinesTool {
    pub provider: Arc<dyn NewsProvider>,
}

#[async_trait]
impl ToolHandler for HeadlinesTool {
    fn params(&self) -> &'static [ParamSpec] {
        HEADLINES_PARAMS
    }

    async fn call(&self, args: ToolArgs) -> Result<String, GatewayError> {
        let category = args.require_text("category")?;
        let country = args.text("country");
        let limit = positive_count("limit", args.require_integer("limit")?)?;

        let articles = self
            .provider
            .top_headlines(category, country, limit)
            .await?;
        if articles.is_empty() {
            return Ok(NO_HEADLINES.to_string());
        }

        Ok(articles
            .iter()
            .take(limit as usize)
            .map(|article| format!("- {} ({})", article.title, article.url))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

pub struct WebSearchTool {
    pub provider: Arc<dyn SearchProvider>,
}

#[async_trait]
impl ToolHandler for WebSearchTool {
    fn params(&self) -> &'static [ParamSpec] {
        SEARCH_PARAMS
    }

    async fn call(&self, args: ToolArgs) -> Result<String, GatewayError> {
        let query = args.require_text("query")?;
        let count = positive_count("numResults", args.require_integer("numResults")?)?;

        let hits = self.provider.search(query, count).await?;
        if hits.is_empty() {
            return Ok(NO_SEARCH_RESULTS.to_string());
        }

        Ok(hits
            .iter()
            .take(count as usize)
            .enumerate()
            .map(|(index, hit)| {
                let mut block = format!("{}. {}\n   {}", index + 1, hit.title, hit.url);
                if let Some(snippet) = &hit.snippet {
                    block.push_str("\n   ");
                    block.push_str(snippet);
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
