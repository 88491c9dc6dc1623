//! Shared formatting and validation helpers for the lookup handlers

use crate::errors::GatewayError;

pub const DEFAULT_UNITS: &str = "metric";
pub const MIN_FORECAST_DAYS: i64 = 2;
pub const MAX_FORECAST_DAYS: i64 = 8;
pub const FORECAST_DAYS_ERROR: &str = "Error: 'days' parameter must be between 2 and 8.";
pub const NO_FORECAST_DATA: &str = "No forecast data available.";
pub const NO_HEADLINES: &str = "No headlines found.";
pub const NO_SEARCH_RESULTS: &str = "No results found.";

pub fn city_not_found(city: &str) -> String {
    format!("City '{city}' not found")
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn unit_symbol(units: &str) -> char {
    if units.eq_ignore_ascii_case(DEFAULT_UNITS) {
        'C'
    } else {
        'F'
    }
}

pub fn format_conditions(description: &str, temperature: f64, units: &str) -> String {
    format!(
        "{}, {}°{}",
        capitalize(description),
        temperature,
        unit_symbol(units)
    )
}

pub fn positive_count(name: &str, value: i64) -> Result<u32, GatewayError> {
    u32::try_from(value)
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| GatewayError::invalid_argument(name, format!("'{name}' must be a positive integer")))
}
