//! Column layout of the weather payload and of the model input.
//!
//! Every list the preprocessor depends on lives here, so a schema change is a
//! one-place edit.

/// Positional index left over from the CSV export the model was trained on.
pub const INDEX_COLUMN: &str = "Unnamed: 0";

/// Observation timestamp, e.g. `2015-01-01 03:00:00`.
pub const TIMESTAMP_COLUMN: &str = "time";

/// Training target. Must be present in the payload but never reaches the model.
pub const TARGET_COLUMN: &str = "load_shortfall_3h";

pub const MONTH_COLUMN: &str = "month";
pub const DAY_COLUMN: &str = "day";

/// Payload keys, in the order they are selected.
pub const RAW_COLUMNS: [&str; 49] = [
    INDEX_COLUMN,
    TIMESTAMP_COLUMN,
    "Madrid_wind_speed",
    "Valencia_wind_deg",
    "Bilbao_rain_1h",
    "Valencia_wind_speed",
    "Seville_humidity",
    "Madrid_humidity",
    "Bilbao_clouds_all",
    "Bilbao_wind_speed",
    "Seville_clouds_all",
    "Bilbao_wind_deg",
    "Barcelona_wind_speed",
    "Barcelona_wind_deg",
    "Madrid_clouds_all",
    "Seville_wind_speed",
    "Barcelona_rain_1h",
    "Seville_pressure",
    "Seville_rain_1h",
    "Bilbao_snow_3h",
    "Barcelona_pressure",
    "Seville_rain_3h",
    "Madrid_rain_1h",
    "Barcelona_rain_3h",
    "Valencia_snow_3h",
    "Madrid_weather_id",
    "Barcelona_weather_id",
    "Bilbao_pressure",
    "Seville_weather_id",
    "Valencia_pressure",
    "Seville_temp_max",
    "Madrid_pressure",
    "Valencia_temp_max",
    "Valencia_temp",
    "Bilbao_weather_id",
    "Seville_temp",
    "Valencia_humidity",
    "Valencia_temp_min",
    "Barcelona_temp_max",
    "Madrid_temp_max",
    "Barcelona_temp",
    "Bilbao_temp_min",
    "Bilbao_temp",
    "Barcelona_temp_min",
    "Bilbao_temp_max",
    "Seville_temp_min",
    "Madrid_temp",
    "Madrid_temp_min",
    TARGET_COLUMN,
];

/// Columns whose nulls are replaced by the column mean.
pub const MEAN_FILL_COLUMNS: [&str; 1] = ["Valencia_pressure"];

/// Columns dropped by name.
pub const EXPLICIT_DROPS: [&str; 9] = [
    "Bilbao_rain_1h",
    "Bilbao_wind_deg",
    "Barcelona_pressure",
    "Barcelona_wind_deg",
    "Barcelona_rain_1h",
    "Seville_rain_1h",
    "Bilbao_pressure",
    "Madrid_pressure",
    "Valencia_pressure",
];

/// Any column whose name contains one of these is dropped.
pub const DROP_SUBSTRINGS: [&str; 3] = ["max", "min", "1h"];

/// Surviving columns matching these are replaced by category codes.
pub const CATEGORICAL_SUBSTRINGS: [&str; 2] = ["pressure", "deg"];

/// Calendar columns that lead the final layout.
pub const CALENDAR_COLUMNS: [&str; 3] = [TIMESTAMP_COLUMN, MONTH_COLUMN, DAY_COLUMN];

/// Weather columns kept for the model.
pub const FEATURE_SUBSTRINGS: [&str; 6] = [
    "wind",
    "pressure",
    "cloud",
    "humidity",
    "Seville_weather",
    "Madrid_temp",
];

/// Model input columns, in order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    MONTH_COLUMN,
    DAY_COLUMN,
    "Madrid_wind_speed",
    "Valencia_wind_deg",
    "Valencia_wind_speed",
    "Seville_humidity",
    "Madrid_humidity",
    "Bilbao_clouds_all",
    "Bilbao_wind_speed",
    "Seville_clouds_all",
    "Barcelona_wind_speed",
    "Madrid_clouds_all",
    "Seville_wind_speed",
    "Seville_pressure",
    "Seville_weather_id",
    "Valencia_humidity",
    "Madrid_temp",
];

/// Width of the table handed to the estimator.
pub const FEATURE_COUNT: usize = 17;

/// True when `name` contains any of `needles`.
pub fn contains_any(name: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| name.contains(n))
}
