// wx_recorder - Record current weather and air quality from open-meteo.com
//
// Copyright 2025 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::aqi::CompositeAqi;
use crate::client::CurrentWeather;
use crate::compass::{CompassError, WindDirection, WindFormat};
use crate::dataset::Cell;
use chrono::NaiveDateTime;

const COLUMNS: [&str; 11] = [
    "date",
    "time",
    "temp",
    "feels_like",
    "humidity",
    "pressure",
    "wind_speed",
    "wind_dir",
    "cloud_cover",
    "precipitation",
    "aqi",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// One row of the dataset: the conditions observed at a single point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub timestamp: NaiveDateTime,
    /// Degrees celsius
    pub temperature: f64,
    /// Degrees celsius
    pub feels_like: f64,
    /// Percent (0-100)
    pub humidity: f64,
    /// hPa
    pub pressure: f64,
    /// Meters per second
    pub wind_speed: f64,
    pub wind_direction: WindDirection,
    /// Percent (0-100)
    pub cloud_cover: f64,
    /// mm
    pub precipitation: f64,
    /// Only the index is persisted, the category is for logging.
    pub aqi: Option<CompositeAqi>,
}

impl WeatherRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        weather: &CurrentWeather,
        aqi: Option<CompositeAqi>,
        wind_format: WindFormat,
    ) -> Result<Self, CompassError> {
        Ok(WeatherRecord {
            timestamp,
            temperature: weather.temperature,
            feels_like: weather.apparent_temperature,
            humidity: weather.relative_humidity,
            pressure: weather.surface_pressure,
            wind_speed: kph_to_mps(weather.wind_speed),
            wind_direction: wind_format.format(weather.wind_direction)?,
            cloud_cover: weather.cloud_cover,
            precipitation: weather.precipitation,
            aqi,
        })
    }

    pub fn date(&self) -> String {
        self.timestamp.format(DATE_FORMAT).to_string()
    }

    pub fn time(&self) -> String {
        self.timestamp.format(TIME_FORMAT).to_string()
    }

    /// Header row for this record. The `aqi` column is only present when air quality was collected.
    pub fn columns(&self) -> Vec<&'static str> {
        let len = if self.aqi.is_some() { COLUMNS.len() } else { COLUMNS.len() - 1 };
        COLUMNS[..len].to_vec()
    }

    /// Values for this record in the same order as `columns()`.
    pub fn cells(&self) -> Vec<Cell> {
        let wind_direction = match self.wind_direction {
            WindDirection::Degrees(d) => Cell::Number(d),
            WindDirection::Compass(p) => Cell::Text(p.as_str().to_owned()),
        };

        let mut cells = vec![
            Cell::Text(self.date()),
            Cell::Text(self.time()),
            Cell::Number(self.temperature),
            Cell::Number(self.feels_like),
            Cell::Number(self.humidity),
            Cell::Number(self.pressure),
            Cell::Number(self.wind_speed),
            wind_direction,
            Cell::Number(self.cloud_cover),
            Cell::Number(self.precipitation),
        ];

        if let Some(aqi) = self.aqi {
            cells.push(Cell::Number(f64::from(aqi.index)));
        }

        cells
    }
}

/// Convert km/h to m/s, rounded to two decimal places.
fn kph_to_mps(kph: f64) -> f64 {
    (kph / 3.6 * 100.0).round() / 100.0
}
