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

//! Record current weather and air quality from open-meteo.com
//!
//! ## Features
//!
//! `wx_recorder` fetches current conditions for a single location using the [open-meteo] forecast
//! and air quality APIs, computes a US EPA [Air Quality Index] from the reported pollutant
//! concentrations, and appends one row to an `.xlsx` spreadsheet. Each run records a single
//! row and exits, it is meant to be run on a schedule (cron, a Systemd timer, etc.).
//!
//! Each row contains the following columns.
//!
//! * `date` - Local date the row was recorded, `YYYY-MM-DD`.
//! * `time` - Local time the row was recorded, `HH:MM:SS`.
//! * `temp` - Temperature, in degrees celsius.
//! * `feels_like` - Apparent temperature, in degrees celsius.
//! * `humidity` - Relative humidity (0-100).
//! * `pressure` - Surface pressure, in hPa.
//! * `wind_speed` - Wind speed at 10m, in meters per second.
//! * `wind_dir` - Wind direction at 10m, as a compass point (`N`, `NNE`, ...) or degrees.
//! * `cloud_cover` - Cloud cover (0-100).
//! * `precipitation` - Precipitation, in mm.
//! * `aqi` - US EPA Air Quality Index computed from PM2.5, PM10, CO, NO2, SO2, and ozone.
//!   Omitted when run with `--skip-air-quality`.
//!
//! [open-meteo]: https://open-meteo.com/en/docs
//! [Air Quality Index]: https://www.airnow.gov/aqi/aqi-basics/
//!
//! ## Build
//!
//! `wx_recorder` is a Rust program and must be built from source using a [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! git clone git@github.com:56quarters/wx_recorder.git && cd wx_recorder
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! The defaults record conditions for Shizuoka, Japan using the JMA weather model. Pick a location
//! and model for yourself from the [open-meteo] docs.
//!
//! ```text
//! ./wx_recorder --latitude 42.36 --longitude -71.06 --timezone America/New_York \
//!     --weather-model best_match --output boston_wx_data.xlsx
//! ```
//!
//! To record wind direction in degrees instead of compass points, use `--wind-format degrees`.
//!
//! ### Schedule
//!
//! Run it every hour from cron, for example.
//!
//! ```text
//! 0 * * * * /usr/local/bin/wx_recorder --output /var/lib/wx/wx_data.xlsx
//! ```
//!
//! Only a single instance should write to an output file at a time.

pub mod aqi;
pub mod client;
pub mod collect;
pub mod compass;
pub mod dataset;
pub mod record;
