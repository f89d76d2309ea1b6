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

use clap::Parser;
use reqwest::{Client, Url};
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::Level;
use wx_recorder::client::{Location, OpenMeteoClient};
use wx_recorder::collect::{self, CollectOptions};
use wx_recorder::compass::WindFormat;
use wx_recorder::dataset::{Dataset, XlsxDataset};

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_TIMEOUT_MILLIS: u64 = 5000;
const DEFAULT_LATITUDE: f64 = 34.975;
const DEFAULT_LONGITUDE: f64 = 138.4088016;
const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
const DEFAULT_WEATHER_MODEL: &str = "jma_seamless";
const DEFAULT_OUTPUT: &str = "shizuoka_wx_data.xlsx";
const DEFAULT_WEATHER_API_URL: &str = "https://api.open-meteo.com/";
const DEFAULT_AIR_QUALITY_API_URL: &str = "https://air-quality-api.open-meteo.com/";

#[derive(Debug, Parser)]
#[clap(name = "wx_recorder", version = clap::crate_version!())]
struct WxRecorderApplication {
    /// Latitude of the location to record conditions for
    #[clap(long, allow_hyphen_values = true, default_value_t = DEFAULT_LATITUDE)]
    latitude: f64,

    /// Longitude of the location to record conditions for
    #[clap(long, allow_hyphen_values = true, default_value_t = DEFAULT_LONGITUDE)]
    longitude: f64,

    /// Timezone name used by the forecast API, e.g. 'Asia/Tokyo' or 'America/New_York'
    #[clap(long, default_value_t = DEFAULT_TIMEZONE.into())]
    timezone: String,

    /// open-meteo weather model to use for current conditions
    #[clap(long, default_value_t = DEFAULT_WEATHER_MODEL.into())]
    weather_model: String,

    /// Spreadsheet (.xlsx) to append records to. Created with a header row if it doesn't exist.
    #[clap(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Record wind direction as compass points or degrees
    #[clap(long, value_enum, default_value_t = WindFormat::Compass)]
    wind_format: WindFormat,

    /// Don't fetch air quality data or record an AQI column
    #[clap(long)]
    skip_air_quality: bool,

    /// Base URL for the open-meteo forecast API
    #[clap(long, default_value = DEFAULT_WEATHER_API_URL)]
    weather_api_url: Url,

    /// Base URL for the open-meteo air quality API
    #[clap(long, default_value = DEFAULT_AIR_QUALITY_API_URL)]
    air_quality_api_url: Url,

    /// Timeout for each request to the open-meteo APIs, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    timeout_millis: u64,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let opts = WxRecorderApplication::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(opts.log_level)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    let timeout = Duration::from_millis(opts.timeout_millis);
    let http_client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::error!(message = "unable to initialize HTTP client", error = %e);
        process::exit(1)
    });

    let location = Location {
        latitude: opts.latitude,
        longitude: opts.longitude,
        timezone: opts.timezone.clone(),
        model: opts.weather_model.clone(),
    };

    let client = OpenMeteoClient::new(
        http_client,
        opts.weather_api_url.clone(),
        opts.air_quality_api_url.clone(),
        location,
    );

    let collect_opts = CollectOptions {
        wind_format: opts.wind_format,
        air_quality: !opts.skip_air_quality,
    };

    tracing::debug!(
        message = "collecting current conditions",
        latitude = opts.latitude,
        longitude = opts.longitude,
        output = %opts.output.display(),
    );

    let now = chrono::Local::now().naive_local();
    let record = collect::collect(&client, collect_opts, now).await.unwrap_or_else(|e| {
        tracing::error!(message = "failed to retrieve weather and air quality data", error = %e);
        process::exit(1)
    });

    let mut dataset = XlsxDataset::new(&opts.output);
    let rows = dataset.append(&record).unwrap_or_else(|e| {
        tracing::error!(message = "failed to save record", path = %opts.output.display(), error = %e);
        process::exit(1)
    });

    match record.aqi {
        Some(aqi) => tracing::info!(
            message = "record saved",
            date = %record.date(),
            time = %record.time(),
            aqi = aqi.index,
            category = %aqi.category,
            path = %dataset.path().display(),
            rows = rows,
        ),
        None => tracing::info!(
            message = "record saved",
            date = %record.date(),
            time = %record.time(),
            path = %dataset.path().display(),
            rows = rows,
        ),
    }

    Ok(())
}
