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

use crate::aqi::{self, CompositeAqi};
use crate::client::{ClientError, CurrentAirQuality, CurrentWeather, OpenMeteoClient};
use crate::compass::{CompassError, WindFormat};
use crate::record::WeatherRecord;
use chrono::NaiveDateTime;
use std::error;
use std::fmt;
use tracing::Instrument;

#[derive(Debug)]
pub enum CollectError {
    Client(ClientError),
    Compass(CompassError),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(e) => write!(f, "{}", e),
            Self::Compass(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for CollectError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Client(e) => Some(e),
            Self::Compass(e) => Some(e),
        }
    }
}

impl From<ClientError> for CollectError {
    fn from(e: ClientError) -> Self {
        CollectError::Client(e)
    }
}

impl From<CompassError> for CollectError {
    fn from(e: CompassError) -> Self {
        CollectError::Compass(e)
    }
}

/// Options that stay fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    pub wind_format: WindFormat,
    pub air_quality: bool,
}

/// Fetch current conditions and build a record for `timestamp`.
///
/// Weather and air quality are requested concurrently. Failure of either request
/// fails the whole collection.
pub async fn collect(
    client: &OpenMeteoClient,
    opts: CollectOptions,
    timestamp: NaiveDateTime,
) -> Result<WeatherRecord, CollectError> {
    let (weather, air_quality) = if opts.air_quality {
        let (weather, air_quality) = tokio::try_join!(
            client.weather().instrument(tracing::debug_span!("wx_weather")),
            client.air_quality().instrument(tracing::debug_span!("wx_air_quality")),
        )?;
        tracing::info!(message = "fetched weather and air quality data");
        (weather.current, Some(air_quality.current))
    } else {
        let weather = client
            .weather()
            .instrument(tracing::debug_span!("wx_weather"))
            .await?;
        tracing::info!(message = "fetched weather data");
        (weather.current, None)
    };

    build_record(timestamp, &weather, air_quality.as_ref(), opts.wind_format)
}

/// Assemble a record from already fetched conditions.
pub fn build_record(
    timestamp: NaiveDateTime,
    weather: &CurrentWeather,
    air_quality: Option<&CurrentAirQuality>,
    wind_format: WindFormat,
) -> Result<WeatherRecord, CollectError> {
    let aqi = air_quality.map(|aq| {
        let readings = aq.readings();
        for reading in readings.iter() {
            if let (Some(ugm3), Some(index)) = (reading.concentration, reading.sub_index()) {
                tracing::trace!(
                    message = "computed pollutant sub-index",
                    pollutant = %reading.pollutant,
                    ugm3 = ugm3,
                    converted = reading.pollutant.to_table_units(ugm3),
                    unit = reading.pollutant.table_unit(),
                    index = index,
                );
            }
        }

        let res: CompositeAqi = aqi::composite(&readings);
        tracing::debug!(
            message = "computed air quality index",
            present = readings.iter().filter(|r| r.present()).count(),
            index = res.index,
            category = %res.category,
        );
        res
    });

    Ok(WeatherRecord::new(timestamp, weather, aqi, wind_format)?)
}

#[cfg(test)]
mod tests {
    use super::{build_record, collect, CollectError, CollectOptions};
    use crate::aqi::Category;
    use crate::client::{ClientError, CurrentAirQuality, CurrentWeather, Location, OpenMeteoClient};
    use crate::compass::WindFormat;
    use crate::dataset::Cell;
    use chrono::NaiveDate;
    use reqwest::{Client, StatusCode, Url};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const FORECAST: &str = r#"{"latitude": 35.0, "longitude": 138.4, "current": {
        "time": "2025-06-08T07:30", "temperature_2m": 18.2, "relative_humidity_2m": 80,
        "apparent_temperature": 17.0, "precipitation": 1.2, "cloud_cover": 75,
        "surface_pressure": 1011.0, "wind_speed_10m": 18.0, "wind_direction_10m": 90}}"#;
    const AIR_QUALITY: &str = r#"{"latitude": 35.0, "longitude": 138.4, "current": {
        "pm2_5": 10.0, "pm10": 40.0, "carbon_monoxide": 200.0, "nitrogen_dioxide": 20.0,
        "sulphur_dioxide": 10.0, "ozone": 60.0}}"#;

    /// Serve a fixed status and body for each API on a local port, returning its base URL.
    async fn serve(forecast: (u16, &'static str), air_quality: (u16, &'static str)) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let (status, body) = if buf.starts_with(b"GET /v1/forecast") {
                    forecast
                } else {
                    air_quality
                };

                let res = format!(
                    "HTTP/1.1 {} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(res.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    fn client(base: Url) -> OpenMeteoClient {
        OpenMeteoClient::new(
            Client::new(),
            base.clone(),
            base,
            Location {
                latitude: 34.975,
                longitude: 138.4088016,
                timezone: "Asia/Tokyo".to_owned(),
                model: "jma_seamless".to_owned(),
            },
        )
    }

    fn weather(direction: f64) -> CurrentWeather {
        CurrentWeather {
            time: "2025-06-08T14:15".to_owned(),
            temperature: 18.2,
            apparent_temperature: 17.0,
            relative_humidity: 80.0,
            surface_pressure: 1011.0,
            wind_speed: 18.0,
            wind_direction: direction,
            cloud_cover: 75.0,
            precipitation: 1.2,
        }
    }

    fn timestamp() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 8)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_build_record_with_air_quality() {
        let aq = CurrentAirQuality {
            pm2_5: Some(10.0),
            pm10: Some(40.0),
            carbon_monoxide: Some(200.0),
            nitrogen_dioxide: Some(20.0),
            sulphur_dioxide: Some(10.0),
            ozone: Some(60.0),
        };

        let record = build_record(timestamp(), &weather(45.0), Some(&aq), WindFormat::Compass).unwrap();
        let aqi = record.aqi.unwrap();

        assert_eq!(42, aqi.index);
        assert_eq!(Category::Good, aqi.category);
        assert_eq!(5.0, record.wind_speed);
    }

    #[test]
    fn test_build_record_all_absent() {
        let record = build_record(
            timestamp(),
            &weather(45.0),
            Some(&CurrentAirQuality::default()),
            WindFormat::Degrees,
        )
        .unwrap();

        assert_eq!(0, record.aqi.unwrap().index);
        assert_eq!(11, record.columns().len());
    }

    #[test]
    fn test_build_record_skip_air_quality() {
        let record = build_record(timestamp(), &weather(45.0), None, WindFormat::Compass).unwrap();
        assert!(record.aqi.is_none());
    }

    #[test]
    fn test_build_record_bad_direction() {
        let res = build_record(timestamp(), &weather(361.0), None, WindFormat::Compass);
        assert!(matches!(res, Err(CollectError::Compass(_))));
    }

    #[tokio::test]
    async fn test_collect_weather_and_air_quality() {
        let base = serve((200, FORECAST), (200, AIR_QUALITY)).await;
        let opts = CollectOptions {
            wind_format: WindFormat::Compass,
            air_quality: true,
        };

        let record = collect(&client(base), opts, timestamp()).await.unwrap();
        let cells = record.cells();

        assert_eq!(42, record.aqi.unwrap().index);
        assert_eq!(11, cells.len());
        assert_eq!(Cell::Text("E".to_owned()), cells[7]);
    }

    #[tokio::test]
    async fn test_collect_skip_air_quality() {
        let base = serve((200, FORECAST), (503, "")).await;
        let opts = CollectOptions {
            wind_format: WindFormat::Compass,
            air_quality: false,
        };

        let record = collect(&client(base), opts, timestamp()).await.unwrap();

        assert!(record.aqi.is_none());
        assert_eq!(10, record.cells().len());
    }

    #[tokio::test]
    async fn test_collect_air_quality_failure() {
        let base = serve((200, FORECAST), (503, "")).await;
        let opts = CollectOptions {
            wind_format: WindFormat::Compass,
            air_quality: true,
        };

        match collect(&client(base), opts, timestamp()).await {
            Err(CollectError::Client(ClientError::Unexpected(status, url))) => {
                assert_eq!(StatusCode::SERVICE_UNAVAILABLE, status);
                assert_eq!("/v1/air-quality", url.path());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_collect_weather_failure() {
        let base = serve((500, ""), (200, AIR_QUALITY)).await;
        let opts = CollectOptions {
            wind_format: WindFormat::Degrees,
            air_quality: true,
        };

        match collect(&client(base), opts, timestamp()).await {
            Err(CollectError::Client(ClientError::Unexpected(status, url))) => {
                assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
                assert_eq!("/v1/forecast", url.path());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
