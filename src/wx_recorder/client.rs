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

use crate::aqi::{Pollutant, PollutantReading};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::error;
use std::fmt;

const WEATHER_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,precipitation,\
weather_code,cloud_cover,surface_pressure,wind_speed_10m,wind_direction_10m";
const AIR_QUALITY_FIELDS: &str = "pm2_5,carbon_monoxide,nitrogen_dioxide,sulphur_dioxide,ozone,pm10";

#[derive(Debug)]
pub enum ClientError {
    Internal(reqwest::Error),
    InvalidUrl(Url),
    Unexpected(StatusCode, Url),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(e) => write!(f, "{}", e),
            Self::InvalidUrl(url) => write!(f, "cannot use {} as a base URL", url),
            Self::Unexpected(status, url) => write!(f, "unexpected status {} for {}", status, url),
        }
    }
}

impl error::Error for ClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Internal(e) => Some(e),
            _ => None,
        }
    }
}

/// Where to fetch conditions for.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name used for timestamps in forecast responses, e.g. `Asia/Tokyo`
    pub timezone: String,
    /// open-meteo weather model, e.g. `jma_seamless`
    pub model: String,
}

#[derive(Debug)]
pub struct OpenMeteoClient {
    client: Client,
    weather_url: Url,
    air_quality_url: Url,
    location: Location,
}

impl OpenMeteoClient {
    const USER_AGENT: &'static str = "wx_recorder (https://github.com/56quarters/wx_recorder)";
    const JSON_RESPONSE: &'static str = "application/json";

    pub fn new(client: Client, weather_url: Url, air_quality_url: Url, location: Location) -> Self {
        OpenMeteoClient {
            client,
            weather_url,
            air_quality_url,
            location,
        }
    }

    pub async fn weather(&self) -> Result<ForecastResponse, ClientError> {
        let request_url = self.forecast_url()?;
        tracing::debug!(message = "making current weather request", url = %request_url);

        let res = self.make_request(request_url).await?;
        res.json::<ForecastResponse>().await.map_err(ClientError::Internal)
    }

    pub async fn air_quality(&self) -> Result<AirQualityResponse, ClientError> {
        let request_url = self.air_quality_url()?;
        tracing::debug!(message = "making current air quality request", url = %request_url);

        let res = self.make_request(request_url).await?;
        res.json::<AirQualityResponse>().await.map_err(ClientError::Internal)
    }

    async fn make_request(&self, url: Url) -> Result<Response, ClientError> {
        let res = self
            .client
            .get(url.clone())
            .header(USER_AGENT, Self::USER_AGENT)
            .header(ACCEPT, Self::JSON_RESPONSE)
            .send()
            .await
            .map_err(ClientError::Internal)?;

        let status = res.status();
        if status == StatusCode::OK {
            Ok(res)
        } else {
            Err(ClientError::Unexpected(status, url))
        }
    }

    fn forecast_url(&self) -> Result<Url, ClientError> {
        let mut url = Self::endpoint(&self.weather_url, "forecast")?;
        url.query_pairs_mut()
            .append_pair("latitude", &self.location.latitude.to_string())
            .append_pair("longitude", &self.location.longitude.to_string())
            .append_pair("current", WEATHER_FIELDS)
            .append_pair("timezone", &self.location.timezone)
            .append_pair("models", &self.location.model);

        Ok(url)
    }

    fn air_quality_url(&self) -> Result<Url, ClientError> {
        let mut url = Self::endpoint(&self.air_quality_url, "air-quality")?;
        url.query_pairs_mut()
            .append_pair("latitude", &self.location.latitude.to_string())
            .append_pair("longitude", &self.location.longitude.to_string())
            .append_pair("current", AIR_QUALITY_FIELDS);

        Ok(url)
    }

    fn endpoint(base: &Url, name: &str) -> Result<Url, ClientError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map(|mut p| {
                p.clear().push("v1").push(name);
            })
            .map_err(|_| ClientError::InvalidUrl(base.clone()))?;

        Ok(url)
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ForecastResponse {
    #[serde(alias = "latitude")]
    pub latitude: f64,
    #[serde(alias = "longitude")]
    pub longitude: f64,
    #[serde(alias = "timezone")]
    pub timezone: Option<String>,
    #[serde(alias = "current")]
    pub current: CurrentWeather,
}

/// Current conditions. All fields are required: a response missing any of them fails to decode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    #[serde(alias = "time")]
    pub time: String,
    /// Degrees celsius
    #[serde(alias = "temperature_2m")]
    pub temperature: f64,
    /// Degrees celsius
    #[serde(alias = "apparent_temperature")]
    pub apparent_temperature: f64,
    /// Percent (0-100)
    #[serde(alias = "relative_humidity_2m")]
    pub relative_humidity: f64,
    /// hPa
    #[serde(alias = "surface_pressure")]
    pub surface_pressure: f64,
    /// km/h
    #[serde(alias = "wind_speed_10m")]
    pub wind_speed: f64,
    /// Degrees
    #[serde(alias = "wind_direction_10m")]
    pub wind_direction: f64,
    /// Percent (0-100)
    #[serde(alias = "cloud_cover")]
    pub cloud_cover: f64,
    /// mm
    #[serde(alias = "precipitation")]
    pub precipitation: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AirQualityResponse {
    #[serde(alias = "latitude")]
    pub latitude: f64,
    #[serde(alias = "longitude")]
    pub longitude: f64,
    #[serde(alias = "current", default)]
    pub current: CurrentAirQuality,
}

/// Current pollutant concentrations, all in µg/m³. Any of them may be missing or null.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct CurrentAirQuality {
    #[serde(alias = "pm2_5", default)]
    pub pm2_5: Option<f64>,
    #[serde(alias = "pm10", default)]
    pub pm10: Option<f64>,
    #[serde(alias = "carbon_monoxide", default)]
    pub carbon_monoxide: Option<f64>,
    #[serde(alias = "nitrogen_dioxide", default)]
    pub nitrogen_dioxide: Option<f64>,
    #[serde(alias = "sulphur_dioxide", default)]
    pub sulphur_dioxide: Option<f64>,
    #[serde(alias = "ozone", default)]
    pub ozone: Option<f64>,
}

impl CurrentAirQuality {
    pub fn readings(&self) -> Vec<PollutantReading> {
        Pollutant::ALL
            .iter()
            .map(|p| PollutantReading::new(*p, self.concentration(*p)))
            .collect()
    }

    pub fn concentration(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::CarbonMonoxide => self.carbon_monoxide,
            Pollutant::NitrogenDioxide => self.nitrogen_dioxide,
            Pollutant::SulphurDioxide => self.sulphur_dioxide,
            Pollutant::Ozone => self.ozone,
        }
    }
}
