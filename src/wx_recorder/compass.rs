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

use std::error;
use std::fmt;

const SECTOR_DEGREES: f64 = 22.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompassError {
    InvalidInput(f64),
}

impl fmt::Display for CompassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(d) => write!(f, "wind direction {} outside of [0, 360] degrees", d),
        }
    }
}

impl error::Error for CompassError {}

/// One of the sixteen points of the compass, clockwise from north.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassPoint {
    const ALL: [CompassPoint; 16] = [
        CompassPoint::N,
        CompassPoint::NNE,
        CompassPoint::NE,
        CompassPoint::ENE,
        CompassPoint::E,
        CompassPoint::ESE,
        CompassPoint::SE,
        CompassPoint::SSE,
        CompassPoint::S,
        CompassPoint::SSW,
        CompassPoint::SW,
        CompassPoint::WSW,
        CompassPoint::W,
        CompassPoint::WNW,
        CompassPoint::NW,
        CompassPoint::NNW,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NNE => "NNE",
            CompassPoint::NE => "NE",
            CompassPoint::ENE => "ENE",
            CompassPoint::E => "E",
            CompassPoint::ESE => "ESE",
            CompassPoint::SE => "SE",
            CompassPoint::SSE => "SSE",
            CompassPoint::S => "S",
            CompassPoint::SSW => "SSW",
            CompassPoint::SW => "SW",
            CompassPoint::WSW => "WSW",
            CompassPoint::W => "W",
            CompassPoint::WNW => "WNW",
            CompassPoint::NW => "NW",
            CompassPoint::NNW => "NNW",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket a direction in degrees into one of sixteen 22.5° sectors.
///
/// Each sector includes its lower bound, e.g. 22.5° is `NNE`. Both 0° and 360° are `N`.
/// Anything outside of `[0, 360]` (or not finite) is an error.
pub fn compass_from_degrees(degrees: f64) -> Result<CompassPoint, CompassError> {
    if !degrees.is_finite() || !(0.0..=360.0).contains(&degrees) {
        return Err(CompassError::InvalidInput(degrees));
    }

    let sector = (degrees / SECTOR_DEGREES).floor() as usize % CompassPoint::ALL.len();
    Ok(CompassPoint::ALL[sector])
}

/// How wind direction is written to the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WindFormat {
    /// Raw direction in degrees
    Degrees,
    /// Sixteen point compass label (N, NNE, ...)
    Compass,
}

impl WindFormat {
    pub fn format(self, degrees: f64) -> Result<WindDirection, CompassError> {
        match self {
            WindFormat::Degrees => Ok(WindDirection::Degrees(degrees)),
            WindFormat::Compass => compass_from_degrees(degrees).map(WindDirection::Compass),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindDirection {
    Degrees(f64),
    Compass(CompassPoint),
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degrees(d) => write!(f, "{}", d),
            Self::Compass(p) => write!(f, "{}", p),
        }
    }
}
