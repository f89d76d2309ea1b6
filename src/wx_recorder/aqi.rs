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

//! US EPA Air Quality Index calculation.
//!
//! Concentrations reported by the open-meteo air quality API are mass based (µg/m³).
//! The EPA breakpoint tables for gases are volumetric (ppm or ppb) so those pollutants
//! are converted before lookup. The composite index is the maximum sub-index of all
//! present readings.

use std::fmt;

/// Index reported for concentrations above the top of a breakpoint table.
pub const BEYOND_INDEX: u16 = 501;

/// One row of a breakpoint table: a concentration range and the index range it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub conc_lo: f64,
    pub conc_hi: f64,
    pub index_lo: u16,
    pub index_hi: u16,
}

impl Breakpoint {
    const fn new(conc_lo: f64, conc_hi: f64, index_lo: u16, index_hi: u16) -> Self {
        Breakpoint {
            conc_lo,
            conc_hi,
            index_lo,
            index_hi,
        }
    }

    fn contains(&self, concentration: f64) -> bool {
        self.conc_lo <= concentration && concentration <= self.conc_hi
    }

    fn interpolate(&self, concentration: f64) -> u16 {
        if self.conc_hi == self.conc_lo {
            return self.index_lo;
        }

        let index_lo = f64::from(self.index_lo);
        let index_hi = f64::from(self.index_hi);
        let value = (index_hi - index_lo) / (self.conc_hi - self.conc_lo) * (concentration - self.conc_lo) + index_lo;
        value.round_ties_even() as u16
    }
}

const PM2_5: &[Breakpoint] = &[
    Breakpoint::new(0.0, 12.0, 0, 50),
    Breakpoint::new(12.1, 35.4, 51, 100),
    Breakpoint::new(35.5, 55.4, 101, 150),
    Breakpoint::new(55.5, 150.4, 151, 200),
    Breakpoint::new(150.5, 250.4, 201, 300),
    Breakpoint::new(250.5, 350.4, 301, 400),
    Breakpoint::new(350.5, 500.4, 401, 500),
];

const PM10: &[Breakpoint] = &[
    Breakpoint::new(0.0, 54.0, 0, 50),
    Breakpoint::new(55.0, 154.0, 51, 100),
    Breakpoint::new(155.0, 254.0, 101, 150),
    Breakpoint::new(255.0, 354.0, 151, 200),
    Breakpoint::new(355.0, 424.0, 201, 300),
    Breakpoint::new(425.0, 504.0, 301, 400),
    Breakpoint::new(505.0, 604.0, 401, 500),
];

// ppm
const CARBON_MONOXIDE: &[Breakpoint] = &[
    Breakpoint::new(0.0, 4.4, 0, 50),
    Breakpoint::new(4.5, 9.4, 51, 100),
    Breakpoint::new(9.5, 12.4, 101, 150),
    Breakpoint::new(12.5, 15.4, 151, 200),
    Breakpoint::new(15.5, 30.4, 201, 300),
    Breakpoint::new(30.5, 40.4, 301, 400),
    Breakpoint::new(40.5, 50.4, 401, 500),
];

// ppb, 1-hour
const NITROGEN_DIOXIDE: &[Breakpoint] = &[
    Breakpoint::new(0.0, 53.0, 0, 50),
    Breakpoint::new(54.0, 100.0, 51, 100),
    Breakpoint::new(101.0, 360.0, 101, 150),
    Breakpoint::new(361.0, 649.0, 151, 200),
    Breakpoint::new(650.0, 1249.0, 201, 300),
    Breakpoint::new(1250.0, 1649.0, 301, 400),
    Breakpoint::new(1650.0, 2049.0, 401, 500),
];

// ppb, 1-hour
const SULPHUR_DIOXIDE: &[Breakpoint] = &[
    Breakpoint::new(0.0, 35.0, 0, 50),
    Breakpoint::new(36.0, 75.0, 51, 100),
    Breakpoint::new(76.0, 185.0, 101, 150),
    Breakpoint::new(186.0, 304.0, 151, 200),
    Breakpoint::new(305.0, 604.0, 201, 300),
    Breakpoint::new(605.0, 804.0, 301, 400),
    Breakpoint::new(805.0, 1004.0, 401, 500),
];

// ppb, 8-hour for the lower bands. The EPA table stops at 200 ppb.
const OZONE: &[Breakpoint] = &[
    Breakpoint::new(0.0, 54.0, 0, 50),
    Breakpoint::new(55.0, 70.0, 51, 100),
    Breakpoint::new(71.0, 85.0, 101, 150),
    Breakpoint::new(86.0, 105.0, 151, 200),
    Breakpoint::new(106.0, 200.0, 201, 300),
];

/// Pollutants that contribute to the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    CarbonMonoxide,
    NitrogenDioxide,
    SulphurDioxide,
    Ozone,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::CarbonMonoxide,
        Pollutant::NitrogenDioxide,
        Pollutant::SulphurDioxide,
        Pollutant::Ozone,
    ];

    /// Field name used for this pollutant by the open-meteo air quality API.
    pub fn field_name(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::CarbonMonoxide => "carbon_monoxide",
            Pollutant::NitrogenDioxide => "nitrogen_dioxide",
            Pollutant::SulphurDioxide => "sulphur_dioxide",
            Pollutant::Ozone => "ozone",
        }
    }

    pub fn breakpoints(self) -> &'static [Breakpoint] {
        match self {
            Pollutant::Pm25 => PM2_5,
            Pollutant::Pm10 => PM10,
            Pollutant::CarbonMonoxide => CARBON_MONOXIDE,
            Pollutant::NitrogenDioxide => NITROGEN_DIOXIDE,
            Pollutant::SulphurDioxide => SULPHUR_DIOXIDE,
            Pollutant::Ozone => OZONE,
        }
    }

    /// Unit the breakpoint table for this pollutant is expressed in.
    pub fn table_unit(self) -> &'static str {
        match self {
            Pollutant::Pm25 | Pollutant::Pm10 => "µg/m³",
            Pollutant::CarbonMonoxide => "ppm",
            Pollutant::NitrogenDioxide | Pollutant::SulphurDioxide | Pollutant::Ozone => "ppb",
        }
    }

    /// Convert a concentration in µg/m³ into the unit of this pollutant's breakpoint table.
    ///
    /// Factors assume 25°C and 1 atm.
    pub fn to_table_units(self, ugm3: f64) -> f64 {
        match self {
            Pollutant::Pm25 | Pollutant::Pm10 => ugm3,
            Pollutant::CarbonMonoxide => ugm3 * (0.873 / 1000.0),
            Pollutant::NitrogenDioxide => ugm3 * 0.532,
            Pollutant::SulphurDioxide => ugm3 * 0.375,
            Pollutant::Ozone => ugm3 * 0.5,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Compute the index for a single concentration using the given breakpoint table.
///
/// The concentration must already be in the unit of the table. Values below the
/// table (including NaN) have no measurable contribution and return 0. Values above
/// the table return [`BEYOND_INDEX`]. A value falling between two published ranges
/// reports the upper index of the lower range, matching truncation to the precision
/// of the table.
pub fn sub_index(concentration: f64, table: &[Breakpoint]) -> u16 {
    let (first, last) = match (table.first(), table.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return 0,
    };

    if concentration.is_nan() || concentration < first.conc_lo {
        return 0;
    }

    if concentration > last.conc_hi {
        return BEYOND_INDEX;
    }

    let mut previous = first.index_lo;
    for bp in table {
        if bp.contains(concentration) {
            return bp.interpolate(concentration);
        }

        if concentration < bp.conc_lo {
            return previous;
        }

        previous = bp.index_hi;
    }

    BEYOND_INDEX
}

/// A single measured concentration, in µg/m³. `None` when the API omitted it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollutantReading {
    pub pollutant: Pollutant,
    pub concentration: Option<f64>,
}

impl PollutantReading {
    pub fn new(pollutant: Pollutant, concentration: Option<f64>) -> Self {
        PollutantReading {
            pollutant,
            concentration,
        }
    }

    pub fn present(&self) -> bool {
        self.concentration.is_some()
    }

    /// Sub-index of this reading, `None` if the reading is absent.
    pub fn sub_index(&self) -> Option<u16> {
        self.concentration
            .map(|c| sub_index(self.pollutant.to_table_units(c), self.pollutant.breakpoints()))
    }
}

/// Health category for an index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl Category {
    pub fn from_index(index: u16) -> Self {
        match index {
            301..=u16::MAX => Category::Hazardous,
            201..=300 => Category::VeryUnhealthy,
            151..=200 => Category::Unhealthy,
            101..=150 => Category::UnhealthyForSensitiveGroups,
            51..=100 => Category::Moderate,
            _ => Category::Good,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final reported index: the largest sub-index of all present readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeAqi {
    pub index: u16,
    pub category: Category,
}

impl CompositeAqi {
    pub fn from_index(index: u16) -> Self {
        CompositeAqi {
            index,
            category: Category::from_index(index),
        }
    }
}

/// Compute the composite index from any number of readings.
///
/// Absent readings are skipped. With no present readings the index is 0 ("Good").
pub fn composite(readings: &[PollutantReading]) -> CompositeAqi {
    let index = readings
        .iter()
        .filter_map(PollutantReading::sub_index)
        .max()
        .unwrap_or(0);

    CompositeAqi::from_index(index)
}

#[cfg(test)]
mod tests {
    use super::{composite, sub_index, Breakpoint, Category, CompositeAqi, Pollutant, PollutantReading, BEYOND_INDEX};

    fn readings(values: [Option<f64>; 6]) -> Vec<PollutantReading> {
        Pollutant::ALL
            .iter()
            .zip(values)
            .map(|(p, v)| PollutantReading::new(*p, v))
            .collect()
    }

    #[test]
    fn test_tables_sorted_and_contiguous() {
        for p in Pollutant::ALL {
            let table = p.breakpoints();
            assert_eq!(0.0, table[0].conc_lo, "{}", p);
            assert_eq!(0, table[0].index_lo, "{}", p);

            for bp in table {
                assert!(bp.conc_lo <= bp.conc_hi, "{}: {:?}", p, bp);
                assert!(bp.index_lo < bp.index_hi, "{}: {:?}", p, bp);
            }

            for pair in table.windows(2) {
                assert!(pair[0].conc_hi < pair[1].conc_lo, "{}: {:?}", p, pair);
                assert_eq!(pair[0].index_hi + 1, pair[1].index_lo, "{}: {:?}", p, pair);
            }
        }
    }

    #[test]
    fn test_sub_index_at_bounds() {
        for p in Pollutant::ALL {
            for bp in p.breakpoints() {
                assert_eq!(bp.index_lo, sub_index(bp.conc_lo, p.breakpoints()), "{}: {:?}", p, bp);
                assert_eq!(bp.index_hi, sub_index(bp.conc_hi, p.breakpoints()), "{}: {:?}", p, bp);
            }
        }
    }

    #[test]
    fn test_sub_index_monotonic_within_range() {
        for p in Pollutant::ALL {
            for bp in p.breakpoints() {
                let step = (bp.conc_hi - bp.conc_lo) / 50.0;
                let mut last = sub_index(bp.conc_lo, p.breakpoints());

                for i in 1..=50 {
                    let current = sub_index(bp.conc_lo + step * f64::from(i), p.breakpoints());
                    assert!(current >= last, "{}: {:?} at step {}", p, bp, i);
                    last = current;
                }
            }
        }
    }

    #[test]
    fn test_sub_index_interpolates() {
        // 50 / 12 * 10 = 41.67
        assert_eq!(42, sub_index(10.0, Pollutant::Pm25.breakpoints()));
        // 49 / 23.3 * 11.9 + 51 = 76.03
        assert_eq!(76, sub_index(24.0, Pollutant::Pm25.breakpoints()));
        // 49 / 99 * 45 + 51 = 73.27
        assert_eq!(73, sub_index(100.0, Pollutant::Pm10.breakpoints()));
    }

    #[test]
    fn test_sub_index_rounds_half_to_even() {
        let table = [Breakpoint::new(0.0, 10.0, 0, 10)];
        assert_eq!(2, sub_index(2.5, &table));
        assert_eq!(4, sub_index(3.5, &table));
    }

    #[test]
    fn test_sub_index_beyond_table() {
        for p in Pollutant::ALL {
            let top = p.breakpoints().last().unwrap().conc_hi;
            assert_eq!(BEYOND_INDEX, sub_index(top + 0.1, p.breakpoints()), "{}", p);
            assert_eq!(BEYOND_INDEX, sub_index(f64::INFINITY, p.breakpoints()), "{}", p);
        }

        assert_eq!(Category::Hazardous, Category::from_index(BEYOND_INDEX));
    }

    #[test]
    fn test_sub_index_below_table() {
        assert_eq!(0, sub_index(-1.0, Pollutant::Pm25.breakpoints()));
        assert_eq!(0, sub_index(f64::NEG_INFINITY, Pollutant::Ozone.breakpoints()));
        assert_eq!(0, sub_index(f64::NAN, Pollutant::Pm10.breakpoints()));
        assert_eq!(0, sub_index(5.0, &[]));
    }

    #[test]
    fn test_sub_index_between_ranges() {
        assert_eq!(50, sub_index(12.05, Pollutant::Pm25.breakpoints()));
        assert_eq!(100, sub_index(154.5, Pollutant::Pm10.breakpoints()));
        assert_eq!(150, sub_index(85.5, Pollutant::Ozone.breakpoints()));
    }

    #[test]
    fn test_sub_index_single_point_range() {
        let table = [Breakpoint::new(0.0, 1.0, 0, 10), Breakpoint::new(2.0, 2.0, 11, 20)];
        assert_eq!(11, sub_index(2.0, &table));
    }

    #[test]
    fn test_unit_conversions() {
        assert!((Pollutant::CarbonMonoxide.to_table_units(1000.0) - 0.873).abs() < 1e-12);
        assert!((Pollutant::NitrogenDioxide.to_table_units(100.0) - 53.2).abs() < 1e-12);
        assert!((Pollutant::SulphurDioxide.to_table_units(100.0) - 37.5).abs() < 1e-12);
        assert!((Pollutant::Ozone.to_table_units(100.0) - 50.0).abs() < 1e-12);
        assert_eq!(35.5, Pollutant::Pm25.to_table_units(35.5));
        assert_eq!(155.0, Pollutant::Pm10.to_table_units(155.0));

        assert_eq!("ppm", Pollutant::CarbonMonoxide.table_unit());
        assert_eq!("ppb", Pollutant::Ozone.table_unit());
        assert_eq!("µg/m³", Pollutant::Pm25.table_unit());
    }

    #[test]
    fn test_category_thresholds() {
        assert_eq!(Category::Good, Category::from_index(0));
        assert_eq!(Category::Good, Category::from_index(50));
        assert_eq!(Category::Moderate, Category::from_index(51));
        assert_eq!(Category::Moderate, Category::from_index(100));
        assert_eq!(Category::UnhealthyForSensitiveGroups, Category::from_index(101));
        assert_eq!(Category::Unhealthy, Category::from_index(151));
        assert_eq!(Category::VeryUnhealthy, Category::from_index(201));
        assert_eq!(Category::VeryUnhealthy, Category::from_index(300));
        assert_eq!(Category::Hazardous, Category::from_index(301));
        assert_eq!("Unhealthy for Sensitive Groups", Category::UnhealthyForSensitiveGroups.to_string());
    }

    #[test]
    fn test_composite_no_readings() {
        assert_eq!(CompositeAqi::from_index(0), composite(&[]));

        let res = composite(&readings([None; 6]));
        assert_eq!(0, res.index);
        assert_eq!(Category::Good, res.category);
    }

    #[test]
    fn test_composite_all_pollutants() {
        // Sub-indices: pm2.5 42, pm10 37, co 2, no2 10, so2 5, o3 28
        let res = composite(&readings([
            Some(10.0),
            Some(40.0),
            Some(200.0),
            Some(20.0),
            Some(10.0),
            Some(60.0),
        ]));

        assert_eq!(42, res.index);
        assert_eq!(Category::Good, res.category);
    }

    #[test]
    fn test_composite_order_invariant() {
        let mut input = readings([Some(40.0), Some(200.0), None, Some(150.0), Some(3.0), Some(140.0)]);
        let forward = composite(&input);
        input.reverse();
        let reversed = composite(&input);
        input.rotate_left(2);
        let rotated = composite(&input);

        assert_eq!(forward, reversed);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn test_composite_absent_never_zeroes() {
        let res = composite(&readings([None, None, None, None, None, Some(150.0)]));
        // 75 ppb ozone: 49 / 14 * 4 + 101 = 115
        assert_eq!(115, res.index);
        assert_eq!(Category::UnhealthyForSensitiveGroups, res.category);
    }

    #[test]
    fn test_composite_beyond_table() {
        let res = composite(&readings([Some(5.0), Some(800.0), None, None, None, None]));
        assert_eq!(BEYOND_INDEX, res.index);
        assert_eq!(Category::Hazardous, res.category);
    }
}
