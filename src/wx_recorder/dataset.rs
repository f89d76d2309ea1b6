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

use crate::record::WeatherRecord;
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, XlsxError};
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extra characters of width given to each column beyond its longest value.
const COLUMN_PADDING: usize = 2;

/// A single typed spreadsheet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    /// Convert a value read from an existing sheet. Dates, durations and formula
    /// errors can't be written back unchanged so they have no `Cell` equivalent.
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::Int(i) => Some(Cell::Number(*i as f64)),
            Data::Float(f) => Some(Cell::Number(*f)),
            Data::String(s) => Some(Cell::Text(s.clone())),
            Data::Bool(b) => Some(Cell::Bool(*b)),
            Data::Empty => Some(Cell::Empty),
            Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) | Data::Error(_) => None,
        }
    }

    fn width(&self) -> usize {
        match self {
            Self::Empty => 0,
            _ => self.to_string().chars().count(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Empty => Ok(()),
        }
    }
}

#[derive(Debug)]
pub enum DatasetError {
    Io(PathBuf, io::Error),
    Read(PathBuf, calamine::XlsxError),
    Write(PathBuf, XlsxError),
    NoWorksheet(PathBuf),
    UnsupportedCell { path: PathBuf, row: u32, column: u32, value: String },
    SchemaMismatch { expected: Vec<String>, found: Vec<String> },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(p, e) => write!(f, "{}: {}", p.display(), e),
            Self::Read(p, e) => write!(f, "unable to read {}: {}", p.display(), e),
            Self::Write(p, e) => write!(f, "unable to write {}: {}", p.display(), e),
            Self::NoWorksheet(p) => write!(f, "no worksheet in {}", p.display()),
            Self::UnsupportedCell { path, row, column, value } => write!(
                f,
                "unsupported value {} at row {} column {} of {}",
                value,
                row,
                column,
                path.display()
            ),
            Self::SchemaMismatch { expected, found } => write!(
                f,
                "existing columns [{}] do not match record columns [{}]",
                found.join(", "),
                expected.join(", ")
            ),
        }
    }
}

impl error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(_, e) => Some(e),
            Self::Read(_, e) => Some(e),
            Self::Write(_, e) => Some(e),
            _ => None,
        }
    }
}

/// Somewhere records can be appended to.
pub trait Dataset {
    /// Append a record as a new row, returning the number of records now stored.
    ///
    /// Existing rows are never modified.
    fn append(&mut self, record: &WeatherRecord) -> Result<usize, DatasetError>;
}

/// Dataset stored as the first worksheet of an `.xlsx` file.
///
/// The first row is a header. Every append rewrites the file with all existing rows
/// followed by the new one, centering every cell and sizing each column to fit its
/// widest value. Sheets containing dates, durations, or formula errors are rejected
/// since those values can't be written back unchanged.
#[derive(Debug, Clone)]
pub struct XlsxDataset {
    path: PathBuf,
}

impl XlsxDataset {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        XlsxDataset { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row of the dataset, header included.
    pub fn rows(&self) -> Result<Vec<Vec<Cell>>, DatasetError> {
        let mut workbook: Xlsx<_> =
            open_workbook(&self.path).map_err(|e| DatasetError::Read(self.path.clone(), e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DatasetError::NoWorksheet(self.path.clone()))?
            .map_err(|e| DatasetError::Read(self.path.clone(), e))?;

        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows = Vec::with_capacity(range.height());

        for (r, row) in range.rows().enumerate() {
            let mut cells = Vec::with_capacity(row.len());
            for (c, data) in row.iter().enumerate() {
                let cell = Cell::from_data(data).ok_or_else(|| DatasetError::UnsupportedCell {
                    path: self.path.clone(),
                    row: start_row + r as u32 + 1,
                    column: start_col + c as u32 + 1,
                    value: format!("{:?}", data),
                })?;
                cells.push(cell);
            }

            while cells.last() == Some(&Cell::Empty) {
                cells.pop();
            }
            rows.push(cells);
        }

        Ok(rows)
    }

    fn write(&self, rows: &[Vec<Cell>]) -> Result<(), DatasetError> {
        let write_err = |e| DatasetError::Write(self.path.clone(), e);
        let format = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let mut widths: Vec<usize> = Vec::new();

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Text(s) => worksheet.write_string_with_format(r, c, s, &format),
                    Cell::Number(n) => worksheet.write_number_with_format(r, c, *n, &format),
                    Cell::Bool(b) => worksheet.write_boolean_with_format(r, c, *b, &format),
                    Cell::Empty => worksheet.write_blank(r, c, &format),
                }
                .map_err(write_err)?;

                if widths.len() <= c as usize {
                    widths.resize(c as usize + 1, 0);
                }
                widths[c as usize] = widths[c as usize].max(cell.width());
            }
        }

        for (c, width) in widths.iter().enumerate() {
            worksheet
                .set_column_width(c as u16, (width + COLUMN_PADDING) as f64)
                .map_err(write_err)?;
        }

        // Save next to the target and rename over it so a failed save leaves the old file alone
        let tmp = self.temp_path();
        let res = workbook
            .save(&tmp)
            .map_err(write_err)
            .and_then(|_| fs::rename(&tmp, &self.path).map_err(|e| DatasetError::Io(self.path.clone(), e)));

        if res.is_err() {
            let _ = fs::remove_file(&tmp);
        }

        res
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Dataset for XlsxDataset {
    fn append(&mut self, record: &WeatherRecord) -> Result<usize, DatasetError> {
        let header: Vec<Cell> = record
            .columns()
            .into_iter()
            .map(|c| Cell::Text(c.to_owned()))
            .collect();

        let mut rows = if self.path.exists() {
            tracing::debug!(message = "reading existing dataset", path = %self.path.display());
            self.rows()?
        } else {
            tracing::info!(message = "creating new dataset", path = %self.path.display());
            Vec::new()
        };

        match rows.first() {
            None => rows.push(header),
            Some(existing) if *existing != header => {
                return Err(DatasetError::SchemaMismatch {
                    expected: header.iter().map(Cell::to_string).collect(),
                    found: existing.iter().map(Cell::to_string).collect(),
                });
            }
            Some(_) => {}
        }

        rows.push(record.cells());
        self.write(&rows)?;

        Ok(rows.len() - 1)
    }
}
