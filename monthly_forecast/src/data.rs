//! Raw records, the monthly grid regularizer and table loading

use crate::config::PipelineConfig;
use crate::error::{ForecastError, Result};
use crate::utils::{date_parser, month_end_of, month_ordinal, next_month_end};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// One row of the irregular source table
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Unparsed date-like value
    pub timestamp: String,
    /// Target value
    pub target: f64,
    /// Exogenous values, aligned with the configured exogenous columns
    pub exogenous: Vec<f64>,
}

impl RawRecord {
    pub fn new(timestamp: impl Into<String>, target: f64, exogenous: Vec<f64>) -> Self {
        Self {
            timestamp: timestamp.into(),
            target,
            exogenous,
        }
    }
}

/// A value attached to a month-end period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodValue {
    pub period: NaiveDate,
    pub value: f64,
}

/// Gap-free monthly series indexed by month-end dates
#[derive(Debug, Clone, PartialEq)]
pub struct RegularSeries {
    /// Strictly increasing, contiguous month-ends
    periods: Vec<NaiveDate>,
    target_name: String,
    target: Vec<f64>,
    exogenous_names: Vec<String>,
    /// One history per exogenous column, same length as `periods`
    exogenous: Vec<Vec<f64>>,
}

impl RegularSeries {
    /// Build a series from already-regular columns.
    ///
    /// Periods must be contiguous month-ends and every column must have one
    /// value per period.
    pub fn new(
        periods: Vec<NaiveDate>,
        target_name: impl Into<String>,
        target: Vec<f64>,
        exogenous_names: Vec<String>,
        exogenous: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if target.len() != periods.len() {
            return Err(ForecastError::DataError(format!(
                "Target length ({}) doesn't match periods ({})",
                target.len(),
                periods.len()
            )));
        }
        if exogenous_names.len() != exogenous.len() {
            return Err(ForecastError::DataError(format!(
                "{} exogenous names for {} exogenous columns",
                exogenous_names.len(),
                exogenous.len()
            )));
        }
        for (name, values) in exogenous_names.iter().zip(&exogenous) {
            if values.len() != periods.len() {
                return Err(ForecastError::DataError(format!(
                    "Exogenous column '{}' length ({}) doesn't match periods ({})",
                    name,
                    values.len(),
                    periods.len()
                )));
            }
        }
        for &period in &periods {
            if month_end_of(period)? != period {
                return Err(ForecastError::DataError(format!(
                    "Period {} is not a month-end",
                    period
                )));
            }
        }
        if let Some(w) = periods
            .windows(2)
            .find(|w| month_ordinal(w[1]) - month_ordinal(w[0]) != 1)
        {
            return Err(ForecastError::DataError(format!(
                "Periods {} and {} are not consecutive months",
                w[0], w[1]
            )));
        }

        Ok(Self {
            periods,
            target_name: target_name.into(),
            target,
            exogenous_names,
            exogenous,
        })
    }

    /// Build a series starting at the month of `start` from consecutive monthly values
    pub fn from_monthly_values(
        start: NaiveDate,
        target_name: impl Into<String>,
        target: Vec<f64>,
        exogenous_names: Vec<String>,
        exogenous: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let mut periods = Vec::with_capacity(target.len());
        let mut current = month_end_of(start)?;
        for i in 0..target.len() {
            if i > 0 {
                current = next_month_end(current)?;
            }
            periods.push(current);
        }
        Self::new(periods, target_name, target, exogenous_names, exogenous)
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn exogenous_names(&self) -> &[String] {
        &self.exogenous_names
    }

    /// Every exogenous history, in the same order as `exogenous_names`
    pub fn exogenous_columns(&self) -> &[Vec<f64>] {
        &self.exogenous
    }

    /// History of one exogenous column
    pub fn exogenous(&self, name: &str) -> Option<&[f64]> {
        self.exogenous_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.exogenous[i].as_slice())
    }

    pub fn first_period(&self) -> Option<NaiveDate> {
        self.periods.first().copied()
    }

    pub fn last_period(&self) -> Option<NaiveDate> {
        self.periods.last().copied()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[derive(Debug, Clone)]
struct MonthTotals {
    target: f64,
    exogenous: Vec<f64>,
}

/// Turn irregular records into a gap-free month-end series.
///
/// Records whose timestamp cannot be parsed are dropped. Records falling
/// in the same calendar month are summed, with NaN values counted as zero,
/// and months with no records are filled with zeros for every column.
pub fn regularize(
    records: &[RawRecord],
    target_name: &str,
    exogenous_names: &[String],
) -> Result<RegularSeries> {
    let width = exogenous_names.len();
    let mut months: BTreeMap<NaiveDate, MonthTotals> = BTreeMap::new();
    let mut dropped = 0usize;
    let mut missing_values = 0usize;

    for (row, record) in records.iter().enumerate() {
        if record.exogenous.len() != width {
            return Err(ForecastError::DataError(format!(
                "Record {} has {} exogenous values, expected {}",
                row,
                record.exogenous.len(),
                width
            )));
        }

        let Some(date) = date_parser::parse_date(&record.timestamp) else {
            dropped += 1;
            continue;
        };
        let period = month_end_of(date)?;

        let totals = months.entry(period).or_insert_with(|| MonthTotals {
            target: 0.0,
            exogenous: vec![0.0; width],
        });
        // NaN values count as zero
        let mut add = |total: &mut f64, value: f64| {
            if value.is_nan() {
                missing_values += 1;
            } else {
                *total += value;
            }
        };
        add(&mut totals.target, record.target);
        for (total, value) in totals.exogenous.iter_mut().zip(&record.exogenous) {
            add(total, *value);
        }
    }

    if dropped > 0 {
        debug!(dropped, "dropped records with unparseable timestamps");
    }
    if missing_values > 0 {
        debug!(missing_values, "summed NaN values as zero");
    }

    let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return RegularSeries::new(
            Vec::new(),
            target_name,
            Vec::new(),
            exogenous_names.to_vec(),
            vec![Vec::new(); width],
        );
    };

    let span = (month_ordinal(last) - month_ordinal(first) + 1) as usize;
    let mut periods = Vec::with_capacity(span);
    let mut target = Vec::with_capacity(span);
    let mut exogenous = vec![Vec::with_capacity(span); width];

    let mut current = first;
    loop {
        periods.push(current);
        match months.get(&current) {
            Some(totals) => {
                target.push(totals.target);
                for (column, value) in exogenous.iter_mut().zip(&totals.exogenous) {
                    column.push(*value);
                }
            }
            None => {
                target.push(0.0);
                for column in exogenous.iter_mut() {
                    column.push(0.0);
                }
            }
        }
        if current >= last {
            break;
        }
        current = next_month_end(current)?;
    }

    debug!(
        periods = periods.len(),
        observed_months = months.len(),
        "regularized monthly grid"
    );

    RegularSeries::new(
        periods,
        target_name,
        target,
        exogenous_names.to_vec(),
        exogenous,
    )
}

/// Data loader for source tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load raw records from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<Vec<RawRecord>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df, config)
    }

    /// Extract raw records from an existing DataFrame.
    ///
    /// The date column is read as text whatever its dtype; numeric
    /// columns are cast to `f64` and nulls count as zero.
    pub fn from_dataframe(df: &DataFrame, config: &PipelineConfig) -> Result<Vec<RawRecord>> {
        let timestamps = Self::column_as_text(df, &config.date_column)?;
        let target = Self::column_as_f64(df, &config.target_column)?;
        let exogenous = config
            .exogenous_columns
            .iter()
            .map(|name| Self::column_as_f64(df, name))
            .collect::<Result<Vec<_>>>()?;

        let records = timestamps
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| {
                RawRecord::new(
                    timestamp.unwrap_or_default(),
                    target[i],
                    exogenous.iter().map(|column| column[i]).collect(),
                )
            })
            .collect();

        Ok(records)
    }

    fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
        df.column(name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", name, e))
        })
    }

    fn column_as_text(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
        let col = Self::column(df, name)?.cast(&DataType::Utf8)?;
        let values = col
            .utf8()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let source = Self::column(df, name)?;
        if !source.dtype().is_numeric() && source.dtype() != &DataType::Boolean {
            return Err(ForecastError::DataError(format!(
                "Column '{}' cannot be converted to f64",
                name
            )));
        }
        let col = source.cast(&DataType::Float64)?;
        let values = col.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect();
        Ok(values)
    }
}
