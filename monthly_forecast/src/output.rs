//! Reporting tables: merged history/fit/forecast and evaluation metrics

use crate::data::{PeriodValue, RegularSeries};
use crate::error::Result;
use crate::evaluation::Evaluation;
use crate::metrics::EvaluationMetrics;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// One period of the merged table; any value column may be empty
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "Month")]
    pub period: NaiveDate,
    #[serde(rename = "Actual")]
    pub actual: Option<f64>,
    #[serde(rename = "Forecast")]
    pub forecast: Option<f64>,
    #[serde(rename = "Fitted")]
    pub fitted: Option<f64>,
}

impl OutputRow {
    fn empty(period: NaiveDate) -> Self {
        Self {
            period,
            actual: None,
            forecast: None,
            fitted: None,
        }
    }
}

/// Actuals, forecasts and fitted values outer-joined on period
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputTable {
    rows: Vec<OutputRow>,
}

impl OutputTable {
    /// Outer-merge the three value sequences, ascending by period
    pub fn merge(actual: &[PeriodValue], forecast: &[PeriodValue], fitted: &[PeriodValue]) -> Self {
        let mut by_period: BTreeMap<NaiveDate, OutputRow> = BTreeMap::new();

        for pv in actual {
            by_period
                .entry(pv.period)
                .or_insert_with(|| OutputRow::empty(pv.period))
                .actual = Some(pv.value);
        }
        for pv in forecast {
            by_period
                .entry(pv.period)
                .or_insert_with(|| OutputRow::empty(pv.period))
                .forecast = Some(pv.value);
        }
        for pv in fitted {
            by_period
                .entry(pv.period)
                .or_insert_with(|| OutputRow::empty(pv.period))
                .fitted = Some(pv.value);
        }

        Self {
            rows: by_period.into_values().collect(),
        }
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    pub fn get(&self, period: NaiveDate) -> Option<&OutputRow> {
        self.rows
            .binary_search_by_key(&period, |r| r.period)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns `Month`, `Actual`, `Forecast`, `Fitted`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let months: Vec<String> = self.rows.iter().map(|r| r.period.to_string()).collect();
        let actual: Vec<Option<f64>> = self.rows.iter().map(|r| r.actual).collect();
        let forecast: Vec<Option<f64>> = self.rows.iter().map(|r| r.forecast).collect();
        let fitted: Vec<Option<f64>> = self.rows.iter().map(|r| r.fitted).collect();

        let df = DataFrame::new(vec![
            Series::new("Month", months),
            Series::new("Actual", actual),
            Series::new("Forecast", forecast),
            Series::new("Fitted", fitted),
        ])?;
        Ok(df)
    }

    /// Write the table as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// One reported metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Split")]
    pub split: String,
}

/// The four held-out metrics tagged with their split label
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsTable {
    rows: Vec<MetricRow>,
}

impl MetricsTable {
    /// Rows named like `"MAPE (80/20)"`, in MAPE, R2, MAE, RMSE order
    pub fn from_metrics(metrics: &EvaluationMetrics, label: &str) -> Self {
        let rows = metrics
            .named()
            .iter()
            .map(|(name, value)| MetricRow {
                metric: format!("{} ({})", name, label),
                value: *value,
                split: label.to_string(),
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    /// Value of the metric whose name starts with `name`, e.g. `"RMSE"`
    pub fn value(&self, name: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.metric.split(' ').next() == Some(name))
            .map(|r| r.value)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns `Metric`, `Value`, `Split`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let names: Vec<&str> = self.rows.iter().map(|r| r.metric.as_str()).collect();
        let values: Vec<f64> = self.rows.iter().map(|r| r.value).collect();
        let splits: Vec<&str> = self.rows.iter().map(|r| r.split.as_str()).collect();

        let df = DataFrame::new(vec![
            Series::new("Metric", names),
            Series::new("Value", values),
            Series::new("Split", splits),
        ])?;
        Ok(df)
    }

    /// Write the table as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Both reporting tables of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTables {
    pub merged: OutputTable,
    pub metrics: MetricsTable,
}

impl OutputTables {
    pub fn assemble(
        series: &RegularSeries,
        fitted: &[PeriodValue],
        forecast: &[PeriodValue],
        evaluation: &Evaluation,
    ) -> Self {
        let actual: Vec<PeriodValue> = series
            .periods()
            .iter()
            .zip(series.target())
            .map(|(&period, &value)| PeriodValue { period, value })
            .collect();

        Self {
            merged: OutputTable::merge(&actual, forecast, fitted),
            metrics: MetricsTable::from_metrics(&evaluation.metrics, &evaluation.label),
        }
    }
}
