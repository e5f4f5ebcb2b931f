//! Lag and calendar feature engineering
//!
//! Every feature row is produced the same way, whether it describes a
//! historical period or a future one: named values are read from the
//! tail of the available histories and then reindexed onto the
//! [`FeatureSchema`] fixed when the training matrix was built.

use crate::data::RegularSeries;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;

/// One named feature column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureSpec {
    /// Target value `lag` periods earlier
    TargetLag { column: String, lag: usize },
    /// Exogenous value `lag` periods earlier
    ExogenousLag { column: String, lag: usize },
    /// Month of year, 1-12
    Month,
    /// Calendar year
    Year,
}

impl fmt::Display for FeatureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSpec::TargetLag { column, lag } | FeatureSpec::ExogenousLag { column, lag } => {
                write!(f, "lag_{}_{}", column, lag)
            }
            FeatureSpec::Month => write!(f, "month"),
            FeatureSpec::Year => write!(f, "year"),
        }
    }
}

/// Ordered feature template shared by training, evaluation and forecast rows
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    target_name: String,
    exogenous_names: Vec<String>,
    max_lag: usize,
    specs: Vec<FeatureSpec>,
    index: HashMap<FeatureSpec, usize>,
}

impl PartialEq for FeatureSchema {
    fn eq(&self, other: &Self) -> bool {
        self.specs == other.specs && self.max_lag == other.max_lag
    }
}

/// Result of aligning named values onto a schema
#[derive(Debug, Clone, PartialEq)]
pub struct Reindexed {
    /// Values in schema order
    pub row: Vec<f64>,
    /// Schema features that were absent and filled with zero
    pub missing: Vec<FeatureSpec>,
    /// Supplied features the schema does not know about
    pub unexpected: Vec<FeatureSpec>,
}

impl FeatureSchema {
    /// Target lags, then each exogenous column's lags, then month and year
    pub fn new(target_name: &str, exogenous_names: &[String], max_lag: usize) -> Result<Self> {
        if max_lag == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lag depth must be positive".to_string(),
            ));
        }

        let mut specs = Vec::with_capacity(max_lag * (exogenous_names.len() + 1) + 2);
        for lag in 1..=max_lag {
            specs.push(FeatureSpec::TargetLag {
                column: target_name.to_string(),
                lag,
            });
        }
        for column in exogenous_names {
            for lag in 1..=max_lag {
                specs.push(FeatureSpec::ExogenousLag {
                    column: column.clone(),
                    lag,
                });
            }
        }
        specs.push(FeatureSpec::Month);
        specs.push(FeatureSpec::Year);

        // Column names must be unique, not just the specs
        let mut names = HashSet::with_capacity(specs.len());
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if !names.insert(spec.to_string()) || index.insert(spec.clone(), i).is_some() {
                return Err(ForecastError::InvalidParameter(format!(
                    "Feature '{}' would appear twice",
                    spec
                )));
            }
        }

        Ok(Self {
            target_name: target_name.to_string(),
            exogenous_names: exogenous_names.to_vec(),
            max_lag,
            specs,
            index,
        })
    }

    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    /// Column names in schema order
    pub fn names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.to_string()).collect()
    }

    pub fn position(&self, spec: &FeatureSpec) -> Option<usize> {
        self.index.get(spec).copied()
    }

    /// Position of a feature by column name, e.g. `"lag_Sales_3"`
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.to_string() == name)
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn exogenous_names(&self) -> &[String] {
        &self.exogenous_names
    }

    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Align named values onto the schema, reporting what did not match
    pub fn align(&self, values: Vec<(FeatureSpec, f64)>) -> Reindexed {
        let mut row = vec![0.0; self.specs.len()];
        let mut filled = vec![false; self.specs.len()];
        let mut unexpected = Vec::new();

        for (spec, value) in values {
            match self.index.get(&spec) {
                Some(&i) => {
                    row[i] = value;
                    filled[i] = true;
                }
                None => unexpected.push(spec),
            }
        }

        let missing = self
            .specs
            .iter()
            .zip(&filled)
            .filter(|(_, &f)| !f)
            .map(|(s, _)| s.clone())
            .collect();

        Reindexed {
            row,
            missing,
            unexpected,
        }
    }

    /// Align named values onto the schema.
    ///
    /// Absent features become 0.0 and unknown ones are dropped. Neither
    /// case is an error; both are logged because a mismatch here can
    /// silently degrade predictions.
    pub fn reindex(&self, values: Vec<(FeatureSpec, f64)>) -> Vec<f64> {
        let aligned = self.align(values);
        if !aligned.missing.is_empty() {
            warn!(
                missing = ?aligned.missing.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                "feature row lacks schema columns, filling with 0"
            );
        }
        if !aligned.unexpected.is_empty() {
            warn!(
                unexpected = ?aligned.unexpected.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                "feature row has columns outside the schema, dropping them"
            );
        }
        aligned.row
    }
}

/// Named lag and calendar values for `period`.
///
/// Each history holds the values observed strictly before `period`; the
/// k-th lag is the k-th value from the end. Every history must hold at
/// least `max_lag` values.
pub fn named_features(
    target_name: &str,
    target_history: &[f64],
    exogenous: &[(&str, &[f64])],
    period: NaiveDate,
    max_lag: usize,
) -> Result<Vec<(FeatureSpec, f64)>> {
    let shortest = exogenous
        .iter()
        .map(|(_, h)| h.len())
        .chain(std::iter::once(target_history.len()))
        .min()
        .unwrap_or(0);
    if shortest < max_lag {
        return Err(ForecastError::InsufficientHistory {
            available: shortest,
            required: max_lag,
        });
    }

    let mut values = Vec::with_capacity(max_lag * (exogenous.len() + 1) + 2);
    for lag in 1..=max_lag {
        values.push((
            FeatureSpec::TargetLag {
                column: target_name.to_string(),
                lag,
            },
            target_history[target_history.len() - lag],
        ));
    }
    for (column, history) in exogenous {
        for lag in 1..=max_lag {
            values.push((
                FeatureSpec::ExogenousLag {
                    column: column.to_string(),
                    lag,
                },
                history[history.len() - lag],
            ));
        }
    }
    values.push((FeatureSpec::Month, period.month() as f64));
    values.push((FeatureSpec::Year, period.year() as f64));

    Ok(values)
}

/// Feature rows with their labels, one per non-warmup period
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    schema: FeatureSchema,
    periods: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
    labels: Vec<f64>,
    /// Number of regular periods the matrix was built from
    history_len: usize,
}

impl FeatureMatrix {
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one named column
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let i = self.schema.position_by_name(name)?;
        Some(self.rows.iter().map(|r| r[i]).collect())
    }

    /// Fail when the series was too short to produce a single feature row
    pub fn require_rows(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ForecastError::InsufficientHistory {
                available: self.history_len,
                required: self.schema.max_lag() + 1,
            });
        }
        Ok(())
    }

    /// Chronological split: rows `[0, at)` and `[at, len)`
    pub fn split_at(&self, at: usize) -> (FeatureMatrix, FeatureMatrix) {
        let at = at.min(self.len());
        let part = |range: std::ops::Range<usize>| FeatureMatrix {
            schema: self.schema.clone(),
            periods: self.periods[range.clone()].to_vec(),
            rows: self.rows[range.clone()].to_vec(),
            labels: self.labels[range].to_vec(),
            history_len: self.history_len,
        };
        (part(0..at), part(at..self.len()))
    }
}

/// Build the lagged feature matrix for a regular series.
///
/// The first `max_lag` periods lack a full lag window and are dropped, so
/// the result has `max(len - max_lag, 0)` rows.
pub fn build_features(series: &RegularSeries, max_lag: usize) -> Result<FeatureMatrix> {
    let schema = FeatureSchema::new(series.target_name(), series.exogenous_names(), max_lag)?;
    let n = series.len();
    let capacity = n.saturating_sub(max_lag);

    let mut periods = Vec::with_capacity(capacity);
    let mut rows = Vec::with_capacity(capacity);
    let mut labels = Vec::with_capacity(capacity);

    for i in max_lag..n {
        let exogenous: Vec<(&str, &[f64])> = series
            .exogenous_names()
            .iter()
            .zip(series.exogenous_columns())
            .map(|(name, values)| (name.as_str(), &values[..i]))
            .collect();
        let period = series.periods()[i];
        let named = named_features(
            series.target_name(),
            &series.target()[..i],
            &exogenous,
            period,
            max_lag,
        )?;

        periods.push(period);
        rows.push(schema.reindex(named));
        labels.push(series.target()[i]);
    }

    Ok(FeatureMatrix {
        schema,
        periods,
        rows,
        labels,
        history_len: n,
    })
}
