use crate::table::numeric_values;
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use avse_lens_common::{AvseLensError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Equal-frequency bin edges and their representative labels.
///
/// Edges are `n_bins + 1` empirical quantiles of the source column at evenly
/// spaced probabilities; each label is the midpoint of an adjacent edge pair,
/// rounded to 2 decimals. Edges are non-decreasing but not necessarily
/// distinct: a column with few distinct values yields duplicate edges, and the
/// bins between them simply stay empty. That collapse is deliberate —
/// equal-frequency binning of heavily repeated data gives fewer populated
/// bins, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinSpec {
    pub edges: Vec<f64>,
    pub labels: Vec<f64>,
}

/// Linear-interpolated empirical quantiles of a sorted slice.
pub fn quantiles(sorted: &[f64], probs: &[f64]) -> Vec<f64> {
    let n = sorted.len();
    probs
        .iter()
        .map(|&p| {
            if n == 1 {
                return sorted[0];
            }
            let h = p * (n - 1) as f64;
            let lo = h.floor() as usize;
            let hi = h.ceil() as usize;
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl BinSpec {
    pub fn from_values(values: &[f64], n_bins: usize) -> Result<Self> {
        if n_bins == 0 {
            return Err(AvseLensError::InvalidBinCount(n_bins));
        }
        if values.is_empty() {
            return Err(AvseLensError::Other(
                "cannot bin an empty value set".into(),
            ));
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let probs: Vec<f64> = (0..=n_bins).map(|i| i as f64 / n_bins as f64).collect();
        let edges = quantiles(&sorted, &probs);
        let labels = edges.windows(2).map(|w| round2((w[0] + w[1]) / 2.0)).collect();
        Ok(BinSpec { edges, labels })
    }

    /// Label of the bin containing `v`, or `None` when `v` is NaN or outside
    /// the edge range. Intervals are `(lo, hi]` with the lowest edge
    /// inclusive, so the column minimum always lands in the first bin.
    pub fn assign(&self, v: f64) -> Option<f64> {
        if v.is_nan() {
            return None;
        }
        for i in 0..self.labels.len() {
            let lo = self.edges[i];
            let hi = self.edges[i + 1];
            let above_lo = if i == 0 { v >= lo } else { v > lo };
            if above_lo && v <= hi {
                return Some(self.labels[i]);
            }
        }
        None
    }

    pub fn n_bins(&self) -> usize {
        self.labels.len()
    }
}

/// Name of the derived bin column for `column`.
pub fn bin_column_name(column: &str) -> String {
    format!("{column}_bin")
}

/// Equal-frequency binning of one numeric column.
///
/// Returns a new batch with a nullable Float64 `<column>_bin` column appended
/// (replacing any existing column of that name). The input batch is left
/// untouched and no rows are removed; rows with a null source value get a
/// null bin label.
pub fn bin_column(batch: &RecordBatch, column: &str, n_bins: usize) -> Result<RecordBatch> {
    let values = numeric_values(batch, column)?;
    if n_bins == 0 {
        return Err(AvseLensError::InvalidBinCount(n_bins));
    }
    let non_null: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();
    if non_null.is_empty() {
        return Err(AvseLensError::EmptyColumn(column.to_string()));
    }
    let spec = BinSpec::from_values(&non_null, n_bins)?;
    let assigned: Float64Array = values
        .iter()
        .map(|v| v.and_then(|v| spec.assign(v)))
        .collect();

    let derived = bin_column_name(column);
    let schema = batch.schema();
    let mut fields: Vec<Field> = Vec::with_capacity(schema.fields().len() + 1);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len() + 1);
    for (field, col) in schema.fields().iter().zip(batch.columns()) {
        if field.name() != &derived {
            fields.push(field.as_ref().clone());
            columns.push(col.clone());
        }
    }
    fields.push(Field::new(&derived, DataType::Float64, true));
    columns.push(Arc::new(assigned));
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(batch)
}
