use crate::table::numeric_values;
use arrow::record_batch::RecordBatch;
use avse_lens_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SERIES_COUNT: &str = "N";
pub const SERIES_TARGET: &str = "target_var";
pub const SERIES_PRED: &str = "pred_var";

/// Per-bin summary: observation count plus actual and predicted means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinSummary {
    pub bin: f64,
    pub n: u64,
    pub target_mean: f64,
    pub pred_mean: f64,
}

/// One (bin, series) pair of the long-form reshape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongRecord {
    pub bin: f64,
    pub variable: String,
    pub value: f64,
}

#[derive(Default)]
struct Acc {
    n: u64,
    target_sum: f64,
    target_n: u64,
    pred_sum: f64,
    pred_n: u64,
}

/// Group rows by bin label and compute per-bin count and means.
///
/// Rows with a null bin label are skipped; means ignore null target/pred
/// values. Bins that received no rows are omitted entirely rather than
/// emitted as NaN rows. Output is sorted by bin label.
pub fn summarize(
    batch: &RecordBatch,
    bin_column: &str,
    target_column: &str,
    pred_column: &str,
) -> Result<Vec<BinSummary>> {
    let bins = numeric_values(batch, bin_column)?;
    let targets = numeric_values(batch, target_column)?;
    let preds = numeric_values(batch, pred_column)?;

    // key by bit pattern: labels are exact rounded values, so equality is safe
    let mut groups: HashMap<u64, Acc> = HashMap::new();
    for row in 0..batch.num_rows() {
        let Some(bin) = bins[row] else { continue };
        let acc = groups.entry(bin.to_bits()).or_default();
        acc.n += 1;
        if let Some(t) = targets[row] {
            acc.target_sum += t;
            acc.target_n += 1;
        }
        if let Some(p) = preds[row] {
            acc.pred_sum += p;
            acc.pred_n += 1;
        }
    }

    let mut out: Vec<BinSummary> = groups
        .into_iter()
        .map(|(bits, acc)| BinSummary {
            bin: f64::from_bits(bits),
            n: acc.n,
            target_mean: if acc.target_n > 0 {
                acc.target_sum / acc.target_n as f64
            } else {
                f64::NAN
            },
            pred_mean: if acc.pred_n > 0 {
                acc.pred_sum / acc.pred_n as f64
            } else {
                f64::NAN
            },
        })
        .collect();
    out.sort_by(|a, b| a.bin.total_cmp(&b.bin));
    Ok(out)
}

/// Wide → long reshape: three records per bin, one per series.
pub fn melt(summaries: &[BinSummary]) -> Vec<LongRecord> {
    let mut out = Vec::with_capacity(summaries.len() * 3);
    for s in summaries {
        out.push(LongRecord {
            bin: s.bin,
            variable: SERIES_COUNT.into(),
            value: s.n as f64,
        });
        out.push(LongRecord {
            bin: s.bin,
            variable: SERIES_TARGET.into(),
            value: s.target_mean,
        });
        out.push(LongRecord {
            bin: s.bin,
            variable: SERIES_PRED.into(),
            value: s.pred_mean,
        });
    }
    out
}
