use crate::summary::{BinSummary, LongRecord};
use avse_lens_common::Result;
use std::io::Write;
use std::path::Path;

/// Headless per-bin summary table on stdout.
pub fn print_summary(summaries: &[BinSummary]) {
    println!(
        "{:>12} {:>8} {:>14} {:>14}",
        "bin", "N", "target_mean", "pred_mean"
    );
    for s in summaries {
        println!(
            "{:>12.2} {:>8} {:>14.4} {:>14.4}",
            s.bin, s.n, s.target_mean, s.pred_mean
        );
    }
}

pub fn export_json(output_path: &Path, primary_column: &str, records: &[LongRecord]) -> Result<()> {
    let doc = serde_json::json!({
        "primary_column": primary_column,
        "records": records,
    });
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, &doc)
        .map_err(|e| avse_lens_common::AvseLensError::Other(e.to_string()))?;
    Ok(())
}

pub fn export_csv(output_path: &Path, records: &[LongRecord]) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    writeln!(file, "bin,variable,value")?;
    for r in records {
        writeln!(file, "{},{},{}", r.bin, r.variable, r.value)?;
    }
    Ok(())
}
