mod dataset;

use avse_lens_common::Config;
use avse_lens_core::{
    avse_plot_sized, bin_column, bin_column_name, export_csv, export_json, melt, open_table,
    print_summary, summarize,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

fn parse_bins(s: &str) -> Result<usize, String> {
    // validate bin count at CLI parse time
    let v: usize = s.parse().map_err(|_| format!("not an integer: {s}"))?;
    if v > 0 {
        Ok(v)
    } else {
        Err(format!("bins must be positive, got {v}"))
    }
}

#[derive(Parser)]
#[command(name = "avse-lens", version, about = "Actual vs Expected model diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the AvsE chart for one primary variable of a parquet table
    Plot {
        path: String,
        #[arg(long)]
        primary: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        pred: String,
        #[arg(long, value_parser = parse_bins)]
        bins: Option<usize>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Write the long-form per-bin summary to disk
    Export {
        path: String,
        #[arg(long)]
        primary: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        pred: String,
        #[arg(long, value_parser = parse_bins)]
        bins: Option<usize>,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Plot a synthetic demonstration dataset
    Demo {
        #[arg(long, default_value_t = 1000)]
        rows: usize,
        #[arg(long, value_parser = parse_bins)]
        bins: Option<usize>,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();
    match cli.command {
        Commands::Plot {
            path,
            primary,
            target,
            pred,
            bins,
            output,
        } => run_plot(&path, &primary, &target, &pred, bins, output, &config),
        Commands::Export {
            path,
            primary,
            target,
            pred,
            bins,
            format,
            output,
        } => run_export(&path, &primary, &target, &pred, bins, format, output, &config),
        Commands::Demo {
            rows,
            bins,
            seed,
            output,
        } => run_demo(rows, bins, seed, output, &config),
    }
}

fn resolve_output(output: Option<String>, config: &Config, default_name: &str) -> PathBuf {
    match output {
        Some(o) => PathBuf::from(o),
        None => Path::new(&config.export.output_dir).join(default_name),
    }
}

fn write_chart(out_path: &Path, svg: &str) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out_path, svg)?;
    println!("Chart written to {}", out_path.display());
    Ok(())
}

fn plot_batch(
    batch: &arrow::record_batch::RecordBatch,
    primary: &str,
    target: &str,
    pred: &str,
    bins: Option<usize>,
    output: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let n_bins = bins.unwrap_or(config.binning.default_bins);
    let (summaries, plot) = avse_plot_sized(
        batch,
        primary,
        target,
        pred,
        n_bins,
        config.chart.width,
        config.chart.height,
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    print_summary(&summaries);
    let out_path = resolve_output(output, config, &format!("avse_{primary}.svg"));
    write_chart(&out_path, &plot.svg)
}

fn run_plot(
    input_path: &str,
    primary: &str,
    target: &str,
    pred: &str,
    bins: Option<usize>,
    output: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let (info, batch) = open_table(Path::new(input_path)).map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("{:<10} {}", "Rows:", info.row_count);
    println!("{:<10} {}", "Columns:", info.columns.len());
    plot_batch(&batch, primary, target, pred, bins, output, config)
}

#[allow(clippy::too_many_arguments)]
fn run_export(
    input_path: &str,
    primary: &str,
    target: &str,
    pred: &str,
    bins: Option<usize>,
    format: Option<String>,
    output: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let (_, batch) = open_table(Path::new(input_path)).map_err(|e| anyhow::anyhow!("{e}"))?;
    let n_bins = bins.unwrap_or(config.binning.default_bins);
    let binned = bin_column(&batch, primary, n_bins).map_err(|e| anyhow::anyhow!("{e}"))?;
    let summaries = summarize(&binned, &bin_column_name(primary), target, pred)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let records = melt(&summaries);
    let format = format.unwrap_or_else(|| config.export.format.clone());
    let out_path = resolve_output(output, config, &format!("avse_{primary}.{format}"));
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match format.as_str() {
        "json" => export_json(&out_path, primary, &records).map_err(|e| anyhow::anyhow!("{e}"))?,
        "csv" => export_csv(&out_path, &records).map_err(|e| anyhow::anyhow!("{e}"))?,
        _ => anyhow::bail!("Unknown format: {format} (use json or csv)"),
    }
    println!("Exported to {}", out_path.display());
    Ok(())
}

fn run_demo(
    rows: usize,
    bins: Option<usize>,
    seed: u64,
    output: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let batch = dataset::synthetic_batch(rows, seed).map_err(|e| anyhow::anyhow!("{e}"))?;
    plot_batch(&batch, "z1", "k", "k_pred", bins, output, config)
}
