use crate::binning::{bin_column, bin_column_name};
use crate::summary::{melt, summarize, BinSummary, LongRecord, SERIES_COUNT, SERIES_PRED, SERIES_TARGET};
use crate::table::numeric_values;
use arrow::record_batch::RecordBatch;
use avse_lens_common::{AvseLensError, Result};
use plotters::prelude::*;

pub const DEFAULT_WIDTH: u32 = 900;
pub const DEFAULT_HEIGHT: u32 = 700;

/// Rendered Actual-vs-Expected chart: title, the long-form summary it was
/// drawn from, and the SVG document itself.
#[derive(Debug, Clone)]
pub struct AvsePlot {
    pub title: String,
    pub records: Vec<LongRecord>,
    pub svg: String,
}

/// Full AvsE pipeline: bin the primary column, aggregate per bin, reshape to
/// long form and render the two-panel chart.
///
/// The input batch is never modified; binning happens on an internal copy, so
/// the caller's schema is identical before and after the call whether it
/// succeeds or fails. Target and prediction columns are validated before any
/// rendering work starts.
pub fn avse_plot(
    batch: &RecordBatch,
    primary_column: &str,
    target_column: &str,
    pred_column: &str,
    n_bins: usize,
) -> Result<(Vec<BinSummary>, AvsePlot)> {
    avse_plot_sized(
        batch,
        primary_column,
        target_column,
        pred_column,
        n_bins,
        DEFAULT_WIDTH,
        DEFAULT_HEIGHT,
    )
}

pub fn avse_plot_sized(
    batch: &RecordBatch,
    primary_column: &str,
    target_column: &str,
    pred_column: &str,
    n_bins: usize,
    width: u32,
    height: u32,
) -> Result<(Vec<BinSummary>, AvsePlot)> {
    numeric_values(batch, target_column)?;
    numeric_values(batch, pred_column)?;
    let binned = bin_column(batch, primary_column, n_bins)?;
    let derived = bin_column_name(primary_column);
    let summaries = summarize(&binned, &derived, target_column, pred_column)?;
    let records = melt(&summaries);
    let svg = render_avse_svg(&records, primary_column, width, height)?;
    let plot = AvsePlot {
        title: format!("AvsE plot for {primary_column}"),
        records,
        svg,
    };
    Ok((summaries, plot))
}

/// Render the long-form summary as a two-panel SVG: actual/predicted mean
/// lines with markers on top, exposure bars below, sharing one x range.
pub fn render_avse_svg(
    records: &[LongRecord],
    primary_column: &str,
    width: u32,
    height: u32,
) -> Result<String> {
    let mut svg = String::new();
    draw(records, primary_column, width, height, &mut svg)
        .map_err(|e| AvseLensError::Chart(e.to_string()))?;
    Ok(svg)
}

fn series_points(records: &[LongRecord], variable: &str) -> Vec<(f64, f64)> {
    records
        .iter()
        .filter(|r| r.variable == variable && !r.value.is_nan())
        .map(|r| (r.bin, r.value))
        .collect()
}

fn draw(
    records: &[LongRecord],
    primary_column: &str,
    width: u32,
    height: u32,
    out: &mut String,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let target_pts = series_points(records, SERIES_TARGET);
    let pred_pts = series_points(records, SERIES_PRED);
    let bars = series_points(records, SERIES_COUNT);

    // shared x range across both panels, padded so edge markers stay visible
    let xs: Vec<f64> = bars.iter().map(|&(x, _)| x).collect();
    let x_lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x_hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (x_lo, x_hi) = if x_lo.is_finite() && x_hi.is_finite() {
        (x_lo, x_hi)
    } else {
        (0.0, 1.0)
    };
    let x_pad = ((x_hi - x_lo) * 0.05).max(0.5);
    let x_range = (x_lo - x_pad)..(x_hi + x_pad);

    let mut y_lo = f64::INFINITY;
    let mut y_hi = f64::NEG_INFINITY;
    for &(_, y) in target_pts.iter().chain(pred_pts.iter()) {
        y_lo = y_lo.min(y);
        y_hi = y_hi.max(y);
    }
    if !y_lo.is_finite() || !y_hi.is_finite() {
        y_lo = 0.0;
        y_hi = 1.0;
    }
    let y_pad = ((y_hi - y_lo) * 0.05).max(0.1);
    let n_max = bars.iter().map(|&(_, n)| n).fold(0.0f64, f64::max).max(1.0);

    // bar half-width from the tightest label gap so adjacent bars never touch
    let mut sorted_xs = xs.clone();
    sorted_xs.sort_by(f64::total_cmp);
    let min_gap = sorted_xs
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|g| *g > 0.0)
        .fold(f64::INFINITY, f64::min);
    let half_width = if min_gap.is_finite() {
        min_gap * 0.4
    } else {
        x_pad * 0.5
    };

    let root = SVGBackend::with_string(out, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("AvsE plot for {primary_column}"),
        ("sans-serif", 24),
    )?;
    let panels = root.split_evenly((2, 1));

    let mut avse = ChartBuilder::on(&panels[0])
        .caption("AvsE Chart", ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range.clone(), (y_lo - y_pad)..(y_hi + y_pad))?;
    avse.configure_mesh().y_desc("Actual/Pred").draw()?;

    avse.draw_series(LineSeries::new(target_pts.clone(), &RED))?
        .label(SERIES_TARGET)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.filled()));
    avse.draw_series(
        target_pts
            .iter()
            .map(|&p| Circle::new(p, 3, RED.filled())),
    )?;
    avse.draw_series(LineSeries::new(pred_pts.clone(), &BLUE))?
        .label(SERIES_PRED)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.filled()));
    avse.draw_series(pred_pts.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))?;
    avse.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    let mut exposure = ChartBuilder::on(&panels[1])
        .caption("Exposure Chart", ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, 0.0..(n_max * 1.15))?;
    exposure
        .configure_mesh()
        .x_desc(primary_column)
        .y_desc("Exposure")
        .draw()?;
    exposure.draw_series(bars.iter().map(|&(x, n)| {
        Rectangle::new(
            [(x - half_width, 0.0), (x + half_width, n)],
            BLUE.mix(0.4).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}
