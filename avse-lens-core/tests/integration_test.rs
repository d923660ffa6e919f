use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use avse_lens_core::{
    avse_plot, bin_column, bin_column_name, melt, numeric_values, open_table, summarize,
    AvseLensError, SERIES_COUNT, SERIES_PRED, SERIES_TARGET,
};
use parquet::arrow::ArrowWriter;
use std::collections::HashSet;
use std::sync::Arc;

fn ramp_fixture() -> RecordBatch {
    // x = 1..=100, y = 2x, y_pred = 2x + 1
    let x: Vec<f64> = (1..=100).map(|i| i as f64).collect();
    let y: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
    let y_pred: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
        Field::new("y_pred", DataType::Float64, false),
        Field::new("label", DataType::Utf8, true),
    ]));
    let labels = StringArray::from(vec![Some("row"); 100]);
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(x)),
            Arc::new(Float64Array::from(y)),
            Arc::new(Float64Array::from(y_pred)),
            Arc::new(labels),
        ],
    )
    .unwrap()
}

fn two_bin_fixture() -> RecordBatch {
    // binning x with n_bins = 2 puts {1, 2} in the low bin and {11, 12} in the high bin
    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
        Field::new("y_pred", DataType::Float64, false),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(vec![1.0, 2.0, 11.0, 12.0])),
            Arc::new(Float64Array::from(vec![1.0, 3.0, 5.0, 7.0])),
            Arc::new(Float64Array::from(vec![2.0, 2.0, 6.0, 6.0])),
        ],
    )
    .unwrap()
}

#[test]
fn bin_count_invariant() {
    let batch = ramp_fixture();
    let binned = bin_column(&batch, "x", 10).unwrap();
    assert_eq!(binned.num_rows(), batch.num_rows());
    let labels = numeric_values(&binned, "x_bin").unwrap();
    let distinct: HashSet<u64> = labels.iter().flatten().map(|v| v.to_bits()).collect();
    assert_eq!(distinct.len(), 10);
}

#[test]
fn every_row_is_covered_and_minimum_is_kept() {
    let batch = ramp_fixture();
    let binned = bin_column(&batch, "x", 10).unwrap();
    let labels = numeric_values(&binned, "x_bin").unwrap();
    assert!(labels.iter().all(|l| l.is_some()));
    // row 0 holds the minimum; its label is the first (lowest) bin label
    let lowest = labels
        .iter()
        .flatten()
        .copied()
        .fold(f64::INFINITY, f64::min);
    assert_eq!(labels[0], Some(lowest));
}

#[test]
fn first_label_is_rounded_decile_midpoint() {
    let batch = ramp_fixture();
    let binned = bin_column(&batch, "x", 10).unwrap();
    let labels = numeric_values(&binned, "x_bin").unwrap();
    // deciles of 1..=100: first edge pair is (1.0, 10.9), midpoint 5.95
    assert_eq!(labels[0], Some(5.95));
}

#[test]
fn aggregation_matches_known_bins() {
    let batch = two_bin_fixture();
    let binned = bin_column(&batch, "x", 2).unwrap();
    let summaries = summarize(&binned, "x_bin", "y", "y_pred").unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].n, 2);
    assert_eq!(summaries[0].target_mean, 2.0);
    assert_eq!(summaries[0].pred_mean, 2.0);
    assert_eq!(summaries[1].n, 2);
    assert_eq!(summaries[1].target_mean, 6.0);
    assert_eq!(summaries[1].pred_mean, 6.0);
}

#[test]
fn long_form_has_three_series_per_bin() {
    let batch = two_bin_fixture();
    let binned = bin_column(&batch, "x", 2).unwrap();
    let summaries = summarize(&binned, "x_bin", "y", "y_pred").unwrap();
    let records = melt(&summaries);
    assert_eq!(records.len(), 6);
    let variables: HashSet<&str> = records.iter().map(|r| r.variable.as_str()).collect();
    assert_eq!(
        variables,
        HashSet::from([SERIES_COUNT, SERIES_TARGET, SERIES_PRED])
    );
}

#[test]
fn avse_plot_leaves_input_schema_untouched() {
    let batch = ramp_fixture();
    let before: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let (summaries, plot) = avse_plot(&batch, "x", "y", "y_pred", 10).unwrap();
    assert_eq!(summaries.len(), 10);
    assert!(!plot.svg.is_empty());
    let after: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(before, after);
    assert!(!after.contains(&bin_column_name("x")));
}

#[test]
fn avse_plot_failure_also_leaves_schema_untouched() {
    let batch = ramp_fixture();
    let before = batch.schema();
    let err = avse_plot(&batch, "x", "y", "nope", 10).unwrap_err();
    assert!(matches!(err, AvseLensError::MissingColumn(_)));
    assert_eq!(before, batch.schema());
}

#[test]
fn chart_carries_titles_and_axis_labels() {
    let batch = ramp_fixture();
    let (_, plot) = avse_plot(&batch, "x", "y", "y_pred", 10).unwrap();
    assert_eq!(plot.title, "AvsE plot for x");
    for needle in [
        "AvsE plot for x",
        "AvsE Chart",
        "Exposure Chart",
        "Actual/Pred",
        "Exposure",
    ] {
        assert!(plot.svg.contains(needle), "missing '{needle}' in svg");
    }
}

#[test]
fn heavily_repeated_values_collapse_without_error() {
    let mut x = vec![1.0; 90];
    x.extend((1..=10).map(|i| 1.0 + i as f64));
    let y = x.clone();
    let y_pred = x.clone();
    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
        Field::new("y_pred", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(x)),
            Arc::new(Float64Array::from(y)),
            Arc::new(Float64Array::from(y_pred)),
        ],
    )
    .unwrap();
    let binned = bin_column(&batch, "x", 10).unwrap();
    let labels = numeric_values(&binned, "x_bin").unwrap();
    assert!(labels.iter().all(|l| l.is_some()));
    let distinct: HashSet<u64> = labels.iter().flatten().map(|v| v.to_bits()).collect();
    assert!(distinct.len() < 10);
    let summaries = summarize(&binned, "x_bin", "y", "y_pred").unwrap();
    assert_eq!(summaries.len(), distinct.len());
    assert_eq!(summaries.iter().map(|s| s.n).sum::<u64>(), 100);
}

#[test]
fn missing_column_is_an_error() {
    let batch = ramp_fixture();
    let err = bin_column(&batch, "nonexistent_column", 5).unwrap_err();
    assert!(matches!(err, AvseLensError::MissingColumn(_)));
}

#[test]
fn zero_bins_is_an_error() {
    let batch = ramp_fixture();
    let err = bin_column(&batch, "x", 0).unwrap_err();
    assert!(matches!(err, AvseLensError::InvalidBinCount(0)));
}

#[test]
fn non_numeric_column_is_an_error() {
    let batch = ramp_fixture();
    let err = bin_column(&batch, "label", 5).unwrap_err();
    assert!(matches!(err, AvseLensError::NonNumericColumn { .. }));
}

#[test]
fn open_table_reads_parquet_fixture() {
    let batch = ramp_fixture();
    let tmp = tempfile::Builder::new()
        .suffix(".parquet")
        .tempfile()
        .unwrap();
    let mut writer = ArrowWriter::try_new(tmp.as_file(), batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let (info, loaded) = open_table(tmp.path()).unwrap();
    assert_eq!(info.row_count, 100);
    assert_eq!(info.columns.len(), 4);
    assert_eq!(info.columns[0].name, "x");
    let (summaries, _) = avse_plot(&loaded, "x", "y", "y_pred", 10).unwrap();
    assert_eq!(summaries.len(), 10);
}
