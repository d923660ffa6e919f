use arrow::array::{Float32Array, Float64Array, Int32Array, Int64Array, UInt32Array, UInt64Array};
use arrow::record_batch::RecordBatch;
use avse_lens_common::{AvseLensError, Result};

/// Read one column of a batch as nullable f64 values.
///
/// Any of the common numeric arrow types is accepted; everything else is a
/// `NonNumericColumn` error. A column that is missing entirely is a
/// `MissingColumn` error.
pub fn numeric_values(batch: &RecordBatch, column: &str) -> Result<Vec<Option<f64>>> {
    let idx = batch
        .schema()
        .index_of(column)
        .map_err(|_| AvseLensError::MissingColumn(column.to_string()))?;
    let arr = batch.column(idx);
    if let Some(a) = arr.as_any().downcast_ref::<Float64Array>() {
        return Ok(a.iter().collect());
    }
    if let Some(a) = arr.as_any().downcast_ref::<Float32Array>() {
        return Ok(a.iter().map(|v| v.map(|v| v as f64)).collect());
    }
    if let Some(a) = arr.as_any().downcast_ref::<Int64Array>() {
        return Ok(a.iter().map(|v| v.map(|v| v as f64)).collect());
    }
    if let Some(a) = arr.as_any().downcast_ref::<Int32Array>() {
        return Ok(a.iter().map(|v| v.map(|v| v as f64)).collect());
    }
    if let Some(a) = arr.as_any().downcast_ref::<UInt64Array>() {
        return Ok(a.iter().map(|v| v.map(|v| v as f64)).collect());
    }
    if let Some(a) = arr.as_any().downcast_ref::<UInt32Array>() {
        return Ok(a.iter().map(|v| v.map(|v| v as f64)).collect());
    }
    Err(AvseLensError::NonNumericColumn {
        column: column.to_string(),
        data_type: format!("{:?}", arr.data_type()),
    })
}
