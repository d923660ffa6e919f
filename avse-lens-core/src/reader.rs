use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use avse_lens_common::Result;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub path: PathBuf,
    pub row_count: usize,
    pub columns: Vec<ColumnInfo>,
}

/// Load a parquet file into a single in-memory batch.
pub fn open_table(path: &Path) -> Result<(TableInfo, RecordBatch)> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;
    let columns = schema
        .fields()
        .iter()
        .map(|f| ColumnInfo {
            name: f.name().clone(),
            data_type: format!("{:?}", f.data_type()),
        })
        .collect();
    let info = TableInfo {
        path: path.to_path_buf(),
        row_count: batch.num_rows(),
        columns,
    };
    Ok((info, batch))
}
