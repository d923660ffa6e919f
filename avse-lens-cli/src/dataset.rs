use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use avse_lens_common::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;

/// Seeded standard normals via Box-Muller.
fn normals(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(n + 1);
    while out.len() < n {
        let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
        let u2: f64 = rng.gen();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;
        out.push(r * theta.cos());
        out.push(r * theta.sin());
    }
    out.truncate(n);
    out
}

/// Demonstration dataset: four standard-normal features, a target driven by
/// z1 plus noise, and a prediction that recovers most of the signal.
///
///   k      = 3.0 * z1 + noise
///   k_pred = 2.5 * z1 + 0.5 * z2
pub fn synthetic_batch(rows: usize, seed: u64) -> Result<RecordBatch> {
    let mut rng = StdRng::seed_from_u64(seed);
    let z: Vec<Vec<f64>> = (0..4).map(|_| normals(&mut rng, rows)).collect();
    let noise = normals(&mut rng, rows);
    let k: Vec<f64> = (0..rows).map(|i| 3.0 * z[0][i] + noise[i]).collect();
    let k_pred: Vec<f64> = (0..rows).map(|i| 2.5 * z[0][i] + 0.5 * z[1][i]).collect();

    let mut fields: Vec<Field> = (1..=4)
        .map(|i| Field::new(format!("z{i}"), DataType::Float64, false))
        .collect();
    fields.push(Field::new("k", DataType::Float64, false));
    fields.push(Field::new("k_pred", DataType::Float64, false));

    let mut columns: Vec<arrow::array::ArrayRef> = z
        .into_iter()
        .map(|v| Arc::new(Float64Array::from(v)) as arrow::array::ArrayRef)
        .collect();
    columns.push(Arc::new(Float64Array::from(k)));
    columns.push(Arc::new(Float64Array::from(k_pred)));

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(batch)
}
