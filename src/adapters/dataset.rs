//! Dataset adapter: loads the labelled training CSV.
//!
//! The header must hold the 13 feature columns in `FEATURE_NAMES` order plus
//! the `target` label column (anywhere).

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{FeatureVector, TrainingDataset, FEATURE_COUNT, FEATURE_NAMES, LABEL_COLUMN};

/// Errors raised while reading the training dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Cannot open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset has no \"{LABEL_COLUMN}\" column")]
    MissingLabelColumn,

    #[error("Feature columns do not match: expected {expected:?}, found {found:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Row {row}, column \"{column}\": cannot parse {value:?}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Dataset contains no rows")]
    Empty,
}

/// Load a dataset from a CSV file.
///
/// # Errors
/// Returns `DatasetError::Io` if the file cannot be opened, and any error of
/// [`read_dataset`].
pub fn load_dataset(path: &Path) -> Result<TrainingDataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_dataset(file)?;
    tracing::info!("Loaded {} rows from {:?}", dataset.len(), path);
    Ok(dataset)
}

/// Parse a dataset from any CSV reader.
///
/// Row numbers in errors are 1-based and count data rows only.
///
/// # Errors
/// Returns error on a missing label column, a header that does not match
/// `FEATURE_NAMES`, an unparsable cell or an empty body.
pub fn read_dataset<R: Read>(reader: R) -> Result<TrainingDataset, DatasetError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let label_idx = headers
        .iter()
        .position(|h| h == LABEL_COLUMN)
        .ok_or(DatasetError::MissingLabelColumn)?;

    let feature_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != label_idx)
        .map(|(idx, h)| (idx, h.to_string()))
        .collect();

    let found: Vec<String> = feature_columns.iter().map(|(_, h)| h.clone()).collect();
    if found.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
        return Err(DatasetError::ColumnMismatch {
            expected: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
            found,
        });
    }

    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for (i, record) in csv.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let mut values = [0.0; FEATURE_COUNT];
        for (slot, (idx, name)) in values.iter_mut().zip(&feature_columns) {
            let raw = record.get(*idx).unwrap_or_default();
            *slot = raw.parse::<f64>().map_err(|_| DatasetError::InvalidValue {
                row,
                column: name.clone(),
                value: raw.to_string(),
            })?;
        }

        let raw_label = record.get(label_idx).unwrap_or_default();
        let label = raw_label.parse::<i32>().map_err(|_| DatasetError::InvalidValue {
            row,
            column: LABEL_COLUMN.to_string(),
            value: raw_label.to_string(),
        })?;

        rows.push(FeatureVector::new(values));
        labels.push(label);
    }

    if rows.is_empty() {
        return Err(DatasetError::Empty);
    }

    tracing::debug!("Parsed {} rows, {} features each", rows.len(), FEATURE_COUNT);

    // Both vectors grow in lockstep above.
    TrainingDataset::new(rows, labels).map_err(|msg| DatasetError::InvalidValue {
        row: 0,
        column: LABEL_COLUMN.to_string(),
        value: msg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str = "age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal,target";

    #[test]
    fn test_reads_rows_and_labels() {
        let csv = format!(
            "{HEADER}\n63,1,3,145,233,1,0,150,0,2.3,0,0,1,1\n37,1,2,130,250,0,1,187,0,3.5,0,0,2,0\n"
        );
        let dataset = read_dataset(csv.as_bytes()).expect("parse");

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.labels(), &[1, 0]);
        assert_eq!(dataset.rows()[0].get("age"), Some(63.0));
        assert_eq!(dataset.rows()[1].get("oldpeak"), Some(3.5));
        assert_eq!(dataset.classes(), vec![0, 1]);
    }

    #[test]
    fn test_label_column_may_come_first() {
        let csv = "target,age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal\n\
                   1,63,1,3,145,233,1,0,150,0,2.3,0,0,1\n";
        let dataset = read_dataset(csv.as_bytes()).expect("parse");
        assert_eq!(dataset.labels(), &[1]);
        assert_eq!(dataset.rows()[0].get("thal"), Some(1.0));
    }

    #[test]
    fn test_missing_label_column() {
        let csv = "age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal\n\
                   63,1,3,145,233,1,0,150,0,2.3,0,0,1\n";
        let err = read_dataset(csv.as_bytes()).expect_err("must fail");
        assert!(matches!(err, DatasetError::MissingLabelColumn));
    }

    #[test]
    fn test_reordered_features_rejected() {
        let csv = "sex,age,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal,target\n\
                   1,63,3,145,233,1,0,150,0,2.3,0,0,1,1\n";
        let err = read_dataset(csv.as_bytes()).expect_err("must fail");
        match err {
            DatasetError::ColumnMismatch { found, .. } => assert_eq!(found[0], "sex"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparsable_value_reports_location() {
        let csv = format!("{HEADER}\n63,1,3,145,233,1,0,150,0,2.3,0,0,1,1\n41,0,1,130,abc,0,0,172,0,1.4,2,0,2,1\n");
        let err = read_dataset(csv.as_bytes()).expect_err("must fail");
        match err {
            DatasetError::InvalidValue { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "chol");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fractional_label_rejected() {
        let csv = format!("{HEADER}\n63,1,3,145,233,1,0,150,0,2.3,0,0,1,0.5\n");
        let err = read_dataset(csv.as_bytes()).expect_err("must fail");
        assert!(matches!(err, DatasetError::InvalidValue { ref column, .. } if column == "target"));
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = read_dataset(format!("{HEADER}\n").as_bytes()).expect_err("must fail");
        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempdir().expect("tempdir");
        let err = load_dataset(&temp.path().join("heart.csv")).expect_err("must fail");
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("heart.csv");
        std::fs::write(&path, format!("{HEADER}\n52,1,0,125,212,0,1,168,0,1.0,2,2,3,0\n"))
            .expect("write csv");
        let dataset = load_dataset(&path).expect("load");
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rows()[0].get("ca"), Some(2.0));
    }
}
