//! Labelled training data.

use super::patient::FeatureVector;

/// Feature rows paired with binary outcome labels (0 = no disease, 1 = disease).
#[derive(Debug, Clone, Default)]
pub struct TrainingDataset {
    rows: Vec<FeatureVector>,
    labels: Vec<i32>,
}

impl TrainingDataset {
    /// Create a dataset from parallel row and label vectors.
    ///
    /// # Errors
    /// Returns error if the two vectors differ in length.
    pub fn new(rows: Vec<FeatureVector>, labels: Vec<i32>) -> Result<Self, String> {
        if rows.len() != labels.len() {
            return Err(format!(
                "Row count {} does not match label count {}",
                rows.len(),
                labels.len()
            ));
        }
        Ok(Self { rows, labels })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    #[must_use]
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Distinct labels, sorted ascending.
    #[must_use]
    pub fn classes(&self) -> Vec<i32> {
        let mut classes = self.labels.clone();
        classes.sort_unstable();
        classes.dedup();
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_rejected() {
        let rows = vec![FeatureVector::new([0.0; 13])];
        assert!(TrainingDataset::new(rows, vec![0, 1]).is_err());
    }

    #[test]
    fn test_classes_sorted_unique() {
        let rows = vec![FeatureVector::new([0.0; 13]); 4];
        let dataset = TrainingDataset::new(rows, vec![1, 0, 1, 1]).expect("valid dataset");
        assert_eq!(dataset.classes(), vec![0, 1]);
        assert_eq!(dataset.len(), 4);
    }
}
