//! Simplicity from histogram bin occupancy.
//!
//! A bin is significant when it holds at least `gamma` times the peak bin.
//! The score is the fraction of significant bins: few significant bins mean
//! the background colours are concentrated, which is what a simple photo
//! looks like. The raw fraction is reported as-is.

use ndarray::ArrayView1;

use crate::errors::{Result, SimplicityError, Stage};
use crate::histogram::Histogram;

/// Number of bins holding at least `gamma * peak`.
///
/// An all-zero histogram has a zero threshold, so every bin counts.
pub fn significant_bins(values: ArrayView1<'_, f64>, gamma: f64) -> usize {
    let peak = values.fold(0.0_f64, |peak, &v| peak.max(v));
    let threshold = gamma * peak;
    values.iter().filter(|&&v| v >= threshold).count()
}

/// Outcome of scoring one histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupancy {
    pub peak: f64,
    pub threshold: f64,
    pub significant: usize,
    pub total: usize,
}

impl Occupancy {
    /// Significant bins over all bins, in [0, 1].
    pub fn score(&self) -> f64 {
        self.significant as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplicityScorer {
    gamma: f32,
}

impl SimplicityScorer {
    pub const fn new(gamma: f32) -> Self {
        Self { gamma }
    }

    pub fn occupancy(&self, histogram: &Histogram) -> Result<Occupancy> {
        if histogram.is_empty() {
            return Err(SimplicityError::stage(
                Stage::Scoring,
                SimplicityError::InvalidInput {
                    reason: "histogram has no bins".to_string(),
                },
            ));
        }

        let gamma = f64::from(self.gamma);
        let peak = histogram.peak();
        Ok(Occupancy {
            peak,
            threshold: gamma * peak,
            significant: significant_bins(histogram.values(), gamma),
            total: histogram.len(),
        })
    }

    pub fn score(&self, histogram: &Histogram) -> Result<f64> {
        self.occupancy(histogram).map(|occupancy| occupancy.score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_two_equal_bins_out_of_eight() -> Result<()> {
        let mut values = Array1::zeros(8);
        values[0] = 0.5;
        values[5] = 0.5;
        let histogram = Histogram::new(2, values)?;

        let occupancy = SimplicityScorer::new(0.01).occupancy(&histogram)?;
        assert_eq!(occupancy.significant, 2);
        assert_eq!(occupancy.score(), 0.25);
        Ok(())
    }

    #[test]
    fn test_all_zero_histogram_scores_one() -> Result<()> {
        let score = SimplicityScorer::new(0.01).score(&Histogram::zeros(16))?;
        assert_eq!(score, 1.0);
        Ok(())
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let values = array![1.0, 0.5, 0.49, 0.0];
        assert_eq!(significant_bins(values.view(), 0.5), 2);
    }

    #[test]
    fn test_count_never_grows_with_gamma() {
        let values = array![0.4, 0.25, 0.2, 0.1, 0.04, 0.01, 0.0, 0.0];
        let mut previous = usize::MAX;
        for step in 0..=100 {
            let gamma = step as f64 / 100.0;
            let count = significant_bins(values.view(), gamma);
            assert!(count <= previous, "count rose at gamma {gamma}");
            previous = count;
        }
        assert_eq!(significant_bins(values.view(), 1.0), 1);
    }

    #[test]
    fn test_score_stays_in_unit_interval() -> Result<()> {
        let scorer = SimplicityScorer::new(0.3);
        let cases = [
            array![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            array![0.125, 0.125, 0.125, 0.125, 0.125, 0.125, 0.125, 0.125],
            array![0.9, 0.05, 0.05, 0.0, 0.0, 0.0, 0.0, 0.0],
        ];
        for values in cases {
            let score = scorer.score(&Histogram::new(2, values)?)?;
            assert!((0.0..=1.0).contains(&score));
        }
        Ok(())
    }

    #[test]
    fn test_empty_histogram_is_a_scoring_error() -> Result<()> {
        let err = SimplicityScorer::new(0.01)
            .score(&Histogram::new(0, Array1::zeros(0))?)
            .unwrap_err();
        assert_eq!(err.failed_stage(), Some(Stage::Scoring));
        Ok(())
    }
}
