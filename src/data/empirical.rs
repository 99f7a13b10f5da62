//! Empirical probability mass table built from a raw sample.

use serde::{Deserialize, Serialize};

use crate::domain::{Bounds, Series};

/// Distinct sample values (ascending) with their relative frequencies.
///
/// Built from a sample the frequencies sum to 1. A copy produced by
/// [`EmpiricalPdf::restrict`] keeps the original frequencies, so its mass is
/// at most 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalPdf {
    support: Vec<f64>,
    frequency: Vec<f64>,
}

impl EmpiricalPdf {
    /// Count each distinct value and divide by the number of observations.
    ///
    /// Non-finite observations (NaN, ±∞) are skipped and do not count towards
    /// the total. Returns `None` when nothing is left.
    pub fn from_sample(sample: &[f64]) -> Option<Self> {
        let mut values: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let total = values.len() as f64;
        let mut support = Vec::new();
        let mut counts: Vec<usize> = Vec::new();
        for v in values {
            // `==` (not total_cmp) so that -0.0 and 0.0 share a bucket.
            match support.last() {
                Some(&last) if last == v => {
                    if let Some(c) = counts.last_mut() {
                        *c += 1;
                    }
                }
                _ => {
                    support.push(v);
                    counts.push(1);
                }
            }
        }

        let frequency = counts.into_iter().map(|c| c as f64 / total).collect();
        Some(Self { support, frequency })
    }

    /// Working copy keeping only support values strictly inside `bounds`.
    pub fn restrict(&self, bounds: Bounds) -> EmpiricalPdf {
        let (support, frequency) = self
            .support
            .iter()
            .zip(self.frequency.iter())
            .filter(|(x, _)| bounds.contains(**x))
            .map(|(x, p)| (*x, *p))
            .unzip();
        EmpiricalPdf { support, frequency }
    }

    pub fn support(&self) -> &[f64] {
        &self.support
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequency
    }

    /// `(value, frequency)` pairs in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.support.iter().copied().zip(self.frequency.iter().copied())
    }

    /// Frequency of an exact support value.
    pub fn get(&self, x: f64) -> Option<f64> {
        self.support
            .binary_search_by(|v| v.total_cmp(&x))
            .ok()
            .map(|i| self.frequency[i])
    }

    pub fn len(&self) -> usize {
        self.support.len()
    }

    pub fn is_empty(&self) -> bool {
        self.support.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.frequency.iter().sum()
    }

    /// Smallest and largest support value.
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((*self.support.first()?, *self.support.last()?))
    }

    pub fn to_series(&self, label: impl Into<String>) -> Series {
        Series {
            label: label.into(),
            x: self.support.clone(),
            y: self.frequency.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    #[test]
    fn small_sample_frequencies() {
        let pdf = EmpiricalPdf::from_sample(&[1.0, 1.0, 1.0, 2.0, 2.0, 3.0]).unwrap();
        assert_eq!(pdf.support(), &[1.0, 2.0, 3.0]);
        assert!((pdf.get(1.0).unwrap() - 0.5).abs() < 1e-12);
        assert!((pdf.get(2.0).unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!((pdf.get(3.0).unwrap() - 1.0 / 6.0).abs() < 1e-12);
        assert!((pdf.total_mass() - 1.0).abs() < 1e-9);
        assert_eq!(pdf.get(4.0), None);
    }

    #[test]
    fn empty_sample_has_no_pdf() {
        assert!(EmpiricalPdf::from_sample(&[]).is_none());
        assert!(EmpiricalPdf::from_sample(&[f64::NAN]).is_none());
    }

    #[test]
    fn unsorted_input_is_ordered_and_nan_skipped() {
        let pdf = EmpiricalPdf::from_sample(&[3.0, f64::NAN, -1.0, 3.0, 0.5]).unwrap();
        assert_eq!(pdf.support(), &[-1.0, 0.5, 3.0]);
        assert!((pdf.get(3.0).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn infinities_are_skipped() {
        let pdf = EmpiricalPdf::from_sample(&[f64::INFINITY, 2.0, f64::NEG_INFINITY, 2.0, 4.0])
            .unwrap();
        assert_eq!(pdf.support(), &[2.0, 4.0]);
        assert!((pdf.frequencies()[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!(EmpiricalPdf::from_sample(&[f64::INFINITY]).is_none());
    }

    #[test]
    fn signed_zeros_share_a_bucket() {
        let pdf = EmpiricalPdf::from_sample(&[-0.0, 0.0, 1.0]).unwrap();
        assert_eq!(pdf.len(), 2);
    }

    #[test]
    fn random_samples_sum_to_one_and_rebuild_identically() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [1usize, 2, 10, 500, 5000] {
            let sample: Vec<f64> = (0..n).map(|_| (rng.gen_range(0.0..50.0_f64)).round()).collect();
            let a = EmpiricalPdf::from_sample(&sample).unwrap();
            let b = EmpiricalPdf::from_sample(&sample).unwrap();
            assert!((a.total_mass() - 1.0).abs() < 1e-9, "n={n}");
            assert!(a.frequencies().iter().all(|p| *p >= 0.0));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn restriction_is_strict_and_never_grows() {
        let sample: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let pdf = EmpiricalPdf::from_sample(&sample).unwrap();

        let cases = [
            Bounds { x_min: None, x_max: None },
            Bounds { x_min: Some(5.0), x_max: None },
            Bounds { x_min: None, x_max: Some(8.0) },
            Bounds { x_min: Some(5.0), x_max: Some(8.0) },
            Bounds { x_min: Some(30.0), x_max: None },
        ];
        for bounds in cases {
            let r = pdf.restrict(bounds);
            assert!(r.len() <= pdf.len());
            for x in r.support() {
                if let Some(lo) = bounds.x_min {
                    assert!(*x > lo);
                }
                if let Some(hi) = bounds.x_max {
                    assert!(*x < hi);
                }
            }
        }

        let r = pdf.restrict(Bounds { x_min: Some(5.0), x_max: Some(8.0) });
        assert_eq!(r.support(), &[6.0, 7.0]);
        assert!(pdf.restrict(Bounds { x_min: Some(30.0), x_max: None }).is_empty());
        // Source untouched.
        assert_eq!(pdf.len(), 20);
    }
}
