use chrono::NaiveDate;
use core_types::TimeSeries;
use std::cmp::Ordering;

/// Two series restricted to the dates they share, with undefined values dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPair {
    pub dates: Vec<NaiveDate>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// `left - right` per shared date.
    pub fn differences(&self) -> Vec<f64> {
        self.left.iter().zip(&self.right).map(|(a, b)| a - b).collect()
    }
}

/// Inner join on dates. Both inputs are ascending, so a single merge walk suffices.
pub fn inner_join(left: &TimeSeries, right: &TimeSeries) -> AlignedPair {
    let mut aligned = AlignedPair::default();
    let (mut i, mut j) = (0, 0);
    let (ld, rd) = (left.dates(), right.dates());
    let (lv, rv) = (left.values(), right.values());

    while i < ld.len() && j < rd.len() {
        match ld[i].cmp(&rd[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                if !lv[i].is_nan() && !rv[j].is_nan() {
                    aligned.dates.push(ld[i]);
                    aligned.left.push(lv[i]);
                    aligned.right.push(rv[j]);
                }
                i += 1;
                j += 1;
            }
        }
    }

    tracing::trace!(
        left = ld.len(),
        right = rd.len(),
        shared = aligned.len(),
        "Aligned series on common dates"
    );
    aligned
}
