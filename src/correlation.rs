//! Pearson correlation between the engagement metrics of a channel's videos.

use serde::{Serialize, Serializer};

use crate::model::DerivedRecord;

pub const METRIC_LABELS: [&str; 5] = ["views", "likes", "comments", "likeRatio", "commentRatio"];

const METRIC_COUNT: usize = METRIC_LABELS.len();

/// Symmetric matrix of correlation coefficients indexed like
/// [`METRIC_LABELS`]. Cells without enough usable data hold `NaN`.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    values: [[f64; METRIC_COUNT]; METRIC_COUNT],
}

impl CorrelationMatrix {
    pub fn labels(&self) -> &'static [&'static str] {
        &METRIC_LABELS
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let row = METRIC_LABELS.iter().position(|label| *label == row)?;
        let column = METRIC_LABELS.iter().position(|label| *label == column)?;
        Some(self.values[row][column])
    }

    pub fn rows(&self) -> &[[f64; METRIC_COUNT]; METRIC_COUNT] {
        &self.values
    }
}

impl Serialize for CorrelationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            labels: &'a [&'a str],
            values: &'a [[f64; METRIC_COUNT]; METRIC_COUNT],
        }

        Wire {
            labels: &METRIC_LABELS,
            values: &self.values,
        }
        .serialize(serializer)
    }
}

fn metric_columns(record: &DerivedRecord) -> [f64; METRIC_COUNT] {
    let inner = &record.record;
    [
        inner.views as f64,
        inner.likes as f64,
        inner.comments as f64,
        record.like_ratio,
        record.comment_ratio,
    ]
}

/// Correlates every pair of metrics over the records where both are defined.
///
/// Rows whose ratio is `NaN` (zero views) are skipped only for the pairs that
/// involve that ratio. A pair with fewer than two usable rows, or with a
/// constant column, yields `NaN`.
pub fn correlation_matrix(derived: &[DerivedRecord]) -> CorrelationMatrix {
    let columns: Vec<[f64; METRIC_COUNT]> = derived.iter().map(metric_columns).collect();
    let mut values = [[f64::NAN; METRIC_COUNT]; METRIC_COUNT];

    for row in 0..METRIC_COUNT {
        for column in row..METRIC_COUNT {
            let pairs = columns
                .iter()
                .map(|metrics| (metrics[row], metrics[column]))
                .filter(|(x, y)| !x.is_nan() && !y.is_nan());
            let coefficient = pearson(pairs);
            values[row][column] = coefficient;
            values[column][row] = coefficient;
        }
    }

    CorrelationMatrix { values }
}

fn pearson(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    let pairs: Vec<(f64, f64)> = pairs.collect();
    let Some(&(first_x, first_y)) = pairs.first() else {
        return f64::NAN;
    };
    // Exact comparison: float means of a constant column are not exact.
    let constant_x = pairs.iter().all(|(x, _)| *x == first_x);
    let constant_y = pairs.iter().all(|(_, y)| *y == first_y);
    if pairs.len() < 2 || constant_x || constant_y {
        return f64::NAN;
    }

    let count = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / count;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}
