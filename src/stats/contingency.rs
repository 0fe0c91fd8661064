//! Category-vs-return contingency table and chi-square independence test.
//!
//! The table is built once per test: rows are the observed category values in
//! sorted order, columns are the outcome {kept, returned}. The test runs on
//! the observed table as-is; a category that is always (or never) returned is
//! accepted input, not an error.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::domain::{ChiSquareResult, OrderRecord};

/// Cross-tabulated counts of `category × is_returned`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContingencyTable {
    /// Category values, sorted ascending.
    pub categories: Vec<String>,
    /// Per-category counts: `[not_returned, returned]`.
    pub counts: Vec<[u64; 2]>,
}

impl ContingencyTable {
    /// Build the table from a record set.
    pub fn from_records(records: &[OrderRecord]) -> Self {
        let mut groups: std::collections::BTreeMap<&str, [u64; 2]> =
            std::collections::BTreeMap::new();
        for r in records {
            let cell = groups.entry(r.category.as_str()).or_insert([0, 0]);
            cell[usize::from(r.is_returned)] += 1;
        }

        let (categories, counts) = groups
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .unzip();
        Self { categories, counts }
    }

    /// Per-category row totals.
    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row[0] + row[1]).collect()
    }

    /// Outcome column totals: `[not_returned, returned]`.
    pub fn col_totals(&self) -> [u64; 2] {
        let mut totals = [0u64; 2];
        for row in &self.counts {
            totals[0] += row[0];
            totals[1] += row[1];
        }
        totals
    }

    pub fn grand_total(&self) -> u64 {
        let [kept, returned] = self.col_totals();
        kept + returned
    }
}

/// Pearson chi-square test of independence on the observed table.
///
/// Degrees of freedom are `(rows - 1) * (cols - 1)`. A table too small to
/// test (fewer than two categories, or an all-zero outcome column making
/// dof effectively vanish) reports statistic 0 with p-value 1 rather than
/// failing; the caller surfaces the numbers as a diagnostic either way.
pub fn chi_square_test(table: &ContingencyTable) -> ChiSquareResult {
    let rows = table.categories.len();
    let cols = 2;
    let dof = rows.saturating_sub(1) * (cols - 1);

    if dof == 0 {
        return ChiSquareResult {
            statistic: 0.0,
            p_value: 1.0,
            dof: 0,
        };
    }

    let row_totals = table.row_totals();
    let col_totals = table.col_totals();
    let n = table.grand_total() as f64;

    let mut statistic = 0.0;
    for (i, row) in table.counts.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let expected = row_totals[i] as f64 * col_totals[j] as f64 / n;
            // A zero expected count means the whole margin is empty; the cell
            // carries no information and must not produce 0/0.
            if expected > 0.0 {
                let d = observed as f64 - expected;
                statistic += d * d / expected;
            }
        }
    }

    // dof >= 1 here, so the distribution is always constructible.
    let p_value = match ChiSquared::new(dof as f64) {
        Ok(dist) => 1.0 - dist.cdf(statistic),
        Err(_) => f64::NAN,
    };

    ChiSquareResult {
        statistic,
        p_value,
        dof,
    }
}
