//! Design-matrix construction for the return-probability regression.
//!
//! Columns, in order: intercept, `price`, `seller_rating`, then one-hot
//! columns for `category`, `region`, and `payment_method`. Levels of each
//! categorical predictor are taken in lexicographic order and the first
//! level is dropped as the reference. The ordering is a correctness
//! requirement: a nondeterministic dropped level would make fitted
//! coefficients non-reproducible across runs on identical input.
//!
//! Everything is encoded into one `f64` matrix before the solver runs;
//! there is no mixed-type column to trip over downstream.

use std::collections::BTreeSet;

use nalgebra::{DMatrix, DVector};

use crate::domain::OrderRecord;
use crate::error::AppError;

/// Encoded predictors plus the outcome vector, ready for the solver.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    /// Column names, aligned with the columns of `x`.
    pub columns: Vec<String>,
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
}

struct CategoricalSpec {
    name: &'static str,
    value_of: fn(&OrderRecord) -> &str,
}

const CATEGORICALS: [CategoricalSpec; 3] = [
    CategoricalSpec {
        name: "category",
        value_of: |r| &r.category,
    },
    CategoricalSpec {
        name: "region",
        value_of: |r| &r.region,
    },
    CategoricalSpec {
        name: "payment_method",
        value_of: |r| &r.payment_method,
    },
];

/// Build the numeric design matrix for `is_returned ~ price + seller_rating
/// + category + region + payment_method`.
///
/// Fails with `SingularDesignMatrix` when:
/// - the record set is empty,
/// - a categorical predictor has a single observed level (its encoding is
///   degenerate after filtering), or
/// - the encoded matrix is numerically rank-deficient.
pub fn build_design_matrix(records: &[OrderRecord]) -> Result<DesignMatrix, AppError> {
    if records.is_empty() {
        return Err(AppError::singular_design_matrix(
            "Cannot build a design matrix from an empty record set.",
        ));
    }

    let mut columns = vec![
        "const".to_string(),
        "price".to_string(),
        "seller_rating".to_string(),
    ];

    // Per-predictor encoded levels: sorted, reference (first) dropped.
    let mut encoded_levels: Vec<(usize, Vec<String>)> = Vec::new();
    for (i, spec) in CATEGORICALS.iter().enumerate() {
        let levels: BTreeSet<&str> = records.iter().map(|r| (spec.value_of)(r)).collect();
        if levels.len() < 2 {
            return Err(AppError::singular_design_matrix(format!(
                "Predictor `{}` has a single observed level; its encoding is degenerate.",
                spec.name
            )));
        }
        let kept: Vec<String> = levels.into_iter().skip(1).map(str::to_string).collect();
        for level in &kept {
            columns.push(format!("{}[{}]", spec.name, level));
        }
        encoded_levels.push((i, kept));
    }

    let n = records.len();
    let p = columns.len();
    let mut x = DMatrix::zeros(n, p);
    let mut y = DVector::zeros(n);

    for (row, r) in records.iter().enumerate() {
        x[(row, 0)] = 1.0;
        x[(row, 1)] = r.price;
        x[(row, 2)] = r.seller_rating;

        let mut col = 3;
        for (spec_idx, kept) in &encoded_levels {
            let value = (CATEGORICALS[*spec_idx].value_of)(r);
            for level in kept {
                if value == level {
                    x[(row, col)] = 1.0;
                }
                col += 1;
            }
        }

        y[row] = r.outcome();
    }

    let rank = crate::math::rank(&x, 1e-9);
    if rank < p {
        return Err(AppError::singular_design_matrix(format!(
            "Design matrix is rank-deficient (rank {rank} of {p} columns)."
        )));
    }

    Ok(DesignMatrix { columns, x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn order(
        category: &str,
        region: &str,
        payment: &str,
        price: f64,
        rating: f64,
        returned: bool,
    ) -> OrderRecord {
        OrderRecord {
            order_id: "O".to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            customer_id: "C".to_string(),
            seller_id: "S".to_string(),
            category: category.to_string(),
            region: region.to_string(),
            payment_method: payment.to_string(),
            price,
            seller_rating: rating,
            is_returned: returned,
        }
    }

    fn varied_records() -> Vec<OrderRecord> {
        vec![
            order("Books", "East", "UPI", 10.0, 4.0, true),
            order("Toys", "West", "COD", 20.0, 3.5, false),
            order("Books", "West", "COD", 15.0, 4.5, false),
            order("Toys", "East", "UPI", 25.0, 3.0, true),
            order("Books", "East", "COD", 12.0, 4.2, false),
            order("Toys", "West", "UPI", 18.0, 3.8, true),
            order("Books", "West", "UPI", 22.0, 4.1, false),
            order("Toys", "East", "COD", 9.0, 3.2, false),
        ]
    }

    #[test]
    fn column_layout_is_deterministic() {
        let design = build_design_matrix(&varied_records()).unwrap();
        assert_eq!(
            design.columns,
            vec![
                "const",
                "price",
                "seller_rating",
                "category[Toys]",
                "region[West]",
                "payment_method[UPI]",
            ]
        );
        assert_eq!(design.x.nrows(), 8);
        assert_eq!(design.x.ncols(), 6);
    }

    #[test]
    fn reference_level_is_first_in_sorted_order() {
        // "Books" < "Toys", so Books is the dropped reference; the Toys
        // column must be 1 exactly for Toys rows.
        let design = build_design_matrix(&varied_records()).unwrap();
        let toys_col = design.columns.iter().position(|c| c == "category[Toys]").unwrap();
        assert_eq!(design.x[(0, toys_col)], 0.0);
        assert_eq!(design.x[(1, toys_col)], 1.0);
    }

    #[test]
    fn encoding_is_stable_under_row_reordering() {
        let mut reversed = varied_records();
        reversed.reverse();
        let a = build_design_matrix(&varied_records()).unwrap();
        let b = build_design_matrix(&reversed).unwrap();
        assert_eq!(a.columns, b.columns);
    }

    #[test]
    fn intercept_and_outcome_are_populated() {
        let design = build_design_matrix(&varied_records()).unwrap();
        for row in 0..design.x.nrows() {
            assert_eq!(design.x[(row, 0)], 1.0);
        }
        assert_eq!(design.y[0], 1.0);
        assert_eq!(design.y[1], 0.0);
    }

    #[test]
    fn single_level_predictor_is_singular() {
        // All rows share one region after "filtering".
        let records = vec![
            order("Books", "East", "UPI", 10.0, 4.0, true),
            order("Toys", "East", "COD", 20.0, 3.5, false),
        ];
        let err = build_design_matrix(&records).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SingularDesignMatrix);
        assert!(err.to_string().contains("region"));
    }

    #[test]
    fn empty_records_are_singular() {
        let err = build_design_matrix(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SingularDesignMatrix);
    }

    #[test]
    fn numerically_collinear_matrix_is_singular() {
        // price is constant and therefore collinear with the intercept.
        let records: Vec<OrderRecord> = varied_records()
            .into_iter()
            .map(|mut r| {
                r.price = 5.0;
                r
            })
            .collect();
        let err = build_design_matrix(&records).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SingularDesignMatrix);
    }
}
