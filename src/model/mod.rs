//! Regression engine: design-matrix construction and the logistic fit.

pub mod design;
pub mod logit;

pub use design::{DesignMatrix, build_design_matrix};
pub use logit::fit_logit;
