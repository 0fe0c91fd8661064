//! Crate-wide error type.
//!
//! Every failure carries a structured kind so callers can tell
//! fatal-to-the-run failures (bad input file) apart from failures that only
//! abort one pipeline stage (a degenerate or non-converging regression).
//! The process exit code is derived from the kind.

/// Classification of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input source unreadable or required columns absent. Fatal to the run.
    DataLoad,
    /// A CLI argument or configuration value is invalid.
    InvalidArgument,
    /// The regression design matrix is rank-deficient (e.g., a categorical
    /// predictor with a single observed level after filtering).
    SingularDesignMatrix,
    /// The logistic solver exhausted its iteration budget.
    NonConvergence,
    /// Writing a report/export artifact failed.
    Export,
}

impl ErrorKind {
    /// Process exit code for this failure class.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::DataLoad | ErrorKind::InvalidArgument => 2,
            ErrorKind::SingularDesignMatrix | ErrorKind::NonConvergence | ErrorKind::Export => 4,
        }
    }

    /// Whether this failure only aborts the regression stage.
    ///
    /// The pipeline keeps producing aggregation and association-test output
    /// when the regression fails this way.
    pub fn is_stage_local(self) -> bool {
        matches!(self, ErrorKind::SingularDesignMatrix | ErrorKind::NonConvergence)
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn data_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataLoad, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn singular_design_matrix(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SingularDesignMatrix, message)
    }

    pub fn non_convergence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NonConvergence, message)
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Export, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
