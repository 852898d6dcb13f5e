/// Errors returned by the estimators and the least-squares solver.
///
/// Every variant describes a violated input contract. Rank deficiency is not
/// an error: the solver returns the minimum-norm solution instead.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    /// Fewer correspondences than unknowns allow.
    #[error("need at least {required} correspondences, got {found}")]
    InsufficientData { required: usize, found: usize },

    /// A record does not hold exactly `(u, v, x, y, z)`.
    #[error("correspondence {index} has {components} components, expected 5")]
    MalformedCorrespondence { index: usize, components: usize },

    /// A record component is not a real number.
    #[error("component {component} of correspondence {index} is not a number")]
    NonNumericElement { index: usize, component: usize },

    /// Records were not given as a sequence.
    #[error("correspondence records must be a sequence")]
    NotASequence,

    #[error("coefficient matrix has {a_rows} rows but target vector has {b_rows}")]
    DimensionMismatch { a_rows: usize, b_rows: usize },

    /// NaN or infinity in `[A | B]`; column `A.ncols()` is the target vector.
    #[error("linear system entry ({row}, {column}) is not finite")]
    NonFiniteEntry { row: usize, column: usize },

    #[error("degenerate point configuration: {0}")]
    DegenerateConfiguration(String),

    #[error("singular value decomposition failed: {0}")]
    SvdFailed(String),

    #[error("failed to parse records: {0}")]
    Json(#[from] serde_json::Error),
}
