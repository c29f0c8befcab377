use thiserror::Error;

/// Errors raised by the normalisation and model-building stages.
///
/// The Solver Driver does not use this type for an infeasible or
/// timed-out search — that is a [`crate::solver::SolveStatus`], not an
/// error — per the error-handling design, only schema/normalisation
/// problems and internal model-size limits are hard failures.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("missing field `{field}` on {entity}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("unparsable value for `{field}` on {entity}: {value}")]
    UnparsableValue {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("unknown shift reference `{0}`")]
    UnknownShift(String),

    #[error("unknown worker reference `{0}`")]
    UnknownWorker(String),

    #[error("model too large: {0}")]
    ModelTooLarge(String),

    #[error("CP backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RosterError>;
