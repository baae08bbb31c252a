use thiserror::Error;

/// Failure of a catalogue step.
///
/// Errors are never retried or translated: the driver error is kept as the
/// source and only the label of the step that raised it is attached.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("database operation failed during {step}")]
    Database {
        step: &'static str,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl QueryError {
    pub fn step(&self) -> Option<&'static str> {
        match self {
            QueryError::Database { step, .. } => Some(step),
            QueryError::Config(_) => None,
        }
    }
}

/// Attaches the step label to a fallible driver call.
pub(crate) trait StepContext<T> {
    fn step(self, step: &'static str) -> Result<T, QueryError>;
}

impl<T> StepContext<T> for mongodb::error::Result<T> {
    fn step(self, step: &'static str) -> Result<T, QueryError> {
        self.map_err(|source| QueryError::Database { step, source })
    }
}
