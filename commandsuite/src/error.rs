use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("The command suite has not been initialized for this session")]
    NotInitialized,

    #[error("The command suite has already been initialized")]
    AlreadyInitialized,

    #[error("The refactor request was cancelled")]
    Cancelled,

    #[error("Unable to apply document edits: {0}")]
    EditConflict(String),

    #[error("Another menu already owns the alternate screen buffer")]
    MenuActive,

    #[error("The UI thread is no longer accepting requests")]
    ControllerClosed,

    #[error("Refactor task panicked: {0}")]
    TaskPanicked(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SuiteError {
    /// Whether this error represents the user (or host) backing out of the
    /// request rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        match self {
            SuiteError::Cancelled => true,
            SuiteError::Other(err) => matches!(
                err.downcast_ref::<SuiteError>(),
                Some(SuiteError::Cancelled)
            ),
            _ => false,
        }
    }
}

pub type Result<T, E = SuiteError> = std::result::Result<T, E>;
