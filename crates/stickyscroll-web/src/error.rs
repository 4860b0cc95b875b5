use thiserror::Error;

pub type Result<T> = std::result::Result<T, BootError>;

/// Why the binding could not attach to the page.
///
/// Boot stops at the first failure and leaves the page as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BootError {
    #[error("no global window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("document has no body")]
    NoBody,

    #[error("sticky scroll is already running on this page")]
    AlreadyStarted,

    #[error("JS exception while {stage}: {message}")]
    Js { stage: &'static str, message: String },
}

impl BootError {
    #[must_use]
    pub fn js(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Js {
            stage,
            message: message.into(),
        }
    }
}
