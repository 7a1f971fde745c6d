//! Pipeline error type.

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while driving the external coverage tools.
///
/// A tool that runs but exits non-zero is not an error at this level; it is
/// reported through [`StageResult`](crate::runner::StageResult). This type
/// covers the cases where a child process could not be executed at all.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The stage's child process could not be spawned or awaited.
    #[error("stage '{stage}' failed to execute: {source}")]
    Exec {
        /// Stage name.
        stage: &'static str,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_error_names_the_stage() {
        let err = PipelineError::Exec {
            stage: "capture_post",
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("capture_post"), "unexpected message: {msg}");
        assert!(msg.contains("no such file"), "unexpected message: {msg}");
    }
}
