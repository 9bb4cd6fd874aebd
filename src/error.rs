use std::path::PathBuf;

/// Errors produced while compiling a diagram or moving it through the CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Strict mode rejects documents containing lines no rule accepts.
    #[error("{count} unrecognized line(s); first at line {line_number}: `{text}`")]
    UnrecognizedLines {
        count: usize,
        line_number: usize,
        text: String,
    },

    #[error("unknown edge grammar `{0}` (expected `full` or `simplified`)")]
    UnknownEdgeGrammar(String),

    #[error("unknown direction `{0}` (expected `LR` or `TB`)")]
    UnknownDirection(String),

    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read stdin: {0}")]
    ReadStdin(std::io::Error),

    #[error("failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write stdout: {0}")]
    WriteStdout(std::io::Error),
}
