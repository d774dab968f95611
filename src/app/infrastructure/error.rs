use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of an external style-check run.
///
/// Crashes and timeouts carry whatever the tool printed before it failed so
/// the lint panel can show it next to the failure description.
#[derive(Error, Debug)]
pub enum LintError {
    #[error("No style checker command configured")]
    EmptyCommand,

    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` did not finish within {secs}s and was killed")]
    Timeout {
        program: String,
        secs: u64,
        output: String,
    },

    #[error("`{program}` terminated abnormally ({status})")]
    Crashed {
        program: String,
        status: String,
        output: String,
    },
}

impl LintError {
    /// Flatten the failure into the text shown in the lint panel: captured
    /// tool output first, then the failure description.
    pub fn into_report(self) -> String {
        let description = self.to_string();
        match self {
            LintError::Crashed { output, .. } | LintError::Timeout { output, .. }
                if !output.is_empty() =>
            {
                format!("{}\n{}", output.trim_end(), description)
            }
            _ => description,
        }
    }
}
