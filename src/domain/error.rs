//! Domain error types.
//!
//! Configuration faults are the only class that aborts a run; data faults are
//! handled in the engine by dropping the affected signal and continuing.

/// Top-level error type for sigeval.
#[derive(Debug, thiserror::Error)]
pub enum SigevalError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("variant {variant_id} ({name}): {reason}")]
    Variant {
        variant_id: usize,
        name: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SigevalError> for std::process::ExitCode {
    fn from(err: &SigevalError) -> Self {
        let code: u8 = match err {
            SigevalError::Io(_) => 1,
            SigevalError::ConfigParse { .. }
            | SigevalError::ConfigMissing { .. }
            | SigevalError::ConfigInvalid { .. } => 2,
            SigevalError::Data { .. } => 3,
            SigevalError::Variant { .. } => 4,
            SigevalError::Report { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
