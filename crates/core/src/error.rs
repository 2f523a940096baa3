//! Error types shared by the inference pipeline and artifact loading.

/// Failure of a single `generate_profile` run.
///
/// `InvalidRequest` is caller input; everything else signals a problem with
/// the loaded artifacts or the model output and is never the caller's fault.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Shape mismatch in {stage}: expected width {expected}, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("Degenerate profile: {0}")]
    DegenerateProfile(String),
}

/// Failure while loading a scaler or model artifact from disk.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact {path}: {reason}")]
    Invalid { path: String, reason: String },
}

/// Read and deserialize a JSON artifact, attaching the path to any error.
pub fn read_json_artifact<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> Result<T, ArtifactError> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: display,
        source,
    })
}
