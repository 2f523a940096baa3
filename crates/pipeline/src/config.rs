use std::path::PathBuf;

/// Default name of the output tensor holding the generated profile.
pub const DEFAULT_OUTPUT_KEY: &str = "dense";

/// Runtime used to evaluate the frozen model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    /// JSON-exported dense head evaluated in-process.
    Dense,
    /// ONNX Runtime (requires the `onnx` feature).
    Onnx,
}

impl std::str::FromStr for ModelBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dense" => Ok(Self::Dense),
            "onnx" => Ok(Self::Onnx),
            other => Err(format!("unknown model backend '{other}'")),
        }
    }
}

/// Location and shape of the model artifacts.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Directory holding the scaler artifacts and the model file.
    pub dir: PathBuf,
    pub backend: ModelBackend,
    /// Output tensor read from the model's output map.
    pub output_key: String,
}

impl ModelConfig {
    /// Load model configuration from environment variables.
    ///
    /// | Env Var            | Required | Default |
    /// |--------------------|----------|---------|
    /// | `MODEL_DIR`        | **yes**  | --      |
    /// | `MODEL_BACKEND`    | no       | `dense` |
    /// | `MODEL_OUTPUT_KEY` | no       | `dense` |
    ///
    /// # Panics
    ///
    /// Panics if `MODEL_DIR` is unset or `MODEL_BACKEND` is not recognised.
    pub fn from_env() -> Self {
        let dir = std::env::var("MODEL_DIR").expect("MODEL_DIR must be set in the environment");

        let backend = std::env::var("MODEL_BACKEND")
            .unwrap_or_else(|_| "dense".into())
            .parse()
            .unwrap_or_else(|e| panic!("MODEL_BACKEND: {e}"));

        let output_key =
            std::env::var("MODEL_OUTPUT_KEY").unwrap_or_else(|_| DEFAULT_OUTPUT_KEY.into());

        Self {
            dir: PathBuf::from(dir),
            backend,
            output_key,
        }
    }
}
