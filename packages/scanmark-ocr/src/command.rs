use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::engine::{EngineConfig, OcrEngine, OcrError};
use crate::result::RawOcrResult;

/// Engine backed by an external bridge program.
///
/// The program is run once per image as
/// `<program> --model <preset> --device <device> [--cpu-threads <n>] --image <path>`
/// and must print a single JSON document on stdout.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    config: EngineConfig,
}

impl CommandEngine {
    /// Resolves `program` (a path, or a bare name looked up on `PATH`) to an
    /// executable and returns an engine ready to take images.
    pub fn connect(program: impl AsRef<Path>, config: EngineConfig) -> Result<Self, OcrError> {
        let requested = program.as_ref();
        let program = which::which(requested).map_err(|e| {
            OcrError::Unavailable(format!("OCR bridge program {}: {}", requested.display(), e))
        })?;
        debug!(program = %program.display(), ?config, "connected OCR bridge");
        Ok(Self { program, config })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn command(&self, image: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--model")
            .arg(self.config.model.as_str())
            .arg("--device")
            .arg(self.config.device.as_str());
        if let Some(threads) = self.config.cpu_threads {
            command.arg("--cpu-threads").arg(threads.to_string());
        }
        command.arg("--image").arg(image);
        command
    }
}

#[async_trait]
impl OcrEngine for CommandEngine {
    async fn recognize(&self, image: &Path) -> Result<RawOcrResult, OcrError> {
        if !image.is_file() {
            return Err(OcrError::InvalidInput(format!("not a file: {}", image.display())));
        }

        debug!(image = %image.display(), "running OCR bridge");
        let output = self
            .command(image)
            .output()
            .await
            .map_err(|e| OcrError::EngineError(format!("failed to run {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::EngineError(format!(
                "bridge exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let value: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| OcrError::MalformedOutput(e.to_string()))?;
        let raw = RawOcrResult::classify(value);
        debug!(image = %image.display(), shape = raw.kind(), "classified OCR result");
        Ok(raw)
    }
}
