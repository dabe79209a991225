use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::result::RawOcrResult;

/// Model preset requested from the external engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelPreset {
    /// Larger detection/recognition models, slower and more accurate.
    #[default]
    Server,
    /// Lightweight models meant for CPU-only hosts.
    Mobile,
}

impl ModelPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelPreset::Server => "server",
            ModelPreset::Mobile => "mobile",
        }
    }
}

impl fmt::Display for ModelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
    Gpu,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Gpu => "gpu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings handed to the engine untouched. None of them change how the
/// caller orders or isolates work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub model: ModelPreset,
    pub device: Device,
    pub cpu_threads: Option<usize>,
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("engine error: {0}")]
    EngineError(String),
    #[error("malformed engine output: {0}")]
    MalformedOutput(String),
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &Path) -> Result<RawOcrResult, OcrError>;
}
