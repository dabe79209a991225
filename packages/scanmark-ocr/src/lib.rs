pub mod command;
pub mod engine;
pub mod result;

pub use command::CommandEngine;
pub use engine::{Device, EngineConfig, ModelPreset, OcrEngine, OcrError};
pub use result::RawOcrResult;
