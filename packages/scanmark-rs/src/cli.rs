//! Command line arguments backing the `scanmark` binary.
use clap::{Parser, ValueEnum};
use scanmark_ocr::{Device, EngineConfig, ModelPreset};
use scanmark_rs::{BatchOptions, ConsoleEcho, DEFAULT_TITLE};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
  name = "scanmark",
  about = "Recognize a folder of page images and collect the text into one Markdown file",
  version
)]
pub struct Args {
  /// Directory holding the images
  #[arg(long)]
  pub input_dir: PathBuf,

  /// Glob selecting the images inside the input directory
  #[arg(long, default_value = "*.png")]
  pub pattern: String,

  /// Markdown file to write
  #[arg(long)]
  pub out: PathBuf,

  /// Model preset requested from the OCR engine
  #[arg(long, value_enum, default_value_t = ModelArg::Server)]
  pub model: ModelArg,

  /// Images per progress group; processing is always sequential
  #[arg(long, default_value_t = 5)]
  pub batch_size: usize,

  /// Device the OCR engine should run on
  #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
  pub device: DeviceArg,

  /// CPU threads for the OCR engine
  #[arg(long)]
  pub cpu_threads: Option<usize>,

  /// Pages to process, 1-based, e.g. "1-3,7"
  #[arg(long)]
  pub page_range: Option<String>,

  /// Heading of the generated document
  #[arg(long, default_value = DEFAULT_TITLE)]
  pub title: String,

  /// Directory for the run log
  #[arg(long, default_value = "logs")]
  pub log_dir: PathBuf,

  /// OCR bridge program
  #[arg(long, env = "SCANMARK_ENGINE", default_value = "paddleocr-bridge")]
  pub engine: PathBuf,

  /// Only print warnings and errors
  #[arg(long, short = 'q')]
  pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelArg {
  Server,
  Mobile,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceArg {
  Cpu,
  Gpu,
}

impl From<ModelArg> for ModelPreset {
  fn from(model: ModelArg) -> Self {
    match model {
      ModelArg::Server => ModelPreset::Server,
      ModelArg::Mobile => ModelPreset::Mobile,
    }
  }
}

impl From<DeviceArg> for Device {
  fn from(device: DeviceArg) -> Self {
    match device {
      DeviceArg::Cpu => Device::Cpu,
      DeviceArg::Gpu => Device::Gpu,
    }
  }
}

impl Args {
  pub fn batch_options(&self) -> BatchOptions {
    BatchOptions {
      input_dir: self.input_dir.clone(),
      pattern: self.pattern.clone(),
      output_file_path: self.out.clone(),
      page_range: self.page_range.clone(),
      title: self.title.clone(),
      batch_size: self.batch_size,
    }
  }

  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig {
      model: self.model.into(),
      device: self.device.into(),
      cpu_threads: self.cpu_threads,
    }
  }

  pub fn echo(&self) -> ConsoleEcho {
    if self.quiet {
      ConsoleEcho::Quiet
    } else {
      ConsoleEcho::Verbose
    }
  }
}
