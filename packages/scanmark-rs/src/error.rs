use std::io;
use std::path::PathBuf;

use scanmark_ocr::OcrError;
use thiserror::Error;

use crate::page_range::PageRangeError;

/// Failures that end a batch run. Per-image OCR problems never surface here.
#[derive(Debug, Error)]
pub enum BatchError {
  #[error(transparent)]
  PageRange(#[from] PageRangeError),

  #[error("invalid file pattern {pattern:?}: {source}")]
  Pattern {
    pattern: String,
    #[source]
    source: regex::Error,
  },

  #[error("cannot list input directory {}: {source}", path.display())]
  ListDirectory {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("input path is not a directory: {}", .0.display())]
  NotADirectory(PathBuf),

  #[error("OCR engine failed to initialize: {0}")]
  EngineInit(#[from] OcrError),

  #[error("cannot write report {}: {source}", path.display())]
  WriteReport {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}
