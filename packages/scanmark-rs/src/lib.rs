//! # scanmark-rs
//!
//! Batch OCR for folders of page images. Images are picked up in natural
//! numeric order (`page2.png` before `page10.png`), optionally narrowed to a
//! page range, sent one by one through an external OCR engine, and the
//! recognized text is collected into a single Markdown document.
//!
//! A single unreadable image never stops a batch: its section in the report
//! carries a placeholder instead of text.
//!
//! ## Quick Start
//!
//! ```ignore
//! use scanmark_rs::prelude::*;
//! use scanmark_ocr::{CommandEngine, EngineConfig};
//!
//! let engine = CommandEngine::connect("paddleocr-bridge", EngineConfig::default())?;
//! let options = BatchOptions {
//!     input_dir: "scans".into(),
//!     output_file_path: "scans.md".into(),
//!     page_range: Some("1-10".into()),
//!     ..Default::default()
//! };
//! let runner = BatchRunner::new(engine, options, RunLog::start("logs".as_ref(), ConsoleEcho::Verbose));
//! match runner.run().await? {
//!     BatchOutcome::Completed(summary) => println!("{} failed", summary.failed()),
//!     other => std::process::exit(other.exit_code()),
//! }
//! ```

pub mod batch_runner;
pub mod error;
pub mod image_files;
pub mod page_range;
pub mod report;
pub mod run_log;
pub mod text_normalizer;

// Re-export commonly used types at the root level
pub use batch_runner::{
  recognize_image, BatchOptions, BatchOutcome, BatchRunner, BatchSummary, ItemOutcome, RecognitionRecord,
  INTERRUPTED_EXIT_CODE,
};
pub use error::BatchError;
pub use image_files::{list_images, FilePattern, ImageReference, SortKey};
pub use page_range::{parse_page_range, PageRangeError, PageSet};
pub use report::{BatchReport, ReportSection, DEFAULT_TITLE, EMPTY_TEXT_PLACEHOLDER};
pub use run_log::{ConsoleEcho, RunLog};
pub use text_normalizer::normalize;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```ignore
/// use scanmark_rs::prelude::*;
/// ```
pub mod prelude {
  pub use crate::{
    list_images, normalize, parse_page_range, recognize_image, BatchError, BatchOptions, BatchOutcome, BatchReport,
    BatchRunner, BatchSummary, ConsoleEcho, FilePattern, ImageReference, ItemOutcome, PageSet, RecognitionRecord,
    ReportSection, RunLog,
  };
}
