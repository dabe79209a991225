//! Drives one batch: list the images, recognize them one at a time, and save
//! the report. A failing image costs only its own section.
use crate::error::BatchError;
use crate::image_files::{list_images, FilePattern, ImageReference};
use crate::page_range::parse_page_range;
use crate::report::{BatchReport, ReportSection, DEFAULT_TITLE};
use crate::run_log::RunLog;
use crate::text_normalizer::normalize;
use chrono::Local;
use scanmark_ocr::OcrEngine;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Exit status used when the user interrupts a run.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

const PREVIEW_CHARS: usize = 50;

/// Settings for a single batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
  pub input_dir: PathBuf,
  pub pattern: String,
  pub output_file_path: PathBuf,
  pub page_range: Option<String>,
  pub title: String,
  /// Size of the groups progress is reported in. Images are still handled
  /// strictly one after another.
  pub batch_size: usize,
}

impl Default for BatchOptions {
  fn default() -> Self {
    Self {
      input_dir: PathBuf::from("."),
      pattern: String::from("*.png"),
      output_file_path: PathBuf::from("ocr_results.md"),
      page_range: None,
      title: String::from(DEFAULT_TITLE),
      batch_size: 5,
    }
  }
}

/// What happened to one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
  /// The engine answered; `text` is already normalized and may be empty.
  Recognized { text: String },
  /// The engine answered in a shape no text could be read from.
  Unrecognized,
  /// The engine call itself failed.
  Failed { reason: String },
}

impl ItemOutcome {
  pub fn text(&self) -> &str {
    match self {
      ItemOutcome::Recognized { text } => text.as_str(),
      ItemOutcome::Unrecognized | ItemOutcome::Failed { .. } => "",
    }
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, ItemOutcome::Failed { .. })
  }
}

#[derive(Debug, Clone)]
pub struct RecognitionRecord {
  pub image: ImageReference,
  pub outcome: ItemOutcome,
  pub elapsed: Duration,
}

impl RecognitionRecord {
  pub fn text(&self) -> &str {
    self.outcome.text()
  }
}

/// Runs the engine on one image and normalizes whatever text comes back.
/// Never fails: engine errors are folded into the outcome.
pub async fn recognize_image<E: OcrEngine + ?Sized>(engine: &E, image: &ImageReference) -> ItemOutcome {
  match engine.recognize(image.path()).await {
    Ok(raw) => {
      debug!(file = image.file_name(), shape = raw.kind(), "engine answered");
      match raw.into_lines() {
        Some(lines) => ItemOutcome::Recognized {
          text: normalize(&lines),
        },
        None => ItemOutcome::Unrecognized,
      }
    }
    Err(e) => ItemOutcome::Failed { reason: e.to_string() },
  }
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
  pub report_path: PathBuf,
  pub records: Vec<RecognitionRecord>,
  pub elapsed: Duration,
}

impl BatchSummary {
  pub fn failed(&self) -> usize {
    self.records.iter().filter(|r| r.outcome.is_failure()).count()
  }

  pub fn unrecognized(&self) -> usize {
    self
      .records
      .iter()
      .filter(|r| r.outcome == ItemOutcome::Unrecognized)
      .count()
  }
}

#[derive(Debug, Clone)]
pub enum BatchOutcome {
  /// Every selected image was processed and the report was written.
  Completed(BatchSummary),
  /// Nothing matched; no report was written.
  NoImages,
  /// Stopped between images at the user's request; no report was written.
  Interrupted { processed: usize, total: usize },
}

impl BatchOutcome {
  pub fn exit_code(&self) -> i32 {
    match self {
      BatchOutcome::Completed(_) | BatchOutcome::NoImages => 0,
      BatchOutcome::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
    }
  }
}

pub struct BatchRunner<E> {
  engine: E,
  options: BatchOptions,
  log: RunLog,
  cancel: Arc<AtomicBool>,
}

impl<E: OcrEngine> BatchRunner<E> {
  pub fn new(engine: E, options: BatchOptions, log: RunLog) -> Self {
    Self {
      engine,
      options,
      log,
      cancel: Arc::new(AtomicBool::new(false)),
    }
  }

  /// Shares a flag that, once set, stops the run before the next image.
  pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
    self.cancel = cancel;
    self
  }

  pub fn cancel_flag(&self) -> Arc<AtomicBool> {
    Arc::clone(&self.cancel)
  }

  pub fn log(&self) -> &RunLog {
    &self.log
  }

  fn cancelled(&self) -> bool {
    self.cancel.load(Ordering::SeqCst)
  }

  fn fatal(&self, error: BatchError) -> BatchError {
    self.log.error(error.to_string());
    error
  }

  fn select_images(&self) -> Result<Vec<ImageReference>, BatchError> {
    let filter = parse_page_range(self.options.page_range.as_deref()).map_err(|e| self.fatal(e.into()))?;
    let pattern = FilePattern::new(&self.options.pattern).map_err(|e| self.fatal(e))?;

    if let Some(filter) = &filter {
      self.log.info(format!("Page filter: {} page(s) selected", filter.len()));
    }

    let images = list_images(&self.options.input_dir, &pattern, filter.as_ref()).map_err(|e| self.fatal(e))?;
    Ok(images)
  }

  /// Runs the whole batch. Errors are fatal and have already been logged when
  /// they are returned.
  pub async fn run(&self) -> Result<BatchOutcome, BatchError> {
    let started = Instant::now();

    self.log.info(format!("Input directory: {}", self.options.input_dir.display()));
    self.log.info(format!("File pattern: {}", self.options.pattern));
    self.log.info(format!("Output file: {}", self.options.output_file_path.display()));
    if let Some(path) = self.log.path() {
      self.log.info(format!("Log file: {}", path.display()));
    }

    let images = self.select_images()?;
    if images.is_empty() {
      self.log.info("No images matched; nothing to do");
      return Ok(BatchOutcome::NoImages);
    }

    let names = images.iter().map(|i| i.file_name()).collect::<Vec<_>>().join(", ");
    self.log.info(format!("Found {} image(s): {}", images.len(), names));

    let total = images.len();
    let batch_size = self.options.batch_size.max(1);
    let total_batches = total.div_ceil(batch_size);
    let mut records = Vec::with_capacity(total);

    for (index, image) in images.into_iter().enumerate() {
      if self.cancelled() {
        self.log.warn(format!("Interrupted after {}/{} image(s); report not written", index, total));
        return Ok(BatchOutcome::Interrupted { processed: index, total });
      }

      let batch = index / batch_size + 1;
      if index % batch_size == 0 {
        self.log.info(format!("Starting batch {}/{}", batch, total_batches));
      }

      self.log.info(format!("[{}/{}] Processing {}", index + 1, total, image.file_name()));
      let item_started = Instant::now();
      let outcome = recognize_image(&self.engine, &image).await;
      let elapsed = item_started.elapsed();
      self.log_outcome(&image, &outcome, elapsed);

      records.push(RecognitionRecord { image, outcome, elapsed });

      if (index + 1) % batch_size == 0 || index + 1 == total {
        self.log.info(format!("Finished batch {}/{}", batch, total_batches));
      }
    }

    if self.cancelled() {
      self.log.warn(format!("Interrupted after {}/{} image(s); report not written", total, total));
      return Ok(BatchOutcome::Interrupted { processed: total, total });
    }

    let sections = records
      .iter()
      .map(|r| ReportSection {
        file_name: r.image.file_name().to_string(),
        text: r.text().to_string(),
      })
      .collect();
    let report = BatchReport::new(self.options.title.clone(), Local::now(), sections);

    self.log.info(format!("Saving report to {}", self.options.output_file_path.display()));
    report
      .write_to(&self.options.output_file_path)
      .await
      .map_err(|e| self.fatal(e))?;

    let summary = BatchSummary {
      report_path: self.options.output_file_path.clone(),
      records,
      elapsed: started.elapsed(),
    };
    self.log.info(format!(
      "Done: {} image(s), {} failed, {} unrecognized, {:.2}s; report at {}",
      summary.records.len(),
      summary.failed(),
      summary.unrecognized(),
      summary.elapsed.as_secs_f64(),
      summary.report_path.display()
    ));

    Ok(BatchOutcome::Completed(summary))
  }

  fn log_outcome(&self, image: &ImageReference, outcome: &ItemOutcome, elapsed: Duration) {
    match outcome {
      ItemOutcome::Recognized { text } => {
        self.log.info(format!("Processed {} in {:.2}s", image.file_name(), elapsed.as_secs_f64()));
        self.log.info(format!("Text: {}", preview(text, PREVIEW_CHARS)));
      }
      ItemOutcome::Unrecognized => {
        self.log.warn(format!(
          "Unrecognized OCR result for {}; recording empty text",
          image.file_name()
        ));
      }
      ItemOutcome::Failed { reason } => {
        self.log.error(format!("Failed to process {}: {}", image.file_name(), reason));
      }
    }
  }
}

/// First `max_chars` characters of `text` on a single line.
pub fn preview(text: &str, max_chars: usize) -> String {
  let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
  if flat.chars().count() > max_chars {
    let head: String = flat.chars().take(max_chars).collect();
    format!("{}...", head)
  } else {
    flat
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use scanmark_ocr::{OcrError, RawOcrResult};
  use serde_json::json;
  use std::path::Path;

  struct EchoEngine;

  #[async_trait]
  impl OcrEngine for EchoEngine {
    async fn recognize(&self, image: &Path) -> Result<RawOcrResult, OcrError> {
      let name = image.file_name().unwrap().to_string_lossy().into_owned();
      match name.as_str() {
        "bad.png" => Err(OcrError::EngineError("decoder crashed".into())),
        "odd.png" => Ok(RawOcrResult::classify(json!({"text": "?"}))),
        _ => Ok(RawOcrResult::classify(json!({"rec_texts": [name, "", "", "tail"]}))),
      }
    }
  }

  #[tokio::test]
  async fn test_recognize_image_outcomes() {
    let ok = recognize_image(&EchoEngine, &ImageReference::new(PathBuf::from("/x/1.png"))).await;
    assert_eq!(ok, ItemOutcome::Recognized { text: "1.png\n\ntail".into() });

    let failed = recognize_image(&EchoEngine, &ImageReference::new(PathBuf::from("/x/bad.png"))).await;
    assert!(failed.is_failure());
    assert_eq!(failed.text(), "");

    let odd = recognize_image(&EchoEngine, &ImageReference::new(PathBuf::from("/x/odd.png"))).await;
    assert_eq!(odd, ItemOutcome::Unrecognized);
    assert_eq!(odd.text(), "");
  }

  #[test]
  fn test_preview() {
    assert_eq!(preview("short\n\ntext", 50), "short text");
    assert_eq!(preview("abcdef", 3), "abc...");
    assert_eq!(preview("", 3), "");
  }

  #[test]
  fn test_exit_codes() {
    assert_eq!(BatchOutcome::NoImages.exit_code(), 0);
    assert_eq!(BatchOutcome::Interrupted { processed: 1, total: 3 }.exit_code(), 130);
  }

  #[tokio::test]
  async fn test_cancelled_before_first_image() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("1.png"), b"").unwrap();
    let out = dir.path().join("report.md");

    let options = BatchOptions {
      input_dir: dir.path().to_path_buf(),
      output_file_path: out.clone(),
      ..Default::default()
    };
    let runner = BatchRunner::new(EchoEngine, options, RunLog::console(crate::ConsoleEcho::Silent));
    runner.cancel_flag().store(true, Ordering::SeqCst);

    let outcome = runner.run().await.unwrap();
    assert!(matches!(outcome, BatchOutcome::Interrupted { processed: 0, total: 1 }));
    assert!(!out.exists());
  }

  /// Raises the cancel flag while recognizing `trigger`, the way a Ctrl-C
  /// arriving mid-image would.
  struct CancellingEngine {
    cancel: Arc<AtomicBool>,
    trigger: &'static str,
  }

  #[async_trait]
  impl OcrEngine for CancellingEngine {
    async fn recognize(&self, image: &Path) -> Result<RawOcrResult, OcrError> {
      if image.file_name().is_some_and(|n| n == self.trigger) {
        self.cancel.store(true, Ordering::SeqCst);
      }
      Ok(RawOcrResult::classify(json!({"rec_texts": ["page"]})))
    }
  }

  #[tokio::test]
  async fn test_cancelled_between_images() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["1.png", "2.png", "3.png"] {
      std::fs::write(dir.path().join(name), b"").unwrap();
    }
    let out = dir.path().join("report.md");

    let cancel = Arc::new(AtomicBool::new(false));
    let engine = CancellingEngine {
      cancel: Arc::clone(&cancel),
      trigger: "2.png",
    };
    let options = BatchOptions {
      input_dir: dir.path().to_path_buf(),
      output_file_path: out.clone(),
      ..Default::default()
    };
    let runner =
      BatchRunner::new(engine, options, RunLog::console(crate::ConsoleEcho::Silent)).with_cancel_flag(cancel);

    let outcome = runner.run().await.unwrap();
    assert!(
      matches!(outcome, BatchOutcome::Interrupted { processed: 2, total: 3 }),
      "got {outcome:?}"
    );
    assert_eq!(outcome.exit_code(), INTERRUPTED_EXIT_CODE);
    assert!(!out.exists());
  }

  #[tokio::test]
  async fn test_invalid_page_range_fails_before_listing() {
    let options = BatchOptions {
      input_dir: PathBuf::from("/definitely/not/here"),
      page_range: Some("abc".into()),
      ..Default::default()
    };
    let runner = BatchRunner::new(EchoEngine, options, RunLog::console(crate::ConsoleEcho::Silent));

    let err = runner.run().await.unwrap_err();
    assert!(matches!(err, BatchError::PageRange(_)), "got {err:?}");
  }
}
