//! Markdown assembly of the per-image results.
use crate::error::BatchError;
use chrono::{DateTime, Local};
use std::path::Path;
use tokio::fs;

/// Shown in place of the text for images that produced none.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "(no text recognized)";

pub const DEFAULT_TITLE: &str = "OCR Results";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
  pub file_name: String,
  pub text: String,
}

/// The finished document: a title, when it was generated, and one section
/// per processed image in processing order.
#[derive(Debug, Clone)]
pub struct BatchReport {
  title: String,
  generated_at: DateTime<Local>,
  sections: Vec<ReportSection>,
}

impl BatchReport {
  pub fn new(title: impl Into<String>, generated_at: DateTime<Local>, sections: Vec<ReportSection>) -> Self {
    Self {
      title: title.into(),
      generated_at,
      sections,
    }
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn sections(&self) -> &[ReportSection] {
    &self.sections
  }

  pub fn render(&self) -> String {
    let mut markdown = format!(
      "# {}\n\nGenerated: {}\n\n---\n\n",
      self.title,
      self.generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    for section in &self.sections {
      let text = section.text.trim();
      let body = if text.is_empty() { EMPTY_TEXT_PLACEHOLDER } else { text };
      markdown.push_str(&format!("## {}\n\n{}\n\n---\n\n", section.file_name, body));
    }

    markdown
  }

  /// Writes the rendered report to `path`, replacing any existing file and
  /// creating missing parent directories.
  pub async fn write_to(&self, path: &Path) -> Result<(), BatchError> {
    let write_error = |source| BatchError::WriteReport {
      path: path.to_path_buf(),
      source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    fs::write(path, self.render()).await.map_err(write_error)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
  }

  fn section(file_name: &str, text: &str) -> ReportSection {
    ReportSection {
      file_name: file_name.to_string(),
      text: text.to_string(),
    }
  }

  #[test]
  fn test_render_layout() {
    let report = BatchReport::new(
      "Glossary",
      fixed_time(),
      vec![section("0032.png", "A\n\nB"), section("0033.png", "")],
    );

    let expected = "# Glossary\n\n\
      Generated: 2024-03-09 14:05:07\n\n\
      ---\n\n\
      ## 0032.png\n\nA\n\nB\n\n---\n\n\
      ## 0033.png\n\n(no text recognized)\n\n---\n\n";
    assert_eq!(report.render(), expected);
  }

  #[test]
  fn test_render_without_sections() {
    let report = BatchReport::new("Empty", fixed_time(), vec![]);
    assert_eq!(report.render(), "# Empty\n\nGenerated: 2024-03-09 14:05:07\n\n---\n\n");
  }

  #[tokio::test]
  async fn test_write_creates_parents_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/nested/report.md");

    let first = BatchReport::new("First", fixed_time(), vec![section("1.png", "one")]);
    first.write_to(&path).await.unwrap();
    let second = BatchReport::new("Second", fixed_time(), vec![section("2.png", "two")]);
    second.write_to(&path).await.unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# Second\n"));
    assert!(!written.contains("First"));
    assert!(written.contains("## 2.png\n\ntwo\n"));
  }

  #[tokio::test]
  async fn test_write_to_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").unwrap();

    let report = BatchReport::new("X", fixed_time(), vec![]);
    let err = report.write_to(&blocker.join("report.md")).await.unwrap_err();
    assert!(matches!(err, BatchError::WriteReport { .. }));
  }
}
