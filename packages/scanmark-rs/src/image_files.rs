//! Discovery of the images to process: glob matching, natural numeric
//! ordering and page filtering.
use crate::error::BatchError;
use crate::page_range::PageSet;
use regex::Regex;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;
use walkdir::WalkDir;

static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();

fn digit_run_regex() -> &'static Regex {
  DIGIT_RUN.get_or_init(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"))
}

/// Every maximal run of ASCII digits in `s`, left to right. Runs that do not
/// fit in a `u64` saturate.
pub fn digit_runs(s: &str) -> Vec<u64> {
  digit_run_regex()
    .find_iter(s)
    .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
    .collect()
}

/// Ordering key for natural numeric sorting. Names without any digits sort
/// after every name that has some.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
  Numbers(Vec<u64>),
  NoDigits,
}

impl SortKey {
  pub fn from_stem(stem: &str) -> Self {
    let runs = digit_runs(stem);
    if runs.is_empty() {
      SortKey::NoDigits
    } else {
      SortKey::Numbers(runs)
    }
  }
}

/// One input image selected for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
  file_name: String,
  path: PathBuf,
  sort_key: SortKey,
  page_number: Option<u64>,
}

impl ImageReference {
  pub fn new(path: PathBuf) -> Self {
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let stem = path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_default();
    let sort_key = SortKey::from_stem(&stem);
    let page_number = match &sort_key {
      SortKey::Numbers(runs) => runs.last().copied(),
      SortKey::NoDigits => None,
    };

    Self {
      file_name,
      path,
      sort_key,
      page_number,
    }
  }

  pub fn file_name(&self) -> &str {
    &self.file_name
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn sort_key(&self) -> &SortKey {
    &self.sort_key
  }

  /// The last number embedded in the file stem, read as a 1-based page.
  pub fn page_number(&self) -> Option<u64> {
    self.page_number
  }
}

/// Shell-style pattern matched against bare file names. Supports `*`, `?`,
/// `[...]` classes (`[0-9]`, `[!a]`) and `{a,b}` alternatives.
#[derive(Debug, Clone)]
pub struct FilePattern {
  pattern: String,
  regex: Regex,
}

impl FilePattern {
  pub fn new(pattern: &str) -> Result<Self, BatchError> {
    let regex = Regex::new(&glob_to_regex(pattern)).map_err(|source| BatchError::Pattern {
      pattern: pattern.to_string(),
      source,
    })?;
    Ok(Self {
      pattern: pattern.to_string(),
      regex,
    })
  }

  pub fn as_str(&self) -> &str {
    &self.pattern
  }

  pub fn matches(&self, file_name: &str) -> bool {
    self.regex.is_match(file_name)
  }
}

fn glob_to_regex(pattern: &str) -> String {
  let chars: Vec<char> = pattern.chars().collect();
  let mut out = String::from("^");
  let mut depth = 0usize;
  let mut i = 0;
  while i < chars.len() {
    match chars[i] {
      '*' => out.push_str("[^/]*"),
      '?' => out.push_str("[^/]"),
      '[' => match char_class(&chars[i + 1..]) {
        Some((class, consumed)) => {
          out.push_str(&class);
          i += consumed;
        }
        None => out.push_str(r"\["),
      },
      '{' => {
        depth += 1;
        out.push_str("(?:");
      }
      '}' if depth > 0 => {
        depth -= 1;
        out.push(')');
      }
      ',' if depth > 0 => out.push('|'),
      c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
    }
    i += 1;
  }
  out.push('$');
  out
}

/// Translates the body of a `[...]` class (everything after the `[`).
/// Returns the regex class and the number of chars consumed up to and
/// including the closing `]`, or `None` when the class is never closed.
fn char_class(rest: &[char]) -> Option<(String, usize)> {
  let mut class = String::from("[");
  let mut i = 0;
  if matches!(rest.first(), Some('!') | Some('^')) {
    class.push('^');
    i += 1;
  }
  let body_start = i;
  while i < rest.len() {
    let c = rest[i];
    // A `]` right after the opening bracket is a literal member.
    if c == ']' && i > body_start {
      class.push(']');
      return Some((class, i + 1));
    }
    match c {
      '-' if i > body_start && rest.get(i + 1).is_some_and(|n| *n != ']') => class.push('-'),
      '\\' | '^' | '[' | ']' | '&' | '~' | '-' => {
        class.push('\\');
        class.push(c);
      }
      c => class.push(c),
    }
    i += 1;
  }
  None
}

fn compare_images(a: &ImageReference, b: &ImageReference) -> Ordering {
  a.sort_key.cmp(&b.sort_key)
}

/// Lists the regular files directly inside `dir` whose name matches
/// `pattern`, in natural numeric order, keeping only the pages in `filter`
/// when one is given.
pub fn list_images(dir: &Path, pattern: &FilePattern, filter: Option<&PageSet>) -> Result<Vec<ImageReference>, BatchError> {
  let list_error = |source: std::io::Error| BatchError::ListDirectory {
    path: dir.to_path_buf(),
    source,
  };

  let root = dir.canonicalize().map_err(list_error)?;
  if !root.is_dir() {
    return Err(BatchError::NotADirectory(dir.to_path_buf()));
  }

  let mut images = Vec::new();
  for entry in WalkDir::new(&root).min_depth(1).max_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|e| list_error(e.into()))?;
    if !entry.file_type().is_file() {
      continue;
    }
    if !pattern.matches(&entry.file_name().to_string_lossy()) {
      continue;
    }
    images.push(ImageReference::new(entry.into_path()));
  }

  // Stable: equal keys keep the byte-wise file name order from the walk.
  images.sort_by(compare_images);

  if let Some(filter) = filter {
    images.retain(|image| image.page_number.is_some_and(|n| filter.contains_page(n)));
  }

  debug!(dir = %root.display(), pattern = pattern.as_str(), count = images.len(), "listed images");
  Ok(images)
}
