//! Cleanup of recognized text before it lands in the report.
use regex::Regex;
use std::sync::OnceLock;

static EXCESS_BREAKS: OnceLock<Regex> = OnceLock::new();

fn excess_breaks() -> &'static Regex {
  EXCESS_BREAKS.get_or_init(|| Regex::new(r"\n{3,}").expect("line break pattern is valid"))
}

/// Joins recognized lines into paragraphs.
///
/// Lines are separated by one blank line, every line is trimmed, and no more
/// than one blank line ever separates two non-blank lines. The result has no
/// leading or trailing blank lines, and normalizing it again is a no-op.
pub fn normalize<S: AsRef<str>>(lines: &[S]) -> String {
  let joined = lines.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n\n");
  let collapsed = excess_breaks().replace_all(&joined, "\n\n");
  normalize_blank_lines(collapsed.trim())
}

/// Trims every line and squeezes runs of blank lines down to one.
pub fn normalize_blank_lines(text: &str) -> String {
  let mut kept: Vec<&str> = Vec::new();
  for line in text.lines().map(str::trim) {
    let blank = line.is_empty();
    if blank && kept.last().map_or(true, |prev| prev.is_empty()) {
      continue;
    }
    kept.push(line);
  }
  while kept.last().is_some_and(|line| line.is_empty()) {
    kept.pop();
  }
  kept.join("\n")
}
