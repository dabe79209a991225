//! Parsing of user supplied page selections such as `1-3,7,10-8`.
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageRangeError {
  #[error("invalid page range token {token:?} in {expression:?}")]
  InvalidToken { token: String, expression: String },
}

/// Zero-based page indices selected for processing, kept as sorted,
/// non-overlapping inclusive ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet {
  ranges: Vec<RangeInclusive<u64>>,
}

impl PageSet {
  /// Builds a set from arbitrary ranges; overlapping and adjacent ranges are
  /// merged so equal selections compare equal.
  pub fn from_ranges<I: IntoIterator<Item = RangeInclusive<u64>>>(ranges: I) -> Self {
    let mut ranges: Vec<_> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
    ranges.sort_by_key(|r| *r.start());

    let mut merged: Vec<RangeInclusive<u64>> = Vec::with_capacity(ranges.len());
    for range in ranges {
      match merged.last_mut() {
        Some(last) if *range.start() <= last.end().saturating_add(1) => {
          if range.end() > last.end() {
            *last = *last.start()..=*range.end();
          }
        }
        _ => merged.push(range),
      }
    }
    Self { ranges: merged }
  }

  pub fn contains(&self, index: u64) -> bool {
    let at = self.ranges.partition_point(|r| *r.end() < index);
    self.ranges.get(at).is_some_and(|r| r.contains(&index))
  }

  /// Whether the 1-based page `number` is selected.
  pub fn contains_page(&self, number: u64) -> bool {
    number >= 1 && self.contains(number - 1)
  }

  /// Number of selected indices.
  pub fn len(&self) -> u64 {
    self
      .ranges
      .iter()
      .map(|r| (r.end() - r.start()).saturating_add(1))
      .fold(0u64, u64::saturating_add)
  }

  pub fn is_empty(&self) -> bool {
    self.ranges.is_empty()
  }

  pub fn ranges(&self) -> &[RangeInclusive<u64>] {
    &self.ranges
  }

  /// Every index in ascending order. Only meant for small selections.
  pub fn sorted(&self) -> Vec<u64> {
    self.ranges.iter().flat_map(|r| r.clone()).collect()
  }
}

impl FromIterator<u64> for PageSet {
  fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
    Self::from_ranges(iter.into_iter().map(|i| i..=i))
  }
}

/// Parses a page-range expression.
///
/// `None`, `""` and whitespace-only input mean "no filter". Otherwise the
/// expression is a comma separated list of 1-based pages (`4`) and inclusive
/// ranges in either direction (`2-5`, `5-2`). Pages `<= 0` are dropped.
pub fn parse_page_range(expression: Option<&str>) -> Result<Option<PageSet>, PageRangeError> {
  let expression = match expression.map(str::trim) {
    None | Some("") => return Ok(None),
    Some(expr) => expr,
  };

  let invalid = |token: &str| PageRangeError::InvalidToken {
    token: token.to_string(),
    expression: expression.to_string(),
  };

  let mut ranges = Vec::new();
  for token in expression.split(',').map(str::trim) {
    let (start, end) = match token.split_once('-') {
      Some((a, b)) => (parse_number(a), parse_number(b)),
      None => {
        let n = parse_number(token);
        (n, n)
      }
    };
    let (Some(start), Some(end)) = (start, end) else {
      return Err(invalid(token));
    };

    let (low, high) = if start <= end { (start, end) } else { (end, start) };
    if high >= 1 {
      ranges.push((low.max(1) - 1) as u64..=(high - 1) as u64);
    }
  }

  Ok(Some(PageSet::from_ranges(ranges)))
}

fn parse_number(s: &str) -> Option<i64> {
  s.trim().parse::<i64>().ok()
}
