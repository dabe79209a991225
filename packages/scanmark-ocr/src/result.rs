//! The shapes an OCR engine may answer with, and how text lines are pulled out
//! of them.
use serde_json::Value;

/// Raw engine answer, tagged by the shape it was recognized as.
///
/// Classification follows a fixed priority: a top-level `rec_texts` field
/// wins over the nested `res.rec_texts` container, which wins over the legacy
/// list of `[box, [text, score]]` detection entries.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOcrResult {
    RecTexts(Vec<String>),
    Nested(Vec<String>),
    Legacy(Vec<String>),
    Unrecognized(Value),
}

impl RawOcrResult {
    /// Classifies a decoded engine answer.
    ///
    /// Engines that process whole documents wrap each page in an outer array;
    /// only the first page is considered.
    pub fn classify(value: Value) -> Self {
        let page = first_page(value);

        if let Some(lines) = rec_texts(&page) {
            return RawOcrResult::RecTexts(lines);
        }
        if let Some(lines) = page.get("res").and_then(rec_texts) {
            return RawOcrResult::Nested(lines);
        }
        if let Some(lines) = legacy_lines(&page) {
            return RawOcrResult::Legacy(lines);
        }
        RawOcrResult::Unrecognized(page)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RawOcrResult::RecTexts(_) => "rec_texts",
            RawOcrResult::Nested(_) => "res.rec_texts",
            RawOcrResult::Legacy(_) => "legacy",
            RawOcrResult::Unrecognized(_) => "unrecognized",
        }
    }

    /// Ordered text lines, or `None` when the shape was not recognized.
    pub fn into_lines(self) -> Option<Vec<String>> {
        match self {
            RawOcrResult::RecTexts(lines)
            | RawOcrResult::Nested(lines)
            | RawOcrResult::Legacy(lines) => Some(lines),
            RawOcrResult::Unrecognized(_) => None,
        }
    }
}

impl From<Value> for RawOcrResult {
    fn from(value: Value) -> Self {
        Self::classify(value)
    }
}

fn first_page(value: Value) -> Value {
    match value {
        Value::Array(mut pages) if pages.first().is_some_and(is_page) => {
            match pages.swap_remove(0) {
                // An engine that found nothing on the page answers `[null]`.
                Value::Null => Value::Array(Vec::new()),
                page => page,
            }
        }
        other => other,
    }
}

fn is_page(value: &Value) -> bool {
    match value {
        Value::Null | Value::Object(_) => true,
        Value::Array(entries) => entries.iter().all(|e| entry_text(e).is_some()),
        _ => false,
    }
}

fn rec_texts(value: &Value) -> Option<Vec<String>> {
    let texts = value.get("rec_texts")?.as_array()?;
    Some(
        texts
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn entry_text(entry: &Value) -> Option<&str> {
    entry.as_array()?.get(1)?.as_array()?.first()?.as_str()
}

fn legacy_lines(value: &Value) -> Option<Vec<String>> {
    let entries = value.as_array()?;
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let text = entry_text(entry)?;
        if !text.is_empty() {
            lines.push(text.to_string());
        }
    }
    Some(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_rec_texts() {
        let raw = RawOcrResult::classify(json!({"rec_texts": ["A", "B"], "rec_scores": [0.9, 0.8]}));
        assert_eq!(raw, RawOcrResult::RecTexts(vec!["A".into(), "B".into()]));
    }

    #[test]
    fn test_rec_texts_wins_over_nested() {
        let raw = RawOcrResult::classify(json!({
            "rec_texts": ["top"],
            "res": {"rec_texts": ["nested"]}
        }));
        assert_eq!(raw.into_lines(), Some(vec!["top".to_string()]));
    }

    #[test]
    fn test_nested_container() {
        let raw = RawOcrResult::classify(json!([{"res": {"input_path": "0032.png", "rec_texts": ["C"]}}]));
        assert_eq!(raw.kind(), "res.rec_texts");
        assert_eq!(raw.into_lines(), Some(vec!["C".to_string()]));
    }

    #[test]
    fn test_legacy_entries_skip_empty_text() {
        let raw = RawOcrResult::classify(json!([[
            [[[0, 0], [10, 0], [10, 5], [0, 5]], ["first", 0.98]],
            [[[0, 6], [10, 6], [10, 9], [0, 9]], ["", 0.10]],
            [[[0, 10], [10, 10], [10, 15], [0, 15]], ["second", 0.91]]
        ]]));
        assert_eq!(raw.kind(), "legacy");
        assert_eq!(raw.into_lines(), Some(vec!["first".to_string(), "second".to_string()]));
    }

    #[test]
    fn test_single_legacy_entry_is_not_mistaken_for_a_page() {
        let raw = RawOcrResult::classify(json!([[[[0, 0], [1, 0], [1, 1], [0, 1]], ["only", 0.5]]]));
        assert_eq!(raw.into_lines(), Some(vec!["only".to_string()]));
    }

    #[test]
    fn test_empty_page_yields_no_lines() {
        assert_eq!(RawOcrResult::classify(json!([null])).into_lines(), Some(vec![]));
        assert_eq!(RawOcrResult::classify(json!([])).into_lines(), Some(vec![]));

        let empty_legacy = RawOcrResult::classify(json!([[]]));
        assert_eq!(empty_legacy.kind(), "legacy");
        assert_eq!(empty_legacy.into_lines(), Some(vec![]));

        let first_page_empty = RawOcrResult::classify(json!([[], [[[[0, 0], [1, 1]], ["later page", 0.9]]]]));
        assert_eq!(first_page_empty.into_lines(), Some(vec![]));
    }

    #[test]
    fn test_unrecognized_shape() {
        let raw = RawOcrResult::classify(json!({"text": "plain"}));
        assert_eq!(raw.kind(), "unrecognized");
        assert_eq!(raw.into_lines(), None);

        assert_eq!(RawOcrResult::classify(json!("just a string")).into_lines(), None);
    }
}
