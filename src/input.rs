use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Error;
use crate::model::AnnotatedText;
use crate::pdf::layout::char_slice;

/// Parse JSON Lines, one [`AnnotatedText`] per non-blank line.
pub fn parse_annotated(input: &str) -> Result<Vec<AnnotatedText>, Error> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<AnnotatedText>(line)
                .map_err(|e| Error::InvalidInput(format!("line {}: {e}", i + 1)))
        })
        .collect()
}

pub fn load_annotated(path: &Path) -> Result<Vec<AnnotatedText>, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", e, path.display()),
        ))
    })?;
    let docs = parse_annotated(&content)?;
    log::debug!("Loaded {} annotated texts from {}", docs.len(), path.display());
    Ok(docs)
}

/// Entity texts grouped by label, joined with `;` in document order.
/// Spans that fall outside the text are skipped.
pub fn entity_summary(doc: &AnnotatedText) -> BTreeMap<String, String> {
    let text_len = doc.text.chars().count();
    let mut grouped: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for e in &doc.entities {
        if e.start_char >= e.end_char || e.end_char > text_len {
            continue;
        }
        grouped
            .entry(e.label.clone())
            .or_default()
            .push(char_slice(&doc.text, e.start_char, e.end_char));
    }
    grouped
        .into_iter()
        .map(|(label, texts)| (label, texts.join(";")))
        .collect()
}
