use crate::error::Error;
use crate::fonts::substitute_unsupported;
use crate::model::{Color, Entity, Palette, Segment, WrappedLine};

/// Byte range of the chars `[start, end)` of `s`.
fn char_byte_range(s: &str, start: usize, end: usize) -> (usize, usize) {
    let mut offsets = s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len()));
    let from = offsets.nth(start).unwrap_or(s.len());
    let to = if end > start {
        offsets.nth(end - start - 1).unwrap_or(s.len())
    } else {
        from
    };
    (from, to)
}

pub(crate) fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let (from, to) = char_byte_range(s, start, end);
    &s[from..to]
}

fn checked_width(measure: &impl Fn(&str) -> f32, text: &str) -> Result<f32, Error> {
    let w = measure(text);
    if w.is_nan() || w < 0.0 {
        return Err(Error::InvariantViolation(format!(
            "width oracle returned {w} for {text:?}"
        )));
    }
    Ok(w)
}

/// Running state of the greedy wrapper. Offsets are char offsets into the
/// source text; `byte_*` mirror them for slicing.
struct LineAccumulator {
    lines: Vec<WrappedLine>,
    line_start: usize,
    byte_line_start: usize,
    /// End of the buffered line, `None` while the buffer is empty.
    line_end: Option<(usize, usize)>,
    cursor: usize,
    byte_cursor: usize,
}

impl LineAccumulator {
    fn flush(&mut self, text: &str) {
        let Some((_, byte_end)) = self.line_end.take() else {
            return;
        };
        let content = text[self.byte_line_start..byte_end].trim_end();
        if content.is_empty() {
            return;
        }
        self.lines.push(WrappedLine {
            content: content.to_string(),
            source_start: self.line_start,
            source_end: self.line_start + content.chars().count(),
        });
    }
}

/// Greedily break `text` into lines no wider than `max_width` according to
/// `measure`. Words are separated by single spaces; a word wider than
/// `max_width` gets a line of its own and is never split.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    measure: impl Fn(&str) -> f32,
) -> Result<Vec<WrappedLine>, Error> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let init = LineAccumulator {
        lines: Vec::new(),
        line_start: 0,
        byte_line_start: 0,
        line_end: None,
        cursor: 0,
        byte_cursor: 0,
    };

    let step = |mut acc: LineAccumulator, word: &str| -> Result<LineAccumulator, Error> {
        let word_start = (acc.cursor, acc.byte_cursor);
        let word_end = (
            acc.cursor + word.chars().count(),
            acc.byte_cursor + word.len(),
        );
        // Next word begins after this one and its separating space.
        acc.cursor = word_end.0 + 1;
        acc.byte_cursor = word_end.1 + 1;

        if acc.line_end.is_none() {
            if !word.is_empty() {
                (acc.line_start, acc.byte_line_start) = word_start;
                acc.line_end = Some(word_end);
            }
            return Ok(acc);
        }

        let candidate = &text[acc.byte_line_start..word_end.1];
        if checked_width(&measure, candidate)? <= max_width {
            acc.line_end = Some(word_end);
        } else {
            acc.flush(text);
            if !word.is_empty() {
                (acc.line_start, acc.byte_line_start) = word_start;
                acc.line_end = Some(word_end);
            }
        }
        Ok(acc)
    };

    let mut acc = text.split(' ').try_fold(init, step)?;
    acc.flush(text);
    log::trace!("wrap_text: {} chars → {} lines", text.len(), acc.lines.len());
    Ok(acc.lines)
}

/// Check every entity against `text` and order them for overlaying.
///
/// Spans must satisfy `start_char < end_char <= len`. Entities are sorted by
/// start; when two overlap, the one starting first wins and the other is
/// dropped.
pub fn validate_entities<'a>(
    text: &str,
    entities: &'a [Entity],
) -> Result<Vec<&'a Entity>, Error> {
    let text_len = text.chars().count();
    for e in entities {
        if e.start_char >= e.end_char || e.end_char > text_len {
            return Err(Error::InvalidEntitySpan {
                label: e.label.clone(),
                start_char: e.start_char,
                end_char: e.end_char,
                text_len,
            });
        }
    }

    let mut sorted: Vec<&Entity> = entities.iter().collect();
    sorted.sort_by_key(|e| e.start_char);

    let mut kept: Vec<&Entity> = Vec::with_capacity(sorted.len());
    for e in sorted {
        if let Some(prev) = kept.last()
            && e.start_char < prev.end_char
        {
            log::warn!(
                "Dropping {} [{}, {}): overlaps {} [{}, {})",
                e.label,
                e.start_char,
                e.end_char,
                prev.label,
                prev.start_char,
                prev.end_char,
            );
            continue;
        }
        kept.push(e);
    }
    Ok(kept)
}

/// Split one wrapped line into colored segments.
///
/// `entities` must come from [`validate_entities`] for the line's source text.
/// Segment text is passed through the font substitution table before it is
/// measured, and `x_offset` accumulates the measured widths from the line start.
pub fn overlay_line(
    line: &WrappedLine,
    entities: &[&Entity],
    palette: &Palette,
    measure: impl Fn(&str) -> f32,
) -> Result<Vec<Segment>, Error> {
    let line_len = line.content.chars().count();
    let mut segments: Vec<Segment> = Vec::new();
    let mut current_x = 0.0f32;
    let mut pos_in_line = 0usize;

    let mut push = |start: usize, end: usize, color: Color| -> Result<(), Error> {
        if end <= start {
            return Ok(());
        }
        let text = substitute_unsupported(char_slice(&line.content, start, end));
        let width = checked_width(&measure, &text)?;
        segments.push(Segment {
            text,
            color,
            x_offset: current_x,
            width,
        });
        current_x += width;
        Ok(())
    };

    let on_line = entities
        .iter()
        .filter(|e| e.start_char < line.source_end && e.end_char > line.source_start);

    for entity in on_line {
        let local_start = entity.start_char.saturating_sub(line.source_start);
        let local_end = (entity.end_char - line.source_start).min(line_len);
        if local_start < pos_in_line {
            return Err(Error::InvariantViolation(format!(
                "entity {} at {} starts before the overlay cursor {}",
                entity.label, entity.start_char, line.source_start + pos_in_line
            )));
        }

        push(pos_in_line, local_start, palette.default_color())?;
        push(local_start, local_end, palette.color_for(&entity.label))?;
        pos_in_line = local_end;
    }

    push(pos_in_line, line_len, palette.default_color())?;
    Ok(segments)
}
