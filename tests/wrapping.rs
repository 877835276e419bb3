mod common;

use common::{CHAR_WIDTH, char_slice, fixed_width};
use nerference::{Error, WrappedLine, wrap_text};

const FOX: &str = "the quick brown fox jumps over the lazy dog";

fn contents(lines: &[WrappedLine]) -> Vec<&str> {
    lines.iter().map(|l| l.content.as_str()).collect()
}

fn assert_aligned(text: &str, lines: &[WrappedLine]) {
    for line in lines {
        assert_eq!(
            char_slice(text, line.source_start, line.source_end),
            line.content,
            "line {line:?} does not match its source range"
        );
    }
    for pair in lines.windows(2) {
        assert!(pair[0].source_end < pair[1].source_start, "{pair:?} overlap");
    }
}

#[test]
fn greedy_breaks_at_width() {
    let lines = wrap_text(FOX, 10.0 * CHAR_WIDTH, fixed_width).unwrap();
    assert_eq!(
        contents(&lines),
        ["the quick", "brown fox", "jumps over", "the lazy", "dog"]
    );
    let ranges: Vec<(usize, usize)> = lines.iter().map(|l| (l.source_start, l.source_end)).collect();
    assert_eq!(ranges, [(0, 9), (10, 19), (20, 30), (31, 39), (40, 43)]);
    assert_aligned(FOX, &lines);
}

#[test]
fn joined_lines_reproduce_text() {
    for width in [3.0, 7.0, 12.0, 25.0, 100.0] {
        let lines = wrap_text(FOX, width * CHAR_WIDTH, fixed_width).unwrap();
        assert_eq!(contents(&lines).join(" "), FOX, "max width {width} chars");
        assert_aligned(FOX, &lines);
    }
}

#[test]
fn lines_respect_width_unless_single_word() {
    let text = "a supercalifragilistic word and some short ones plus antidisestablishment";
    let max = 8.0 * CHAR_WIDTH;
    let lines = wrap_text(text, max, fixed_width).unwrap();
    for line in &lines {
        if line.content.contains(' ') {
            assert!(fixed_width(&line.content) <= max, "{line:?} too wide");
        }
    }
    assert!(lines.iter().any(|l| l.content == "supercalifragilistic"));
    assert!(lines.iter().any(|l| l.content == "antidisestablishment"));
    assert_aligned(text, &lines);
}

#[test]
fn overlong_word_gets_own_line() {
    let text = "a supercalifragilistic b";
    let lines = wrap_text(text, 6.0 * CHAR_WIDTH, fixed_width).unwrap();
    assert_eq!(contents(&lines), ["a", "supercalifragilistic", "b"]);
    assert_eq!((lines[1].source_start, lines[1].source_end), (2, 22));
    assert_eq!((lines[2].source_start, lines[2].source_end), (23, 24));
}

#[test]
fn overlong_first_word_is_not_split() {
    let lines = wrap_text("Magyarország", 1.0, fixed_width).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].content, "Magyarország");
    assert_eq!((lines[0].source_start, lines[0].source_end), (0, 12));
}

#[test]
fn empty_text_has_no_lines() {
    assert!(wrap_text("", 100.0, fixed_width).unwrap().is_empty());
    assert!(wrap_text("   ", 100.0, fixed_width).unwrap().is_empty());
}

#[test]
fn repeated_words_use_running_offsets() {
    let text = "aa aa aa aa";
    let lines = wrap_text(text, 5.0 * CHAR_WIDTH, fixed_width).unwrap();
    assert_eq!(contents(&lines), ["aa aa", "aa aa"]);
    assert_eq!((lines[1].source_start, lines[1].source_end), (6, 11));
}

#[test]
fn double_space_keeps_alignment() {
    let text = "ab  cd";
    let wide = wrap_text(text, 100.0, fixed_width).unwrap();
    assert_eq!(contents(&wide), ["ab  cd"]);

    let narrow = wrap_text(text, 2.0 * CHAR_WIDTH, fixed_width).unwrap();
    assert_eq!(contents(&narrow), ["ab", "cd"]);
    assert_eq!((narrow[1].source_start, narrow[1].source_end), (4, 6));
    assert_aligned(text, &narrow);
}

#[test]
fn leading_and_trailing_spaces_are_not_line_content() {
    let lines = wrap_text(" ab cd ", 100.0, fixed_width).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].content, "ab cd");
    assert_eq!((lines[0].source_start, lines[0].source_end), (1, 6));
}

#[test]
fn offsets_count_chars_not_bytes() {
    let text = "Orbán Viktor a Fidesz elnöke.";
    let lines = wrap_text(text, 14.0 * CHAR_WIDTH, fixed_width).unwrap();
    assert_eq!(contents(&lines), ["Orbán Viktor a", "Fidesz elnöke."]);
    assert_eq!((lines[1].source_start, lines[1].source_end), (15, 29));
    assert_aligned(text, &lines);
}

#[test]
fn nan_or_negative_width_is_an_invariant_violation() {
    let nan = wrap_text("a b", 10.0, |_| f32::NAN);
    assert!(matches!(nan, Err(Error::InvariantViolation(_))));

    let negative = wrap_text("a b", 10.0, |_| -1.0);
    assert!(matches!(negative, Err(Error::InvariantViolation(_))));
}
