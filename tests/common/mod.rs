#![allow(dead_code)]

use std::path::{Path, PathBuf};

use nerference::{Canvas, Color, Error, RenderConfig};

/// Small TrueType face: space 250, capitals 700, everything else 550 units
/// of 1000. Covers printable ASCII and the Hungarian vowels except ő/ű/Ő/Ű.
pub const FIXTURE_FONT: &str = "tests/fixtures/nerference-test.ttf";

/// Every char is `CHAR_WIDTH` points wide.
pub const CHAR_WIDTH: f32 = 5.0;

pub fn fixed_width(s: &str) -> f32 {
    s.chars().count() as f32 * CHAR_WIDTH
}

/// Char-offset slice, the way entity offsets index a text.
pub fn char_slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end - start).collect()
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    SetFont(String, f32),
    Fill(Color),
    Draw { x: f32, y: f32, text: String },
    ShowPage,
    Save(PathBuf),
}

/// Canvas that records every call and measures with [`fixed_width`].
#[derive(Default)]
pub struct RecordingCanvas {
    pub events: Vec<Event>,
}

impl RecordingCanvas {
    pub fn draws(&self) -> Vec<(f32, f32, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Draw { x, y, text } => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn page_breaks(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::ShowPage).count()
    }

    /// Drawn text with the fill color active when it was drawn.
    pub fn colored_draws(&self) -> Vec<(String, Color)> {
        let mut fill = Color::BLACK;
        let mut out = Vec::new();
        for e in &self.events {
            match e {
                Event::Fill(c) => fill = *c,
                Event::Draw { text, .. } => out.push((text.clone(), fill)),
                _ => {}
            }
        }
        out
    }
}

impl Canvas for RecordingCanvas {
    fn string_width(&self, text: &str, _font_name: &str, _font_size: f32) -> f32 {
        fixed_width(text)
    }

    fn set_font(&mut self, font_name: &str, font_size: f32) {
        self.events.push(Event::SetFont(font_name.to_string(), font_size));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.events.push(Event::Fill(color));
    }

    fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        self.events.push(Event::Draw {
            x,
            y,
            text: text.to_string(),
        });
    }

    fn show_page(&mut self) {
        self.events.push(Event::ShowPage);
    }

    fn save(&mut self, path: &Path) -> Result<(), Error> {
        self.events.push(Event::Save(path.to_path_buf()));
        Ok(())
    }
}

/// Config whose cursor starts at `top` and breaks below 50.
pub fn config_with_top(top: f32) -> RenderConfig {
    RenderConfig {
        page_height: top + 40.0,
        margin_top: 40.0,
        margin_bottom: 50.0,
        line_height: 14.0,
        block_gap: 20.0,
        ..RenderConfig::default()
    }
}

/// Output directory: tests/output/<name>/, emptied first.
pub fn fresh_output_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Decoded page content streams of a written PDF, in object order. Only the
/// page contents are Flate-compressed, so every stream that inflates is one.
pub fn page_contents(pdf: &[u8]) -> Vec<String> {
    const START: &[u8] = b"\nstream\n";
    const END: &[u8] = b"\nendstream";
    let mut pages = Vec::new();
    let mut rest = pdf;
    while let Some(at) = find(rest, START) {
        let body = &rest[at + START.len()..];
        let Some(len) = find(body, END) else { break };
        if let Ok(raw) = miniz_oxide::inflate::decompress_to_vec_zlib(&body[..len]) {
            pages.push(String::from_utf8_lossy(&raw).into_owned());
        }
        rest = &body[len + END.len()..];
    }
    pages
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
