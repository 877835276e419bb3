use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A labeled span of a source text. Offsets count chars, `end_char` is exclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub label: String,
    pub start_char: usize,
    pub end_char: usize,
}

/// One text block together with the entities the pipeline found in it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedText {
    pub text: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// A wrapped line and the char range of the source text it was cut from.
/// `content` is always exactly the source slice `[source_start, source_end)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedLine {
    pub content: String,
    pub source_start: usize,
    pub source_end: usize,
}

/// A single-colored run of a wrapped line, positioned relative to the line start.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub text: String,
    pub color: Color,
    pub x_offset: f32,
    pub width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0]);
    pub const BLUE: Color = Color([0, 0, 255]);
    pub const ORANGE: Color = Color([255, 165, 0]);
    pub const RED: Color = Color([255, 0, 0]);
    pub const GREEN: Color = Color([0, 128, 0]);

    /// Parse `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(s: &str) -> Option<Color> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub(crate) fn to_rgb_f32(self) -> (f32, f32, f32) {
        let [r, g, b] = self.0;
        (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

/// Entity label to highlight color. Labels without an entry, and plain text,
/// use `default_color`.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    entries: Vec<(String, Color)>,
    default_color: Color,
}

impl Palette {
    pub fn new(default_color: Color) -> Self {
        Palette {
            entries: Vec::new(),
            default_color,
        }
    }

    /// Add or replace the color for `label`.
    pub fn with_color(mut self, label: &str, color: Color) -> Self {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some(entry) => entry.1 = color,
            None => self.entries.push((label.to_string(), color)),
        }
        self
    }

    pub fn color_for(&self, label: &str) -> Color {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|&(_, c)| c)
            .unwrap_or(self.default_color)
    }

    pub fn default_color(&self) -> Color {
        self.default_color
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(Color::BLACK)
            .with_color("PER", Color::BLUE)
            .with_color("ORG", Color::ORANGE)
            .with_color("LOC", Color::RED)
            .with_color("MISC", Color::GREEN)
    }
}

/// Page geometry and typography for one render pass. All lengths in points.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    /// The cursor may not drop below this before a page break.
    pub margin_bottom: f32,
    pub line_height: f32,
    pub block_gap: f32,
    pub max_width: f32,
    pub font_name: String,
    pub font_size: f32,
    /// TrueType/OpenType file to embed instead of the built-in Helvetica.
    pub font_file: Option<PathBuf>,
    pub palette: Palette,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            page_width: 612.0,
            page_height: 792.0,
            margin_left: 72.0,
            margin_top: 40.0,
            margin_bottom: 50.0,
            line_height: 14.0,
            block_gap: 20.0,
            max_width: 460.0,
            font_name: "Helvetica".to_string(),
            font_size: 10.0,
            font_file: None,
            palette: Palette::default(),
        }
    }
}
