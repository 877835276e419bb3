pub(crate) mod layout;
mod pager;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::error::Error;
use crate::fonts::{FontEntry, register_font, substitute_char, substitute_unsupported};
use crate::model::{AnnotatedText, Color, RenderConfig};

pub use layout::{overlay_line, validate_entities, wrap_text};
pub use pager::Pager;

/// Drawing surface the renderer talks to: width measurement, drawing, page
/// breaks and saving.
pub trait Canvas {
    fn string_width(&self, text: &str, font_name: &str, font_size: f32) -> f32;
    fn set_font(&mut self, font_name: &str, font_size: f32);
    fn set_fill_color(&mut self, color: Color);
    /// Draw `text` with its baseline starting at `(x, y)`. Needs a font from an
    /// earlier [`Canvas::set_font`]; [`PdfCanvas`] logs and skips text drawn
    /// before any font was set.
    fn draw_string(&mut self, x: f32, y: f32, text: &str);
    /// Finish the current page and start a new, empty one. The selected font
    /// stays selected; the fill color goes back to black.
    fn show_page(&mut self);
    /// Write the document to `path`, creating its directory if needed.
    fn save(&mut self, path: &Path) -> Result<(), Error>;
}

/// A [`Canvas`] that builds a PDF with one content stream per page.
pub struct PdfCanvas {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    page_width: f32,
    page_height: f32,
    fonts: HashMap<String, FontEntry>,
    font_order: Vec<String>,
    finished_pages: Vec<Content>,
    content: Content,
    cur_font: Option<(String, f32)>,
    cur_fill: Color,
    saved: bool,
}

impl PdfCanvas {
    pub fn new(page_width: f32, page_height: f32) -> Self {
        let mut canvas = PdfCanvas {
            pdf: Pdf::new(),
            next_id: 1,
            catalog_id: Ref::new(1),
            pages_id: Ref::new(2),
            page_width,
            page_height,
            fonts: HashMap::new(),
            font_order: Vec::new(),
            finished_pages: Vec::new(),
            content: Content::new(),
            cur_font: None,
            cur_fill: Color::BLACK,
            saved: false,
        };
        canvas.catalog_id = canvas.alloc();
        canvas.pages_id = canvas.alloc();
        canvas
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    /// Make `font_name` available to [`Canvas::set_font`]. With `font_file` the
    /// face is embedded and subset to `used_chars`.
    pub fn register_font(
        &mut self,
        font_name: &str,
        font_file: Option<&Path>,
        used_chars: &HashSet<char>,
    ) -> Result<(), Error> {
        if self.fonts.contains_key(font_name) {
            return Ok(());
        }
        let pdf_name = format!("F{}", self.font_order.len() + 1);
        let next_id = &mut self.next_id;
        let mut alloc = || {
            let r = Ref::new(*next_id);
            *next_id += 1;
            r
        };
        let entry = register_font(
            &mut self.pdf,
            font_name,
            font_file,
            pdf_name,
            &mut alloc,
            used_chars,
        )?;
        self.fonts.insert(font_name.to_string(), entry);
        self.font_order.push(font_name.to_string());
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.finished_pages.len() + 1
    }

    /// Assemble the document and return the PDF bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.assemble()
    }

    fn assemble(&mut self) -> Vec<u8> {
        let mut all_contents = std::mem::take(&mut self.finished_pages);
        all_contents.push(std::mem::replace(&mut self.content, Content::new()));

        let n = all_contents.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| self.alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| self.alloc()).collect();

        let mut pdf = std::mem::replace(&mut self.pdf, Pdf::new());

        for (i, c) in all_contents.into_iter().enumerate() {
            let raw = c.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
        }

        pdf.catalog(self.catalog_id).pages(self.pages_id);
        pdf.pages(self.pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        let font_pairs: Vec<(String, Ref)> = self
            .font_order
            .iter()
            .map(|name| (self.fonts[name].pdf_name.clone(), self.fonts[name].font_ref))
            .collect();

        for i in 0..n {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, self.page_width, self.page_height))
                .parent(self.pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for (name, font_ref) in &font_pairs {
                fonts.pair(Name(name.as_bytes()), *font_ref);
            }
        }

        pdf.finish()
    }
}

impl Canvas for PdfCanvas {
    fn string_width(&self, text: &str, font_name: &str, font_size: f32) -> f32 {
        match self.fonts.get(font_name) {
            Some(entry) => entry.text_width(text, font_size),
            None => {
                log::error!("string_width: font {font_name} is not registered");
                f32::NAN
            }
        }
    }

    fn set_font(&mut self, font_name: &str, font_size: f32) {
        if !self.fonts.contains_key(font_name) {
            log::error!("set_font: font {font_name} is not registered");
            return;
        }
        self.cur_font = Some((font_name.to_string(), font_size));
    }

    fn set_fill_color(&mut self, color: Color) {
        if color == self.cur_fill {
            return;
        }
        if color == Color::BLACK {
            self.content.set_fill_gray(0.0);
        } else {
            let (r, g, b) = color.to_rgb_f32();
            self.content.set_fill_rgb(r, g, b);
        }
        self.cur_fill = color;
    }

    fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        let Some((ref font_name, font_size)) = self.cur_font else {
            log::error!("draw_string before set_font: {text:?}");
            return;
        };
        let entry = &self.fonts[font_name];
        let bytes = entry.encode(text);
        self.content.begin_text();
        self.content
            .set_font(Name(entry.pdf_name.as_bytes()), font_size);
        self.content.next_line(x, y);
        self.content.show(Str(&bytes));
        self.content.end_text();
    }

    fn show_page(&mut self) {
        self.finished_pages
            .push(std::mem::replace(&mut self.content, Content::new()));
        self.cur_fill = Color::BLACK;
    }

    fn save(&mut self, path: &Path) -> Result<(), Error> {
        if self.saved {
            return Err(Error::Pdf("document was already saved".into()));
        }
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(Error::Io)?;
        }
        let pages = self.page_count();
        let bytes = self.assemble();
        self.saved = true;
        std::fs::write(path, &bytes).map_err(Error::Io)?;
        log::info!(
            "Saved {} ({} pages, {} bytes)",
            path.display(),
            pages,
            bytes.len()
        );
        Ok(())
    }
}

/// Every char the render pass may draw, after substitution. Embedded fonts are
/// subset to this set.
pub(crate) fn used_chars(docs: &[AnnotatedText]) -> HashSet<char> {
    let mut chars: HashSet<char> = docs
        .iter()
        .flat_map(|d| d.text.chars())
        .map(substitute_char)
        .collect();
    chars.insert(' ');
    chars
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub blocks: usize,
    pub lines: usize,
    pub segments: usize,
    pub highlighted: usize,
    pub pages: usize,
}

/// Draw every text block with its entities highlighted. The canvas is not
/// saved; a failure leaves it half-drawn and the caller should discard it.
pub fn render_annotated(
    docs: &[AnnotatedText],
    config: &RenderConfig,
    canvas: &mut impl Canvas,
) -> Result<RenderStats, Error> {
    let font = config.font_name.as_str();
    let size = config.font_size;
    let default_color = config.palette.default_color();

    canvas.set_font(font, size);
    let mut pager = Pager::new(config);
    let mut stats = RenderStats::default();

    for (block_idx, doc) in docs.iter().enumerate() {
        let entities = validate_entities(&doc.text, &doc.entities)?;
        let lines = wrap_text(&doc.text, config.max_width, |s| {
            canvas.string_width(&substitute_unsupported(s), font, size)
        })?;
        log::debug!(
            "block {block_idx}: {} lines, {} entities",
            lines.len(),
            entities.len()
        );

        for line in &lines {
            pager.ensure_space(canvas);
            let segments = overlay_line(line, &entities, &config.palette, |s| {
                canvas.string_width(s, font, size)
            })?;
            for seg in &segments {
                canvas.set_fill_color(seg.color);
                canvas.draw_string(config.margin_left + seg.x_offset, pager.y(), &seg.text);
                if seg.color != default_color {
                    stats.highlighted += 1;
                }
            }
            stats.segments += segments.len();
            pager.advance_line();
        }

        stats.lines += lines.len();
        stats.blocks += 1;
        pager.end_block();
    }

    canvas.set_fill_color(default_color);
    stats.pages = pager.page_count();
    Ok(stats)
}
