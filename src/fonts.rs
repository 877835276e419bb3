use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use memmap2::Mmap;
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Name, Pdf, Rect, Ref, Str};
use ttf_parser::{Face, GlyphId};

use crate::error::Error;

/// Chars the built-in font cannot show, each replaced by one visually close
/// char. Every substitution is one char for one char, so char offsets into the
/// source text stay valid for the substituted string.
const SUBSTITUTIONS: [(char, char); 4] = [
    ('\u{0150}', '\u{00D6}'), // Ő -> Ö
    ('\u{0151}', '\u{00F6}'), // ő -> ö
    ('\u{0170}', '\u{00DC}'), // Ű -> Ü
    ('\u{0171}', '\u{00FC}'), // ű -> ü
];

pub(crate) fn substitute_char(ch: char) -> char {
    SUBSTITUTIONS
        .iter()
        .find(|&&(from, _)| from == ch)
        .map_or(ch, |&(_, to)| to)
}

/// Apply the substitution table to every char of `text`.
pub fn substitute_unsupported(text: &str) -> String {
    text.chars().map(substitute_char).collect()
}

/// Glyphs picked from an embedded face, keyed by the char they draw.
pub(crate) struct EmbeddedGlyphs {
    gids: HashMap<char, u16>,
    widths_1000: HashMap<char, f32>,
}

impl EmbeddedGlyphs {
    /// Subset glyph id for `ch`; 0 (.notdef) when the face has no glyph for it.
    fn gid(&self, ch: char) -> u16 {
        self.gids.get(&ch).copied().unwrap_or(0)
    }
}

pub(crate) enum Glyphs {
    /// Standard Helvetica, WinAnsi-encoded.
    Builtin,
    Embedded(EmbeddedGlyphs),
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    glyphs: Glyphs,
}

impl FontEntry {
    /// Advance of `ch` in 1000-units. A char the font cannot draw measures
    /// zero: WinAnsi drops it from the string, and an embedded face draws
    /// .notdef with the zero default width.
    fn char_width_1000(&self, ch: char) -> f32 {
        match self.glyphs {
            Glyphs::Builtin => winansi_byte(ch).map_or(0.0, |b| {
                f32::from(HELVETICA_WIDTHS[usize::from(b - 0x20)])
            }),
            Glyphs::Embedded(ref glyphs) => glyphs.widths_1000.get(&ch).copied().unwrap_or(0.0),
        }
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|ch| self.char_width_1000(ch)).sum::<f32>() * font_size / 1000.0
    }

    /// Bytes for a `Tj` string operand.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match self.glyphs {
            Glyphs::Builtin => text.chars().filter_map(winansi_byte).collect(),
            // Identity-H: two bytes per glyph, big-endian.
            Glyphs::Embedded(ref glyphs) => text
                .chars()
                .flat_map(|ch| glyphs.gid(ch).to_be_bytes())
                .collect(),
        }
    }
}

/// Windows-1252 assignments in 0x80..=0x9F. The rest of the printable range
/// maps a byte to the codepoint of the same value.
const WINANSI_HIGH: [(u8, char); 27] = [
    (0x80, '€'),
    (0x82, '‚'),
    (0x83, 'ƒ'),
    (0x84, '„'),
    (0x85, '…'),
    (0x86, '†'),
    (0x87, '‡'),
    (0x88, 'ˆ'),
    (0x89, '‰'),
    (0x8A, 'Š'),
    (0x8B, '‹'),
    (0x8C, 'Œ'),
    (0x8E, 'Ž'),
    (0x91, '‘'),
    (0x92, '’'),
    (0x93, '“'),
    (0x94, '”'),
    (0x95, '•'),
    (0x96, '–'),
    (0x97, '—'),
    (0x98, '˜'),
    (0x99, '™'),
    (0x9A, 'š'),
    (0x9B, '›'),
    (0x9C, 'œ'),
    (0x9E, 'ž'),
    (0x9F, 'Ÿ'),
];

fn winansi_byte(ch: char) -> Option<u8> {
    match u32::from(ch) {
        cp @ (0x20..=0x7E | 0xA0..=0xFF) => u8::try_from(cp).ok(),
        _ => WINANSI_HIGH
            .iter()
            .find(|&&(_, c)| c == ch)
            .map(|&(b, _)| b),
    }
}

/// Helvetica advance widths (AFM, 1000 units/em) for WinAnsi bytes 32..=255.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 224] = [
    // 0x20
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0x30
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    // 0x40
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    // 0x50
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    // 0x60
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    // 0x70
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
    // 0x80
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    // 0x90
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    // 0xA0
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    // 0xB0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // 0xC0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    // 0xD0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // 0xE0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    // 0xF0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Objects making up one embedded font.
struct EmbedRefs {
    type0: Ref,
    cid_font: Ref,
    descriptor: Ref,
    program: Ref,
    to_unicode: Ref,
}

/// Face metrics in PDF glyph space (1000 units per em).
struct FaceMetrics {
    scale: f32,
    ascent: f32,
    descent: f32,
    cap_height: f32,
    bbox: Rect,
}

impl FaceMetrics {
    fn of(face: &Face) -> Self {
        let scale = 1000.0 / f32::from(face.units_per_em());
        let bb = face.global_bounding_box();
        FaceMetrics {
            scale,
            ascent: f32::from(face.ascender()) * scale,
            descent: f32::from(face.descender()) * scale,
            cap_height: face
                .capital_height()
                .map_or(700.0, |h| f32::from(h) * scale),
            bbox: Rect::new(
                f32::from(bb.x_min) * scale,
                f32::from(bb.y_min) * scale,
                f32::from(bb.x_max) * scale,
                f32::from(bb.y_max) * scale,
            ),
        }
    }

    fn advance(&self, face: &Face, gid: GlyphId) -> f32 {
        face.glyph_hor_advance(gid)
            .map_or(0.0, |adv| f32::from(adv) * self.scale)
    }
}

fn family_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
        .find_map(|name| name.to_string())
}

/// Look up every used char in `face` and number the found glyphs densely for
/// the subset. Chars are visited in order so the numbering is stable.
fn select_glyphs(
    face: &Face,
    metrics: &FaceMetrics,
    used_chars: &HashSet<char>,
) -> (subsetter::GlyphRemapper, EmbeddedGlyphs) {
    let mut remapper = subsetter::GlyphRemapper::new();
    let mut glyphs = EmbeddedGlyphs {
        gids: HashMap::new(),
        widths_1000: HashMap::new(),
    };
    let mut missing = Vec::new();

    for ch in used_chars.iter().copied().collect::<BTreeSet<char>>() {
        let Some(gid) = face.glyph_index(ch) else {
            missing.push(ch);
            continue;
        };
        glyphs.gids.insert(ch, remapper.remap(gid.0));
        glyphs.widths_1000.insert(ch, metrics.advance(face, gid));
    }
    if !missing.is_empty() {
        log::debug!("no glyph for {missing:?}; drawn as .notdef with zero width");
    }
    (remapper, glyphs)
}

fn identity_system_info() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

fn write_cid_font(pdf: &mut Pdf, refs: &EmbedRefs, base_font: &[u8], glyphs: &EmbeddedGlyphs) {
    // Several chars can share a glyph; the W array wants each id once.
    let by_gid: BTreeMap<u16, f32> = glyphs
        .gids
        .iter()
        .map(|(ch, &gid)| (gid, glyphs.widths_1000[ch]))
        .collect();

    let mut cid = pdf.cid_font(refs.cid_font);
    cid.subtype(CidFontType::Type2)
        .base_font(Name(base_font))
        .system_info(identity_system_info())
        .font_descriptor(refs.descriptor)
        .default_width(0.0)
        .cid_to_gid_map_predefined(Name(b"Identity"));
    if !by_gid.is_empty() {
        let mut widths = cid.widths();
        for (&gid, &w) in &by_gid {
            widths.consecutive(gid, [w]);
        }
    }
}

fn write_to_unicode(pdf: &mut Pdf, refs: &EmbedRefs, base_font: &str, glyphs: &EmbeddedGlyphs) {
    let cmap_name = format!("{base_font}-UTF16");
    let mut cmap = UnicodeCmap::new(Name(cmap_name.as_bytes()), identity_system_info());
    for (&ch, &gid) in &glyphs.gids {
        cmap.pair(gid, ch);
    }
    pdf.stream(refs.to_unicode, cmap.finish().as_slice());
}

/// Write `font_data` as a Type0 font over an Identity-H CIDFont, subset to
/// the glyphs `used_chars` need.
fn embed_truetype(
    pdf: &mut Pdf,
    refs: &EmbedRefs,
    font_name: &str,
    font_data: &[u8],
    used_chars: &HashSet<char>,
) -> Result<EmbeddedGlyphs, ttf_parser::FaceParsingError> {
    let face = Face::parse(font_data, 0)?;
    let metrics = FaceMetrics::of(&face);
    let (remapper, glyphs) = select_glyphs(&face, &metrics, used_chars);

    let program = match subsetter::subset(font_data, 0, &remapper) {
        Ok(subset) => subset,
        Err(e) => {
            log::warn!("Cannot subset {font_name} ({e}), embedding the whole face");
            font_data.to_vec()
        }
    };
    // FontFile2 streams carry the uncompressed program length.
    let program_len = i32::try_from(program.len()).unwrap_or(i32::MAX);
    pdf.stream(refs.program, &program)
        .pair(Name(b"Length1"), program_len);

    let base_font: String = family_name(&face)
        .as_deref()
        .unwrap_or(font_name)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    pdf.font_descriptor(refs.descriptor)
        .name(Name(base_font.as_bytes()))
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(metrics.bbox)
        .italic_angle(0.0)
        .ascent(metrics.ascent)
        .descent(metrics.descent)
        .cap_height(metrics.cap_height)
        .stem_v(80.0)
        .font_file2(refs.program);

    write_cid_font(pdf, refs, base_font.as_bytes(), &glyphs);
    write_to_unicode(pdf, refs, &base_font, &glyphs);

    pdf.type0_font(refs.type0)
        .base_font(Name(base_font.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(refs.cid_font)
        .to_unicode(refs.to_unicode);

    log::debug!(
        "embedded {font_name} as {base_font}: {} glyphs, {} bytes",
        glyphs.gids.len(),
        program.len()
    );
    Ok(glyphs)
}

/// Register `font_name` in `pdf`. With a font file the face is embedded and
/// subset to `used_chars`; without one the standard Helvetica is referenced.
pub(crate) fn register_font(
    pdf: &mut Pdf,
    font_name: &str,
    font_file: Option<&Path>,
    pdf_name: String,
    alloc: &mut impl FnMut() -> Ref,
    used_chars: &HashSet<char>,
) -> Result<FontEntry, Error> {
    let t0 = std::time::Instant::now();
    let font_ref = alloc();

    let glyphs = match font_file {
        Some(path) => {
            let file = std::fs::File::open(path).map_err(|e| {
                Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))
            })?;
            let data = unsafe { Mmap::map(&file) }.map_err(Error::Io)?;
            let refs = EmbedRefs {
                type0: font_ref,
                cid_font: alloc(),
                descriptor: alloc(),
                program: alloc(),
                to_unicode: alloc(),
            };
            let glyphs = embed_truetype(pdf, &refs, font_name, &data, used_chars).map_err(|e| {
                Error::Pdf(format!("cannot parse font file {}: {e}", path.display()))
            })?;
            Glyphs::Embedded(glyphs)
        }
        None => {
            if !font_name.eq_ignore_ascii_case("helvetica") {
                log::warn!("No font file for {font_name}, using Helvetica");
            }
            pdf.type1_font(font_ref)
                .base_font(Name(b"Helvetica"))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            Glyphs::Builtin
        }
    };

    log::debug!(
        "register_font: {font_name} ({} chars) → {:.1}ms",
        used_chars.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(FontEntry {
        pdf_name,
        font_ref,
        glyphs,
    })
}
