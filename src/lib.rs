mod error;
mod fonts;
mod input;
mod model;
mod pdf;
mod preprocess;

pub use error::Error;
pub use fonts::substitute_unsupported;
pub use input::{entity_summary, load_annotated, parse_annotated};
pub use model::{AnnotatedText, Color, Entity, Palette, RenderConfig, Segment, WrappedLine};
pub use pdf::{
    Canvas, Pager, PdfCanvas, RenderStats, overlay_line, render_annotated, validate_entities,
    wrap_text,
};
pub use preprocess::{clean_text, preprocess_text};

use std::path::Path;
use std::time::Instant;

/// Render `docs` into a PDF at `output`, creating the output directory if needed.
pub fn render_to_pdf(
    docs: &[AnnotatedText],
    config: &RenderConfig,
    output: &Path,
) -> Result<RenderStats, Error> {
    let t0 = Instant::now();

    let mut canvas = PdfCanvas::new(config.page_width, config.page_height);
    canvas.register_font(
        &config.font_name,
        config.font_file.as_deref(),
        &pdf::used_chars(docs),
    )?;
    let t_fonts = t0.elapsed();

    let stats = render_annotated(docs, config, &mut canvas)?;
    let t_render = t0.elapsed();

    canvas.save(output)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: fonts={:.1}ms, layout={:.1}ms, write={:.1}ms, total={:.1}ms ({} blocks, {} lines, {} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_render - t_fonts).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        stats.blocks,
        stats.lines,
        stats.pages,
    );

    Ok(stats)
}

/// Load annotated JSON Lines from `input` and render them to `output`.
pub fn render_file_to_pdf(
    input: &Path,
    config: &RenderConfig,
    output: &Path,
) -> Result<RenderStats, Error> {
    let t0 = Instant::now();
    let docs = load_annotated(input)?;
    log::info!(
        "Timing: load={:.1}ms ({} texts)",
        t0.elapsed().as_secs_f64() * 1000.0,
        docs.len()
    );
    render_to_pdf(&docs, config, output)
}
