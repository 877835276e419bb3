use super::Canvas;
use crate::model::RenderConfig;

/// Vertical cursor over a sequence of pages.
pub struct Pager {
    y: f32,
    top: f32,
    margin_bottom: f32,
    line_height: f32,
    block_gap: f32,
    font_name: String,
    font_size: f32,
    pages_started: usize,
}

impl Pager {
    pub fn new(config: &RenderConfig) -> Self {
        let top = config.page_height - config.margin_top;
        Pager {
            y: top,
            top,
            margin_bottom: config.margin_bottom,
            line_height: config.line_height,
            block_gap: config.block_gap,
            font_name: config.font_name.clone(),
            font_size: config.font_size,
            pages_started: 1,
        }
    }

    /// Baseline of the next line.
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages_started
    }

    /// Break the page when the cursor has dropped below the bottom margin.
    /// Returns whether a break happened.
    pub fn ensure_space(&mut self, canvas: &mut impl Canvas) -> bool {
        if self.y >= self.margin_bottom {
            return false;
        }
        canvas.show_page();
        canvas.set_font(&self.font_name, self.font_size);
        self.y = self.top;
        self.pages_started += 1;
        log::debug!("page break → page {}", self.pages_started);
        true
    }

    pub fn advance_line(&mut self) {
        self.y -= self.line_height;
    }

    /// Leave the inter-block gap. The page break it may call for is taken by
    /// the next [`Pager::ensure_space`], so the last block never leaves a
    /// trailing blank page.
    pub fn end_block(&mut self) {
        self.y -= self.block_gap;
    }
}
