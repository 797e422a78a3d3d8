//! The rich-text block.
//!
//! A [`RichTextBlock`] owns the full pipeline for one piece of marked-up
//! text: normalize the markup, resolve per-token styles, rasterize every
//! token through the shared glyph cache, lay the bitmaps out with the line
//! engine, and attach the result to the host parent. Render passes are
//! serialized by exclusive access: every mutating operation holds the block
//! for its whole pass, so a later `set_string` starts only after the
//! current pass has applied its bitmaps, and passes apply in call order.

use std::sync::Arc;

use futures_util::FutureExt;
use glam::Vec2;
use glyphline_raster::{
    Bitmap, Color, FontStyle, FontWeight, GlyphRasterCache, GlyphStyle, RasterRequest, Rasterizer,
    Shadow, Stroke,
};
use tracing::{debug, trace};

use crate::completion::CompletionCoordinator;
use crate::decoration::{underline_decorations, DecorationRect};
use crate::error::LabelResult;
use crate::fill_in::FillInSlots;
use crate::fraction::{self, FractionParts, MIXED_PART_SCALE};
use crate::geometry::Rect;
use crate::host::HostParent;
use crate::interact::{ClickHandler, InteractionLayer};
use crate::layout::{
    GlyphContent, HorizontalAlign, LayoutConfig, LineLayoutEngine, PlacedGlyph, SCRIPT_SCALE,
};
use crate::markup::{CustomTag, MarkupSet, StyleFlags};
use crate::script::format_script;

/// What to show when a render pass fails partway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Default)]
pub enum RenderFallback {
    /// Keep the previously rendered contents on screen.
    #[default]
    KeepLastGood,
    /// Detach everything and show an empty block.
    Clear,
}

/// Construction-time options for one block.
#[derive(Clone)]
pub struct BlockOptions {
    /// Initial container box the cursor wraps against. Height is replaced by
    /// the measured content height after every render pass.
    pub container: Vec2,
    /// Block position in parent coordinates.
    pub position: Vec2,
    /// Anchor point kept fixed when the block resizes, in unit coordinates.
    pub anchor: Vec2,
    /// Stacking order passed through to the host for every child.
    pub z_order: i32,
    pub font_family: String,
    pub font_size: f32,
    /// Base weight; `[BOLD]` tokens override to [`FontWeight::Black`].
    pub font_weight: FontWeight,
    /// Base style; `[ITALIC]` tokens override to [`FontStyle::Italic`].
    pub font_style: FontStyle,
    /// Line pitch multiple; see [`LayoutConfig::line_offset`].
    pub line_height: f32,
    /// Word spacing divisor; see [`LayoutConfig::word_offset`].
    pub word_space: f32,
    pub color: Color,
    /// Color applied to `[HIGHLIGHT]` tokens.
    pub highlight_color: Color,
    pub opacity: f32,
    pub stroke: Option<Stroke>,
    pub shadow: Option<Shadow>,
    pub background: Option<Color>,
    pub alignment: HorizontalAlign,
    /// Compensate the legacy renderer's bold-height and underline quirks.
    pub legacy_renderer: bool,
    /// Whole-block click semantics instead of per-token hit testing.
    pub area_click: bool,
    /// Value shown by unfilled `[BLANK]` slots.
    pub fill_in_default: String,
    /// Caller-supplied markup tags, balanced like range tags.
    pub custom_tags: Vec<CustomTag>,
    pub fallback: RenderFallback,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            container: Vec2::new(250.0, 100.0),
            position: Vec2::new(250.0, 250.0),
            anchor: Vec2::new(0.5, 0.5),
            z_order: 0,
            font_family: "sans-serif".to_owned(),
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            line_height: 1.2,
            word_space: 3.5,
            color: Color::BLACK,
            highlight_color: Color::rgb8(21, 15, 242),
            opacity: 1.0,
            stroke: None,
            shadow: None,
            background: None,
            alignment: HorizontalAlign::Left,
            legacy_renderer: false,
            area_click: false,
            fill_in_default: "_____".to_owned(),
            custom_tags: Vec::new(),
            fallback: RenderFallback::KeepLastGood,
        }
    }
}

/// Fired once per completed render pass, after the host attach, with the
/// pass's placed glyphs.
pub type CompletionCallback = Box<dyn FnMut(&[PlacedGlyph]) + Send>;

/// Invoked for every custom-flagged token after layout, with the flag name,
/// the placed glyph and its document index. Symbol tags (`[ANGLE]`, ...)
/// reserve a blank run and surface here so the caller can draw the symbol
/// over it.
pub type SymbolHandler = Box<dyn FnMut(&str, &PlacedGlyph, usize) + Send>;

/// How one whitespace-delimited token consumes rasterized bitmaps.
enum TokenPlan {
    Plain {
        text: String,
        flags: StyleFlags,
        color: Color,
    },
    Fraction {
        text: String,
        flags: StyleFlags,
        color: Color,
        has_whole: bool,
    },
}

/// A rich-text label rendered from rasterized token bitmaps.
pub struct RichTextBlock {
    options: BlockOptions,
    markup: MarkupSet,
    fill_ins: FillInSlots,
    cache: Arc<GlyphRasterCache>,
    rasterizer: Arc<dyn Rasterizer>,
    host: Option<Box<dyn HostParent>>,
    interaction: InteractionLayer,
    completion: Option<CompletionCallback>,
    symbol_handler: Option<SymbolHandler>,
    raw_text: String,
    glyphs: Vec<PlacedGlyph>,
    decorations: Vec<DecorationRect>,
    content_size: Vec2,
    origin: Vec2,
}

impl RichTextBlock {
    /// Create a block over the process-wide glyph cache.
    pub fn new(rasterizer: Arc<dyn Rasterizer>, options: BlockOptions) -> Self {
        Self::with_cache(rasterizer, options, GlyphRasterCache::global().clone())
    }

    /// Create a block with a private glyph cache.
    pub fn with_cache(
        rasterizer: Arc<dyn Rasterizer>,
        options: BlockOptions,
        cache: Arc<GlyphRasterCache>,
    ) -> Self {
        let markup = MarkupSet::with_custom(options.custom_tags.clone());
        let fill_ins = FillInSlots::new(options.fill_in_default.clone());
        let interaction = InteractionLayer::new(options.area_click);
        let origin = options.position;
        Self {
            options,
            markup,
            fill_ins,
            cache,
            rasterizer,
            host: None,
            interaction,
            completion: None,
            symbol_handler: None,
            raw_text: String::new(),
            glyphs: Vec::new(),
            decorations: Vec::new(),
            content_size: Vec2::ZERO,
            origin,
        }
    }

    pub fn set_host(&mut self, host: Box<dyn HostParent>) {
        self.host = Some(host);
    }

    pub fn set_completion_callback(&mut self, callback: CompletionCallback) {
        self.completion = Some(callback);
    }

    pub fn set_symbol_handler(&mut self, handler: SymbolHandler) {
        self.symbol_handler = Some(handler);
    }

    pub fn set_click_handler(&mut self, handler: ClickHandler) {
        self.interaction.set_click_handler(handler);
    }

    pub fn set_click_enabled(&mut self, enabled: bool) {
        self.interaction.set_click_enabled(enabled);
    }

    pub fn was_clicked(&self) -> bool {
        self.interaction.was_clicked()
    }

    pub fn reset_clicked(&mut self) {
        self.interaction.reset_clicked();
    }

    /// Hit-test a pointer release in block-local coordinates.
    pub fn pointer_up(&mut self, point: Vec2) -> bool {
        let frame = Rect::from_size(self.content_size);
        self.interaction.pointer_up(point, frame, &self.glyphs)
    }

    /// Replace the block's text and render it. Fill-in slots are re-derived
    /// from the new text, every slot reset to the default value.
    pub async fn set_string(&mut self, text: impl Into<String>) -> LabelResult<()> {
        self.render_pass(text.into(), true).await
    }

    /// Patch one fill-in slot and re-render the current text. The error for
    /// an out-of-range index is returned before anything is re-rendered.
    pub async fn fill_in_blank(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> LabelResult<()> {
        self.fill_ins.set(index, text)?;
        self.render_pass(self.raw_text.clone(), false).await
    }

    /// Restore one fill-in slot to the default value and re-render.
    pub async fn reset_blank(&mut self, index: usize) -> LabelResult<()> {
        self.fill_ins.reset(index)?;
        self.render_pass(self.raw_text.clone(), false).await
    }

    pub fn text(&self) -> &str {
        &self.raw_text
    }

    pub fn fill_in_values(&self) -> &[String] {
        self.fill_ins.values()
    }

    pub fn glyphs(&self) -> &[PlacedGlyph] {
        &self.glyphs
    }

    pub fn decorations(&self) -> &[DecorationRect] {
        &self.decorations
    }

    /// Measured content size after the last render pass.
    pub fn content_size(&self) -> Vec2 {
        self.content_size
    }

    /// Block position after the last render pass, adjusted so the anchor
    /// point stayed fixed across the reflow.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn cache(&self) -> &Arc<GlyphRasterCache> {
        &self.cache
    }

    /// One full render pass. `derive_slots` re-derives the fill-in slot
    /// list from the text; fill-in patches keep the existing slot values.
    async fn render_pass(&mut self, text: String, derive_slots: bool) -> LabelResult<()> {
        self.raw_text = text;
        if derive_slots {
            self.fill_ins.derive(self.markup.count_blanks(&self.raw_text));
        }
        self.fill_ins.begin_pass();

        let normalized = self.markup.normalize(&self.raw_text);
        let plans = self.plan_tokens(&normalized);

        let mut coordinator = CompletionCoordinator::new();
        for plan in &plans {
            for raster in self.raster_requests(plan) {
                let cache = self.cache.clone();
                let rasterizer = self.rasterizer.clone();
                coordinator
                    .push(async move { cache.render(rasterizer.as_ref(), raster).await }.boxed());
            }
        }
        trace!("render pass: {} tokens, {} rasterizations", plans.len(), coordinator.len());

        let bitmaps = match coordinator.join().await {
            Ok(bitmaps) => bitmaps,
            Err(err) => {
                if self.options.fallback == RenderFallback::Clear {
                    self.clear_contents();
                }
                return Err(err.into());
            }
        };

        self.arrange(&plans, bitmaps);
        self.attach_to_host();
        if let Some(callback) = self.completion.as_mut() {
            callback(&self.glyphs);
        }
        debug!("{}", self.cache.stats_string());
        Ok(())
    }

    /// Resolve styles and clean text for every whitespace-delimited token.
    fn plan_tokens(&mut self, normalized: &str) -> Vec<TokenPlan> {
        let mut plans = Vec::new();
        let mut pending_break = false;
        for token in normalized.split_whitespace() {
            let mut flags = self.markup.resolve_style(token);
            let cleaned = self.markup.clean(token, &mut self.fill_ins);
            if cleaned.is_empty() {
                // A standalone `[BREAK]` cleans to nothing but must still
                // wrap the line; carry its flag to the next emitted token.
                pending_break |= flags.line_break;
                continue;
            }
            if pending_break {
                flags.line_break = true;
                pending_break = false;
            }
            let color = if flags.highlight {
                self.options.highlight_color
            } else {
                self.options.color
            };

            if flags.fraction {
                if let Some(parts) = FractionParts::parse(&cleaned) {
                    plans.push(TokenPlan::Fraction {
                        text: cleaned,
                        flags,
                        color,
                        has_whole: parts.whole.is_some(),
                    });
                    continue;
                }
                // A fraction tag without a `num|den` body renders as plain
                // text.
            }

            // Underscores escape spaces inside a single token; fill-in
            // slot values keep theirs.
            let text = if flags.blank {
                format_script(&cleaned)
            } else {
                format_script(&cleaned.replace('_', " "))
            };
            plans.push(TokenPlan::Plain { text, flags, color });
        }
        plans
    }

    /// Rasterization requests for one token, in bitmap consumption order.
    fn raster_requests(&self, plan: &TokenPlan) -> Vec<RasterRequest> {
        match plan {
            TokenPlan::Plain { text, flags, color } => {
                let mut style = self.base_style(flags, *color);
                if flags.has_script() {
                    style = style.scaled(SCRIPT_SCALE);
                }
                vec![RasterRequest::new(text.clone(), style)]
            }
            TokenPlan::Fraction {
                text, flags, color, ..
            } => {
                let style = self.base_style(flags, *color);
                let parts = FractionParts::parse(text)
                    .unwrap_or_else(|| FractionParts {
                        whole: None,
                        numerator: String::new(),
                        denominator: String::new(),
                    });
                let part_style = if parts.whole.is_some() {
                    style.scaled(MIXED_PART_SCALE)
                } else {
                    style.clone()
                };
                let mut requests = Vec::with_capacity(3);
                if let Some(whole) = &parts.whole {
                    requests.push(RasterRequest::new(whole.clone(), style));
                }
                requests.push(RasterRequest::new(parts.numerator, part_style.clone()));
                requests.push(RasterRequest::new(parts.denominator, part_style));
                requests
            }
        }
    }

    fn base_style(&self, flags: &StyleFlags, color: Color) -> GlyphStyle {
        GlyphStyle {
            font_family: self.options.font_family.clone(),
            font_size: self.options.font_size,
            weight: if flags.bold {
                FontWeight::Black
            } else {
                self.options.font_weight
            },
            style: if flags.italic {
                FontStyle::Italic
            } else {
                self.options.font_style
            },
            color,
            opacity: self.options.opacity,
            stroke: self.options.stroke,
            shadow: self.options.shadow,
            background: self.options.background,
            container: None,
        }
    }

    /// Turn rasterized bitmaps into placed glyphs through the line engine.
    fn arrange(&mut self, plans: &[TokenPlan], bitmaps: Vec<Bitmap>) {
        let config = LayoutConfig {
            container_width: self.options.container.x,
            container_height: self.options.container.y,
            font_size: self.options.font_size,
            line_height: self.options.line_height,
            word_space: self.options.word_space,
            alignment: self.options.alignment,
            legacy_renderer: self.options.legacy_renderer,
        };
        let mut engine = LineLayoutEngine::new(config);
        let mut bitmaps = bitmaps.into_iter();

        for plan in plans {
            match plan {
                TokenPlan::Plain { text, flags, color } => {
                    let Some(bitmap) = bitmaps.next() else { break };
                    let size = bitmap.size();
                    engine.place(PlacedGlyph {
                        text: text.clone(),
                        flags: flags.clone(),
                        color: *color,
                        content: GlyphContent::Bitmap(bitmap),
                        rect: Rect::new(0.0, 0.0, size.x, size.y),
                    });
                }
                TokenPlan::Fraction {
                    text,
                    flags,
                    color,
                    has_whole,
                } => {
                    let whole = if *has_whole { bitmaps.next() } else { None };
                    let (Some(numerator), Some(denominator)) = (bitmaps.next(), bitmaps.next())
                    else {
                        break;
                    };
                    let composed = fraction::compose(
                        whole.as_ref(),
                        &numerator,
                        &denominator,
                        self.options.font_size,
                    );
                    let size = composed.size;
                    engine.place(PlacedGlyph {
                        text: text.clone(),
                        flags: flags.clone(),
                        color: *color,
                        content: GlyphContent::Fraction(composed),
                        rect: Rect::new(0.0, 0.0, size.x, size.y),
                    });
                }
            }
        }

        let result = engine.finish();
        self.decorations = underline_decorations(
            &result.glyphs,
            self.options.font_size,
            self.options.legacy_renderer,
        );
        self.glyphs = result.glyphs;
        self.content_size = result.content_size;
        // Move the block opposite the growth so the anchor point stays put.
        self.origin = Vec2::new(
            self.options.position.x,
            self.options.position.y - result.height_delta,
        );
    }

    fn attach_to_host(&mut self) {
        if let Some(handler) = self.symbol_handler.as_mut() {
            for (index, glyph) in self.glyphs.iter().enumerate() {
                for name in &glyph.flags.custom {
                    handler(name, glyph, index);
                }
            }
        }

        let Some(host) = self.host.as_mut() else {
            return;
        };
        host.begin_frame();
        host.set_block_frame(self.origin, self.content_size, self.options.anchor);
        for (index, glyph) in self.glyphs.iter().enumerate() {
            host.attach_glyph(index, glyph, self.options.z_order);
        }
        for rect in &self.decorations {
            host.attach_rect(rect);
        }
    }

    fn clear_contents(&mut self) {
        self.glyphs.clear();
        self.decorations.clear();
        self.content_size = Vec2::ZERO;
        self.origin = self.options.position;
        if let Some(host) = self.host.as_mut() {
            host.begin_frame();
            host.set_block_frame(self.origin, Vec2::ZERO, self.options.anchor);
        }
    }
}
