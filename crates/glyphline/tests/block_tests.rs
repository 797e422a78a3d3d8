//! End-to-end block behavior over the stub backend.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::{HostCall, RecordingHost};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use glyphline::{
    Bitmap, BlockOptions, ClickEvent, CustomTag, GlyphContent, GlyphRasterCache, LabelError,
    PlacedGlyph, RasterRequest, RasterResult, Rasterizer, RenderFallback, RichTextBlock, Vec2,
};
use glyphline_test_utils::StubRasterizer;

fn new_block(backend: Arc<dyn Rasterizer>, options: BlockOptions) -> RichTextBlock {
    RichTextBlock::with_cache(backend, options, Arc::new(GlyphRasterCache::new()))
}

#[test]
fn set_string_attaches_tokens_in_document_order() {
    let backend = Arc::new(StubRasterizer::new());
    let host = RecordingHost::new();
    let mut block = new_block(backend, BlockOptions::default());
    block.set_host(Box::new(host.clone()));

    pollster::block_on(block.set_string("Hello brave world")).unwrap();

    assert_eq!(host.frames(), 1);
    assert_eq!(host.attached_texts(), ["Hello", "brave", "world"]);
    let calls = host.calls();
    assert_eq!(calls[0], HostCall::BeginFrame);
    assert!(matches!(calls[1], HostCall::SetBlockFrame { .. }));
}

#[test]
fn empty_string_completes_immediately() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend.clone(), BlockOptions::default());
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    block.set_completion_callback(Box::new(move |_: &[PlacedGlyph]| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    pollster::block_on(block.set_string("")).unwrap();

    assert!(block.glyphs().is_empty());
    assert_eq!(backend.calls(), 0);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn completion_fires_once_per_render_pass() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    block.set_completion_callback(Box::new(move |_: &[PlacedGlyph]| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    pollster::block_on(block.set_string("one")).unwrap();
    pollster::block_on(block.set_string("two")).unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 2);
    assert_eq!(block.text(), "two");
}

#[test]
fn completion_callback_sees_the_pass_glyphs() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    block.set_completion_callback(Box::new(move |glyphs: &[PlacedGlyph]| {
        counter.store(glyphs.len(), Ordering::SeqCst);
    }));

    pollster::block_on(block.set_string("one two three")).unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn sequential_renders_apply_in_call_order() {
    let backend = Arc::new(StubRasterizer::new());
    let host = RecordingHost::new();
    let mut block = new_block(backend, BlockOptions::default());
    block.set_host(Box::new(host.clone()));

    pollster::block_on(block.set_string("first pass")).unwrap();
    pollster::block_on(block.set_string("second pass")).unwrap();

    assert_eq!(host.frames(), 2);
    assert_eq!(block.text(), "second pass");
    assert_eq!(host.attached_texts(), ["second", "pass"]);
}

#[test]
fn standalone_break_token_starts_a_new_line() {
    let backend = Arc::new(StubRasterizer::new());
    let options = BlockOptions::default();
    let pitch = options.font_size * options.line_height;
    let mut block = new_block(backend, options);

    pollster::block_on(block.set_string("aa [BREAK] bb")).unwrap();

    // The break token itself renders nothing, but still wraps the line.
    assert_eq!(block.glyphs().len(), 2);
    assert_eq!(block.glyphs()[1].rect.x, 0.0);
    let drop = block.glyphs()[0].rect.y - block.glyphs()[1].rect.y;
    assert!((drop - pitch).abs() < 1e-3);
}

#[test]
fn out_of_order_completions_apply_in_document_order() {
    // Longer tokens stay pending for more polls, so "aaa" settles after
    // "c" even though its request was issued first.
    struct StaggeredRasterizer;

    impl Rasterizer for StaggeredRasterizer {
        fn rasterize(&self, request: RasterRequest) -> BoxFuture<'static, RasterResult<Bitmap>> {
            let mut remaining = request.text.len();
            let width = request.text.len().max(1) as u32;
            futures_util::future::poll_fn(move |cx| {
                if remaining == 0 {
                    std::task::Poll::Ready(Ok(Bitmap::blank(width, 4)))
                } else {
                    remaining -= 1;
                    cx.waker().wake_by_ref();
                    std::task::Poll::Pending
                }
            })
            .boxed()
        }
    }

    let host = RecordingHost::new();
    let mut block = new_block(Arc::new(StaggeredRasterizer), BlockOptions::default());
    block.set_host(Box::new(host.clone()));
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    block.set_completion_callback(Box::new(move |_: &[PlacedGlyph]| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    pollster::block_on(block.set_string("aaa bb c")).unwrap();

    assert_eq!(host.attached_texts(), ["aaa", "bb", "c"]);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn highlight_token_uses_the_highlight_color() {
    let backend = Arc::new(StubRasterizer::new());
    let options = BlockOptions::default();
    let highlight = options.highlight_color;
    let base = options.color;
    let mut block = new_block(backend, options);

    pollster::block_on(block.set_string("[HIGHLIGHT]win[/HIGHLIGHT] lose")).unwrap();

    assert_eq!(block.glyphs()[0].color, highlight);
    assert_eq!(block.glyphs()[1].color, base);
}

#[test]
fn fill_in_patches_one_slot_and_rerenders() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());

    pollster::block_on(block.set_string("Answer: [BLANK] end")).unwrap();
    assert_eq!(block.glyphs()[1].text, "_____");

    pollster::block_on(block.fill_in_blank(0, "42")).unwrap();
    assert_eq!(block.glyphs()[1].text, "42");

    pollster::block_on(block.reset_blank(0)).unwrap();
    assert_eq!(block.glyphs()[1].text, "_____");
}

#[test]
fn fill_in_rejects_out_of_range_index() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());

    pollster::block_on(block.set_string("only [BLANK] here")).unwrap();
    let before: Vec<String> = block.glyphs().iter().map(|g| g.text.clone()).collect();

    let err = pollster::block_on(block.fill_in_blank(5, "nope")).unwrap_err();
    assert_eq!(err, LabelError::FillInOutOfRange { index: 5, count: 1 });

    let after: Vec<String> = block.glyphs().iter().map(|g| g.text.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn new_string_resets_fill_in_slots() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());

    pollster::block_on(block.set_string("a [BLANK]")).unwrap();
    pollster::block_on(block.fill_in_blank(0, "old")).unwrap();
    pollster::block_on(block.set_string("b [BLANK] [BLANK]")).unwrap();

    assert_eq!(block.fill_in_values(), ["_____", "_____"]);
}

#[test]
fn keep_last_good_preserves_contents_on_failure() {
    let backend = Arc::new(StubRasterizer::new());
    let host = RecordingHost::new();
    let mut block = new_block(backend.clone(), BlockOptions::default());
    block.set_host(Box::new(host.clone()));

    pollster::block_on(block.set_string("alpha beta")).unwrap();
    backend.fail_matching("bad");
    let err = pollster::block_on(block.set_string("bad token"));

    assert!(matches!(err, Err(LabelError::Raster(_))));
    assert_eq!(block.glyphs().len(), 2);
    assert_eq!(block.glyphs()[0].text, "alpha");
    // The failed pass never touched the host.
    assert_eq!(host.frames(), 1);
}

#[test]
fn clear_fallback_empties_the_block_on_failure() {
    let backend = Arc::new(StubRasterizer::new());
    let host = RecordingHost::new();
    let options = BlockOptions {
        fallback: RenderFallback::Clear,
        ..BlockOptions::default()
    };
    let mut block = new_block(backend.clone(), options);
    block.set_host(Box::new(host.clone()));

    pollster::block_on(block.set_string("alpha")).unwrap();
    backend.fail_matching("bad");
    let err = pollster::block_on(block.set_string("bad"));

    assert!(err.is_err());
    assert!(block.glyphs().is_empty());
    assert_eq!(block.content_size(), Vec2::ZERO);
    assert_eq!(host.frames(), 2);
    assert!(host.attached_texts().is_empty());
}

#[test]
fn failed_rasterization_can_be_retried() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend.clone(), BlockOptions::default());

    backend.fail_matching("bad");
    assert!(pollster::block_on(block.set_string("bad")).is_err());

    backend.heal();
    pollster::block_on(block.set_string("bad")).unwrap();
    assert_eq!(block.glyphs()[0].text, "bad");
}

#[test]
fn identical_tokens_rasterize_once() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend.clone(), BlockOptions::default());

    pollster::block_on(block.set_string("echo echo echo")).unwrap();

    assert_eq!(block.glyphs().len(), 3);
    assert_eq!(backend.calls(), 1);
}

#[test]
fn cache_is_shared_between_blocks() {
    let backend = Arc::new(StubRasterizer::new());
    let cache = Arc::new(GlyphRasterCache::new());
    let mut first =
        RichTextBlock::with_cache(backend.clone(), BlockOptions::default(), cache.clone());
    let mut second = RichTextBlock::with_cache(backend.clone(), BlockOptions::default(), cache);

    pollster::block_on(first.set_string("shared word")).unwrap();
    pollster::block_on(second.set_string("shared word")).unwrap();

    assert_eq!(backend.calls(), 2);
}

#[test]
fn superscript_token_is_scaled_and_glued() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());

    pollster::block_on(block.set_string("x [CWSUPERSCRIPT]2")).unwrap();

    let base = &block.glyphs()[0];
    let exponent = &block.glyphs()[1];
    assert_eq!(base.rect.width, StubRasterizer::width_of("x", 16.0));
    assert_eq!(exponent.rect.width, StubRasterizer::width_of("2", 16.0 * 0.6));
    // Glued to the base token's trailing edge, riding half its own height.
    assert_eq!(exponent.rect.x, base.rect.right());
    assert_eq!(exponent.rect.y - base.rect.y, exponent.rect.height * 0.5);
}

#[test]
fn fraction_composes_into_a_single_glyph() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());

    pollster::block_on(block.set_string("[FRACTION]1|2[/FRACTION]")).unwrap();

    assert_eq!(block.glyphs().len(), 1);
    let GlyphContent::Fraction(composed) = &block.glyphs()[0].content else {
        panic!("expected a composed fraction");
    };
    assert_eq!(composed.children.len(), 2);
    assert_eq!(composed.bar.width, StubRasterizer::width_of("1", 16.0));
}

#[test]
fn mixed_fraction_scales_its_parts() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());

    pollster::block_on(block.set_string("[FRACTION]3|1|2[/FRACTION]")).unwrap();

    let GlyphContent::Fraction(composed) = &block.glyphs()[0].content else {
        panic!("expected a composed fraction");
    };
    assert_eq!(composed.children.len(), 3);
    // Whole number at full size, numerator and denominator scaled down.
    assert_eq!(
        composed.children[0].bitmap.size().x,
        StubRasterizer::width_of("3", 16.0)
    );
    assert_eq!(
        composed.children[1].bitmap.size().x,
        StubRasterizer::width_of("1", 16.0 * 0.85)
    );
}

#[test]
fn fraction_without_parts_renders_as_plain_text() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());

    pollster::block_on(block.set_string("[FRACTION]12[/FRACTION]")).unwrap();

    assert_eq!(block.glyphs().len(), 1);
    assert!(matches!(
        block.glyphs()[0].content,
        GlyphContent::Bitmap(_)
    ));
    assert_eq!(block.glyphs()[0].text, "12");
}

#[test]
fn symbol_handler_sees_the_reserved_run() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    block.set_symbol_handler(Box::new(move |name, glyph, index| {
        log.lock().unwrap().push((name.to_owned(), glyph.text.clone(), index));
    }));

    pollster::block_on(block.set_string("[ANGLE]ABC is acute")).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], ("angle".to_owned(), "    ABC".to_owned(), 0));
}

#[test]
fn custom_tags_reach_the_symbol_handler() {
    let backend = Arc::new(StubRasterizer::new());
    let options = BlockOptions {
        custom_tags: vec![CustomTag::new("wave", "[WAVE]")],
        ..BlockOptions::default()
    };
    let mut block = new_block(backend, options);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    block.set_symbol_handler(Box::new(move |name, _, index| {
        log.lock().unwrap().push((name.to_owned(), index));
    }));

    pollster::block_on(block.set_string("[WAVE]hello there[/WAVE]")).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, [("wave".to_owned(), 0), ("wave".to_owned(), 1)]);
}

#[test]
fn pointer_up_hits_the_token_under_the_point() {
    let backend = Arc::new(StubRasterizer::new());
    let mut block = new_block(backend, BlockOptions::default());
    let hit = Arc::new(AtomicUsize::new(usize::MAX));
    let recorded = hit.clone();
    block.set_click_handler(Box::new(move |event| {
        if let ClickEvent::Glyph { index, .. } = event {
            recorded.store(index, Ordering::SeqCst);
        }
    }));

    pollster::block_on(block.set_string("one two")).unwrap();
    let second = block.glyphs()[1].rect;
    let inside = Vec2::new(second.x + 1.0, second.y + 1.0);

    assert!(block.pointer_up(inside));
    assert_eq!(hit.load(Ordering::SeqCst), 1);
    assert!(!block.pointer_up(Vec2::new(-50.0, -50.0)));
}

#[test]
fn area_click_covers_the_whole_block() {
    let backend = Arc::new(StubRasterizer::new());
    let options = BlockOptions {
        area_click: true,
        ..BlockOptions::default()
    };
    let mut block = new_block(backend, options);
    let count = Arc::new(AtomicUsize::new(0));
    let recorded = count.clone();
    block.set_click_handler(Box::new(move |event| {
        if let ClickEvent::Block(glyphs) = event {
            recorded.store(glyphs.len(), Ordering::SeqCst);
        }
    }));

    pollster::block_on(block.set_string("one two")).unwrap();
    // A point inside the frame but on no token still counts.
    let frame_point = Vec2::new(block.content_size().x - 1.0, 1.0);

    assert!(block.pointer_up(frame_point));
    assert!(block.was_clicked());
    assert_eq!(count.load(Ordering::SeqCst), 2);

    block.reset_clicked();
    assert!(!block.was_clicked());
}

#[test]
fn underlines_attach_as_decoration_rects() {
    let backend = Arc::new(StubRasterizer::new());
    let host = RecordingHost::new();
    let mut block = new_block(backend, BlockOptions::default());
    block.set_host(Box::new(host.clone()));

    pollster::block_on(block.set_string("[UNDERLINE]key term[/UNDERLINE] rest")).unwrap();

    assert_eq!(block.decorations().len(), 2);
    let rects = host
        .calls()
        .iter()
        .filter(|call| **call == HostCall::AttachRect)
        .count();
    assert_eq!(rects, 2);
}

#[test]
fn block_moves_opposite_its_growth() {
    let backend = Arc::new(StubRasterizer::new());
    let options = BlockOptions::default();
    let position = options.position;
    let container_height = options.container.y;
    let mut block = new_block(backend, options);

    pollster::block_on(block.set_string("short")).unwrap();

    let delta = block.content_size().y - container_height;
    assert_eq!(block.origin().x, position.x);
    assert!((block.origin().y - (position.y - delta)).abs() < 1e-3);
}
